use serde::Serialize;

use crate::model::attendance::{AttendanceStatus, AttendanceSummary};

pub const CHART_TITLE: &str = "Attendance Distribution";

/// Chart.js configuration for the present/absent pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    #[serde(rename = "type")]
    kind: &'static str,
    data: ChartData,
    options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ChartData {
    labels: [&'static str; 2],
    datasets: [Dataset; 1],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Dataset {
    data: [u64; 2],
    background_color: [&'static str; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartOptions {
    responsive: bool,
    maintain_aspect_ratio: bool,
    plugins: Plugins,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Plugins {
    legend: Legend,
    title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Legend {
    position: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Title {
    display: bool,
    text: &'static str,
}

impl PieChart {
    pub fn from_summary(summary: &AttendanceSummary) -> Self {
        Self {
            kind: "pie",
            data: ChartData {
                labels: [
                    AttendanceStatus::Present.into(),
                    AttendanceStatus::Absent.into(),
                ],
                datasets: [Dataset {
                    data: [summary.present, summary.absent],
                    background_color: ["green", "red"],
                }],
            },
            options: ChartOptions {
                responsive: true,
                maintain_aspect_ratio: true,
                plugins: Plugins {
                    legend: Legend { position: "top" },
                    title: Title {
                        display: true,
                        text: CHART_TITLE,
                    },
                },
            },
        }
    }

    pub fn values(&self) -> [u64; 2] {
        self.data.datasets[0].data
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
