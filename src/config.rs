use std::env;
use std::path::PathBuf;

use anyhow::{Context, bail};
use dotenvy::dotenv;

const DEFAULT_PORT: &str = "5000";
const DEFAULT_RANGE: &str = "Sheet1!A:C";
const DEFAULT_ROSTER: &str = "1,2,3,4,5,6,7,8,9,10";

/// Where attendance rows are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Sheets {
        spreadsheet_id: String,
        range: String,
        credentials_path: PathBuf,
    },
    MySql {
        database_url: String,
    },
    Memory,
}

impl StoreConfig {
    pub fn tag(&self) -> &'static str {
        match self {
            StoreConfig::Sheets { .. } => "sheets",
            StoreConfig::MySql { .. } => "mysql",
            StoreConfig::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub store: StoreConfig,
    /// Known student ids, in display order.
    pub roster: Vec<String>,

    // Rate limiting
    pub rate_submit_per_min: u32,
    pub rate_read_per_min: u32,

    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server_addr = match get("SERVER_ADDR") {
            Some(addr) => addr,
            None => format!("0.0.0.0:{}", get("PORT").unwrap_or_else(|| DEFAULT_PORT.into())),
        };

        let backend = get("STORE_BACKEND").unwrap_or_else(|| "sheets".to_string());
        let store = match backend.to_ascii_lowercase().as_str() {
            "sheets" => StoreConfig::Sheets {
                spreadsheet_id: get("SPREADSHEET_ID")
                    .context("SPREADSHEET_ID must be set for the sheets backend")?,
                range: get("SHEET_RANGE").unwrap_or_else(|| DEFAULT_RANGE.to_string()),
                credentials_path: get("GOOGLE_APPLICATION_CREDENTIALS")
                    .map(PathBuf::from)
                    .context("GOOGLE_APPLICATION_CREDENTIALS must be set for the sheets backend")?,
            },
            "mysql" => StoreConfig::MySql {
                database_url: get("DATABASE_URL")
                    .context("DATABASE_URL must be set for the mysql backend")?,
            },
            "memory" => StoreConfig::Memory,
            other => bail!("unknown STORE_BACKEND {other:?}, expected sheets, mysql or memory"),
        };

        let roster = parse_roster(&get("ROSTER").unwrap_or_else(|| DEFAULT_ROSTER.to_string()))?;

        Ok(Self {
            server_addr,
            store,
            roster,
            rate_submit_per_min: parse_or(get("RATE_SUBMIT_PER_MIN"), "RATE_SUBMIT_PER_MIN", 60)?,
            rate_read_per_min: parse_or(get("RATE_READ_PER_MIN"), "RATE_READ_PER_MIN", 600)?,
            log_dir: get("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        })
    }
}

/// Comma-separated ids; blanks dropped, duplicates keep their first position.
pub fn parse_roster(raw: &str) -> anyhow::Result<Vec<String>> {
    let mut roster: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if !roster.iter().any(|known| known == id) {
            roster.push(id.to_string());
        }
    }

    if roster.is_empty() {
        bail!("ROSTER must list at least one student id");
    }
    Ok(roster)
}

fn parse_or(value: Option<String>, key: &str, default: u32) -> anyhow::Result<u32> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}")),
        None => Ok(default),
    }
}
