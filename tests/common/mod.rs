#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::test::TestRequest;
use attendance_monitor::config::Config;
use attendance_monitor::routes::AppState;
use attendance_monitor::services::attendance::AttendanceService;
use attendance_monitor::store::{MemoryStore, Row};
use serde_json::Value;

/// Governor keys on the peer address, so every request needs one.
pub fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

pub fn config_with(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("STORE_BACKEND".to_string(), "memory".to_string()),
        ("ROSTER".to_string(), "1,2,3".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn state_with(store: Arc<MemoryStore>, config: Config) -> AppState {
    AppState::new(AttendanceService::new(store), config).unwrap()
}

pub fn state(store: Arc<MemoryStore>) -> AppState {
    state_with(store, config_with(&[]))
}

pub fn row(cells: &[&str]) -> Row {
    cells.iter().map(|c| c.to_string()).collect()
}

pub fn get(uri: &str) -> TestRequest {
    TestRequest::get().uri(uri).peer_addr(peer())
}

pub fn post_json(uri: &str, body: &Value) -> TestRequest {
    TestRequest::post().uri(uri).peer_addr(peer()).set_json(body)
}
