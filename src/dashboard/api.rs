use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::poller::{self, Poller};
use crate::cluster::{MemberMetricRecord, MemberStatus};
use crate::units;

type AppState = State<Arc<Poller>>;

pub struct Api {
    address: String,
    port: u16,
    router: Router,
}

impl Api {
    pub async fn start(self) {
        let socket = format!("{}:{}", self.address, self.port);
        let listener = tokio::net::TcpListener::bind(socket).await.unwrap();
        axum::serve(listener, self.router).await.unwrap();
    }
}

pub async fn start_api(api: Api, poller: Arc<Poller>) {
    tokio::spawn(poller::poll_loop(poller.clone()));
    api.start().await;
}

pub fn setup(address: &str, port: u16, poller: Arc<Poller>) -> Api {
    let router = Router::new()
        .route("/cluster/records", get(get_records))
        .route("/cluster/resources", get(get_resources))
        .with_state(poller);
    Api {
        address: address.to_string(),
        port,
        router,
    }
}

/// Row shaped for direct rendering: byte counts and ratios arrive as
/// display strings so the frontend never repeats the unit math.
#[derive(Debug, Serialize)]
pub struct MemberResourceRow {
    pub server_name: String,
    pub status: MemberStatus,
    pub is_leader: bool,
    pub is_resource: bool,
    pub ram_used: String,
    pub ram_total: String,
    pub ram_usage: String,
    pub cpu_usage: String,
    pub logical_cpus: u32,
    pub load: [f64; 3],
    pub storage_used: String,
    pub storage_total: String,
    pub storage_usage: String,
}

impl From<&MemberMetricRecord> for MemberResourceRow {
    fn from(r: &MemberMetricRecord) -> Self {
        let used_ram = r.total_ram.saturating_sub(r.free_ram);
        MemberResourceRow {
            server_name: r.server_name.clone(),
            status: r.status,
            is_leader: r.is_leader,
            is_resource: r.is_resource,
            ram_used: bytes(used_ram),
            ram_total: bytes(r.total_ram),
            ram_usage: units::format_resource_usage(used_ram, r.total_ram),
            cpu_usage: format!("{}%", r.percentage_cpu.round() as u64),
            logical_cpus: r.logical_cpus,
            load: [r.load_one, r.load_five, r.load_fifteen],
            storage_used: bytes(r.local_space_used),
            storage_total: bytes(r.local_space_total),
            storage_usage: units::format_resource_usage(r.local_space_used, r.local_space_total),
        }
    }
}

// u64 input can never trip the formatter's invalid-input check
fn bytes(b: u64) -> String {
    units::format_bytes(b as f64, 2).unwrap_or_else(|_| "0 B".to_string())
}

async fn get_records(State(poller): AppState) -> Json<Vec<MemberMetricRecord>> {
    Json(poller.latest().records.clone())
}

async fn get_resources(State(poller): AppState) -> Json<Vec<MemberResourceRow>> {
    let snapshot = poller.latest();
    Json(snapshot.records.iter().map(|r| r.into()).collect())
}
