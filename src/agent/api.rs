use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::error;

use super::agent::Agent;
use super::stats;
use crate::cluster::MemberTelemetry;

type AppState = State<Arc<Agent>>;

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

pub fn setup(address: &str, port: u16, agent: Arc<Agent>) -> Api {
    let router = Router::new()
        .route("/state", get(get_state))
        .with_state(agent);
    Api {
        address: address.to_string(),
        port,
        router,
    }
}

async fn get_state(State(agent): AppState) -> Result<Json<MemberTelemetry>, StatusCode> {
    match stats::collect(&agent.server_name) {
        Ok(telemetry) => Ok(Json(telemetry)),
        Err(e) => {
            error!("[AGENT] Error collecting telemetry: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
