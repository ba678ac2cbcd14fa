use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use lookout::agent;
use lookout::dashboard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let (ahost, aport) = ("localhost", 8901);
    let (dhost, dport) = ("localhost", 8902);

    let node_name = env::var("LOOKOUT_NODE_NAME").unwrap_or_else(|_| "node-1".to_string());

    info!("Starting Lookout agent on {}:{}", ahost, aport);
    let agent = Arc::new(agent::Agent::new(&node_name));
    let api = agent::api::setup(ahost, aport, agent.clone());
    tokio::spawn(api.start());

    info!("Starting Lookout dashboard on {}:{}", dhost, dport);
    let members = members_from_env(&node_name, &format!("{}:{}", ahost, aport));
    let leader = env::var("LOOKOUT_LEADER")
        .ok()
        .or_else(|| members.first().map(|m| m.server_name.clone()));
    let config = dashboard::DashboardConfig {
        members,
        leader,
        poll_interval: poll_interval_from_env(),
    };

    let poller = Arc::new(dashboard::Poller::new(config));
    let dapi = dashboard::api::setup(dhost, dport, poller.clone());
    dashboard::api::start_api(dapi, poller).await;
}

// LOOKOUT_MEMBERS is a comma-separated list of name=host:port entries.
// With nothing configured the dashboard watches its own local agent.
fn members_from_env(default_name: &str, default_addr: &str) -> Vec<dashboard::MemberConfig> {
    let raw = env::var("LOOKOUT_MEMBERS").unwrap_or_default();
    if raw.trim().is_empty() {
        return vec![dashboard::MemberConfig {
            server_name: default_name.to_string(),
            addr: default_addr.to_string(),
            roles: vec!["member".to_string()],
            groups: Vec::new(),
        }];
    }
    raw.split(',')
        .filter_map(|entry| {
            let (name, addr) = entry.split_once('=')?;
            Some(dashboard::MemberConfig {
                server_name: name.trim().to_string(),
                addr: addr.trim().to_string(),
                roles: vec!["member".to_string()],
                groups: Vec::new(),
            })
        })
        .collect()
}

fn poll_interval_from_env() -> Duration {
    let secs = env::var("LOOKOUT_POLL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(5);
    Duration::from_secs(secs)
}
