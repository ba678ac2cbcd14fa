use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use super::client::Client;
use crate::cluster::{
    self, ClusterResponse, MemberIdentity, MemberMetricRecord, MemberStatus,
};

/// Static description of one member the dashboard watches: where its agent
/// listens, plus the membership metadata the operator assigned it.
#[derive(Debug, Clone)]
pub struct MemberConfig {
    pub server_name: String,
    pub addr: String,
    pub roles: Vec<String>,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub members: Vec<MemberConfig>,
    pub leader: Option<String>,
    pub poll_interval: Duration,
}

/// Result of one poll cycle. Replaced wholesale on every refresh; readers
/// always see a complete, internally consistent snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub records: Vec<MemberMetricRecord>,
}

pub struct Poller {
    pub config: DashboardConfig,
    client: Client,
    latest: ArcSwap<ClusterSnapshot>,
}

impl Poller {
    pub fn new(config: DashboardConfig) -> Self {
        Poller {
            config,
            client: Client::new(),
            latest: ArcSwap::from_pointee(ClusterSnapshot {
                fetched_at: Utc::now(),
                records: Vec::new(),
            }),
        }
    }

    pub fn latest(&self) -> Arc<ClusterSnapshot> {
        self.latest.load_full()
    }

    /// One poll cycle: scrape every configured member, assemble the combined
    /// response, run it through the aggregator, and publish the result.
    pub async fn refresh(&self) {
        let response = self.assemble().await;
        match cluster::aggregate(&response) {
            Ok(records) => {
                info!("[DASHBOARD] Aggregated {} member records", records.len());
                self.latest.store(Arc::new(ClusterSnapshot {
                    fetched_at: Utc::now(),
                    records,
                }));
            }
            // assemble always fills members_infos, but if this ever fires we
            // keep serving the previous snapshot
            Err(e) => {
                error!("[DASHBOARD] Error aggregating cluster response: {:?}", e);
            }
        }
    }

    /// Builds the combined membership + telemetry response. A member whose
    /// agent cannot be reached is reported Offline and simply has no entry
    /// in `members_states`; the aggregator zero-fills it downstream.
    pub async fn assemble(&self) -> ClusterResponse {
        let mut infos = Vec::new();
        let mut states = Vec::new();
        for member in &self.config.members {
            let status = match self.client.member_state(&member.addr).await {
                Ok(state) => {
                    states.push(state);
                    MemberStatus::Online
                }
                Err(e) => {
                    error!("[DASHBOARD] Error scraping {}: {:?}", member.addr, e);
                    MemberStatus::Offline
                }
            };
            infos.push(MemberIdentity {
                server_name: member.server_name.clone(),
                status,
                roles: member.roles.clone(),
                groups: member.groups.clone(),
            });
        }
        ClusterResponse {
            members_infos: Some(infos),
            members_states: states,
            members_leader: self.config.leader.clone(),
        }
    }
}

pub async fn poll_loop(poller: Arc<Poller>) {
    loop {
        poller.refresh().await;
        tokio::time::sleep(poller.config.poll_interval).await;
    }
}
