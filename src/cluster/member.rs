use serde::{Deserialize, Serialize};

/// Static membership record, the source of truth for who is in the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberIdentity {
    pub server_name: String,
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl MemberIdentity {
    /// Resource-group membership is a case-insensitive substring match, so
    /// "Resources" and "gpu-resource-pool" both qualify.
    pub fn in_resource_group(&self) -> bool {
        self.groups
            .iter()
            .any(|g| g.to_lowercase().contains("resource"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Online,
    #[default]
    Offline,
    // joining, leaving, and whatever else the membership service grows later
    #[serde(other)]
    Transitional,
}

/// Per-node telemetry snapshot. Any of these fields may be missing or short
/// on the wire; decoding defaults them rather than failing, and the
/// aggregator treats the defaults as "nothing reported".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberTelemetry {
    pub server_name: String,
    #[serde(default)]
    pub total_ram: u64,
    #[serde(default)]
    pub free_ram: u64,
    /// 1/5/15-minute load, positionally; may arrive shorter than three.
    #[serde(default)]
    pub load_averages: Vec<f64>,
    #[serde(default)]
    pub logical_cpus: u32,
    #[serde(default)]
    pub storage_pools: Option<StoragePools>,
}

impl MemberTelemetry {
    /// Walks `storage_pools.local.space`, yielding zeros when any level of
    /// the nesting is absent.
    pub fn local_space(&self) -> SpaceUsage {
        self.storage_pools
            .as_ref()
            .and_then(|pools| pools.local.as_ref())
            .and_then(|pool| pool.space)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoragePools {
    #[serde(default)]
    pub local: Option<StoragePool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoragePool {
    #[serde(default)]
    pub space: Option<SpaceUsage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpaceUsage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub used: u64,
}

/// One poll cycle's worth of cluster state: membership metadata plus the
/// telemetry entries that happened to be available at fetch time. The two
/// lists are independently ordered and need not be the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResponse {
    // absence here is a contract violation, unlike everything below
    #[serde(default)]
    pub members_infos: Option<Vec<MemberIdentity>>,
    #[serde(default)]
    pub members_states: Vec<MemberTelemetry>,
    #[serde(default)]
    pub members_leader: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_group_match_is_case_insensitive_substring() {
        let mut m = MemberIdentity {
            server_name: "node-a".to_string(),
            status: MemberStatus::Online,
            roles: vec![],
            groups: vec!["compute".to_string()],
        };
        assert!(!m.in_resource_group());

        m.groups.push("GPU-Resource-Pool".to_string());
        assert!(m.in_resource_group());

        m.groups = vec!["RESOURCES".to_string()];
        assert!(m.in_resource_group());
    }

    #[test]
    fn unknown_status_decodes_as_transitional() {
        let m: MemberIdentity =
            serde_json::from_str(r#"{"server_name": "n1", "status": "joining"}"#).unwrap();
        assert_eq!(m.status, MemberStatus::Transitional);

        let m: MemberIdentity =
            serde_json::from_str(r#"{"server_name": "n1", "status": "online"}"#).unwrap();
        assert_eq!(m.status, MemberStatus::Online);
    }

    #[test]
    fn local_space_defaults_through_missing_nesting() {
        let t = MemberTelemetry::default();
        assert_eq!(t.local_space(), SpaceUsage::default());

        let t: MemberTelemetry =
            serde_json::from_str(r#"{"server_name": "n1", "storage_pools": {}}"#).unwrap();
        assert_eq!(t.local_space(), SpaceUsage::default());

        let t: MemberTelemetry = serde_json::from_str(
            r#"{"server_name": "n1", "storage_pools": {"local": {"space": {"total": 10, "used": 4}}}}"#,
        )
        .unwrap();
        assert_eq!(t.local_space(), SpaceUsage { total: 10, used: 4 });
    }

    #[test]
    fn telemetry_decodes_with_partial_fields() {
        let t: MemberTelemetry = serde_json::from_str(
            r#"{"server_name": "n1", "total_ram": 1000, "load_averages": [0.5]}"#,
        )
        .unwrap();
        assert_eq!(t.total_ram, 1000);
        assert_eq!(t.free_ram, 0);
        assert_eq!(t.load_averages, vec![0.5]);
        assert_eq!(t.logical_cpus, 0);
        assert!(t.storage_pools.is_none());
    }
}
