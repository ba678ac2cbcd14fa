use serde::Serialize;

use super::member::{ClusterResponse, MemberIdentity, MemberStatus, MemberTelemetry};

#[derive(Debug, PartialEq)]
pub enum Error {
    MalformedResponse(&'static str),
}

type Result<T> = std::result::Result<T, Error>;

/// Display-ready metrics for one member. Identity fields are copied from the
/// membership record, never from telemetry; everything derived is zero when
/// the member had no telemetry entry this cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberMetricRecord {
    pub server_name: String,
    pub status: MemberStatus,
    pub roles: Vec<String>,
    pub groups: Vec<String>,
    pub is_resource: bool,
    pub total_ram: u64,
    pub free_ram: u64,
    pub percentage_ram: f64,
    pub load_one: f64,
    pub load_five: f64,
    pub load_fifteen: f64,
    pub percentage_cpu: f64,
    pub logical_cpus: u32,
    pub local_space_total: u64,
    pub local_space_used: u64,
    pub local_space_percentage: f64,
    pub is_leader: bool,
}

/// Joins membership metadata with the telemetry snapshot and derives one
/// metric record per known member.
///
/// Output order equals `members_infos` order, and the output always has
/// exactly one record per membership entry: a member with no telemetry (a
/// node mid-join, or one that simply missed this scrape) gets a zero-filled
/// record instead of being dropped. If the telemetry list carries duplicate
/// entries for a name, the first one wins.
///
/// The only error is a response with no membership sequence at all; telemetry
/// skew of any kind is absorbed here and never surfaces to the caller.
pub fn aggregate(response: &ClusterResponse) -> Result<Vec<MemberMetricRecord>> {
    let infos = response
        .members_infos
        .as_ref()
        .ok_or(Error::MalformedResponse("members_infos missing"))?;

    let leader = response.members_leader.as_deref();
    let records = infos
        .iter()
        .map(|info| {
            let state = response
                .members_states
                .iter()
                .find(|s| s.server_name == info.server_name);
            match state {
                Some(state) => derive(info, state, leader),
                None => absent(info),
            }
        })
        .collect();
    Ok(records)
}

fn derive(
    info: &MemberIdentity,
    state: &MemberTelemetry,
    leader: Option<&str>,
) -> MemberMetricRecord {
    // a node reporting free > total is nonsense; clamp used to zero
    let used_ram = state.total_ram.saturating_sub(state.free_ram);
    let load_one = load_at(state, 0);
    let space = state.local_space();

    // load is per-core, so a zero core count has nothing meaningful to
    // report; clamp to zero rather than dividing
    let percentage_cpu = if state.logical_cpus > 0 {
        load_one * 100.0 / state.logical_cpus as f64
    } else {
        0.0
    };

    MemberMetricRecord {
        server_name: info.server_name.clone(),
        status: info.status,
        roles: info.roles.clone(),
        groups: info.groups.clone(),
        is_resource: info.in_resource_group(),
        total_ram: state.total_ram,
        free_ram: state.free_ram,
        percentage_ram: percentage(used_ram, state.total_ram),
        load_one,
        load_five: load_at(state, 1),
        load_fifteen: load_at(state, 2),
        percentage_cpu,
        logical_cpus: state.logical_cpus,
        local_space_total: space.total,
        local_space_used: space.used,
        local_space_percentage: percentage(space.used, space.total),
        is_leader: leader == Some(info.server_name.as_str()),
    }
}

// Telemetry skew: the member is known but has not reported yet.
fn absent(info: &MemberIdentity) -> MemberMetricRecord {
    MemberMetricRecord {
        server_name: info.server_name.clone(),
        status: info.status,
        roles: info.roles.clone(),
        groups: info.groups.clone(),
        is_resource: info.in_resource_group(),
        total_ram: 0,
        free_ram: 0,
        percentage_ram: 0.0,
        load_one: 0.0,
        load_five: 0.0,
        load_fifteen: 0.0,
        percentage_cpu: 0.0,
        logical_cpus: 0,
        local_space_total: 0,
        local_space_used: 0,
        local_space_percentage: 0.0,
        is_leader: false,
    }
}

fn load_at(state: &MemberTelemetry, idx: usize) -> f64 {
    state.load_averages.get(idx).copied().unwrap_or(0.0)
}

fn percentage(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::member::{SpaceUsage, StoragePool, StoragePools};

    fn info(name: &str) -> MemberIdentity {
        MemberIdentity {
            server_name: name.to_string(),
            status: MemberStatus::Online,
            roles: vec!["member".to_string()],
            groups: vec![],
        }
    }

    fn state(name: &str) -> MemberTelemetry {
        MemberTelemetry {
            server_name: name.to_string(),
            total_ram: 1000,
            free_ram: 250,
            load_averages: vec![1.0, 0.5, 0.25],
            logical_cpus: 4,
            storage_pools: Some(StoragePools {
                local: Some(StoragePool {
                    space: Some(SpaceUsage {
                        total: 2000,
                        used: 500,
                    }),
                }),
            }),
        }
    }

    fn response(
        infos: Vec<MemberIdentity>,
        states: Vec<MemberTelemetry>,
        leader: Option<&str>,
    ) -> ClusterResponse {
        ClusterResponse {
            members_infos: Some(infos),
            members_states: states,
            members_leader: leader.map(String::from),
        }
    }

    #[test]
    fn one_record_per_member_in_membership_order() {
        // telemetry deliberately out of order and incomplete
        let r = response(
            vec![info("a"), info("b"), info("c")],
            vec![state("c"), state("a")],
            None,
        );
        let records = aggregate(&r).unwrap();
        assert_eq!(records.len(), 3);
        let names: Vec<&str> = records.iter().map(|r| r.server_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_telemetry_zero_fills_instead_of_dropping() {
        let r = response(vec![info("a"), info("b")], vec![state("a")], Some("b"));
        let records = aggregate(&r).unwrap();

        let b = &records[1];
        assert_eq!(b.server_name, "b");
        assert_eq!(b.status, MemberStatus::Online); // identity survives
        assert_eq!(b.total_ram, 0);
        assert_eq!(b.free_ram, 0);
        assert_eq!(b.percentage_ram, 0.0);
        assert_eq!(b.load_one, 0.0);
        assert_eq!(b.load_five, 0.0);
        assert_eq!(b.load_fifteen, 0.0);
        assert_eq!(b.percentage_cpu, 0.0);
        assert_eq!(b.logical_cpus, 0);
        assert_eq!(b.local_space_total, 0);
        assert_eq!(b.local_space_used, 0);
        assert_eq!(b.local_space_percentage, 0.0);
        assert!(!b.is_leader);
    }

    #[test]
    fn ram_percentage_from_used_over_total() {
        let r = response(vec![info("a")], vec![state("a")], None);
        let records = aggregate(&r).unwrap();
        assert_eq!(records[0].percentage_ram, 75.0);
    }

    #[test]
    fn ram_percentage_guards_zero_total() {
        let mut s = state("a");
        s.total_ram = 0;
        s.free_ram = 0;
        let r = response(vec![info("a")], vec![s], None);
        assert_eq!(aggregate(&r).unwrap()[0].percentage_ram, 0.0);
    }

    #[test]
    fn cpu_percentage_is_load_per_core() {
        let r = response(vec![info("a")], vec![state("a")], None);
        // load 1.0 across 4 cores
        assert_eq!(aggregate(&r).unwrap()[0].percentage_cpu, 25.0);
    }

    #[test]
    fn cpu_percentage_guards_zero_cores() {
        let mut s = state("a");
        s.logical_cpus = 0;
        let r = response(vec![info("a")], vec![s], None);
        let rec = &aggregate(&r).unwrap()[0];
        assert_eq!(rec.percentage_cpu, 0.0);
        assert!(rec.percentage_cpu.is_finite());
    }

    #[test]
    fn short_load_vector_defaults_each_position() {
        let mut s = state("a");
        s.load_averages = vec![2.0];
        let r = response(vec![info("a")], vec![s], None);
        let rec = &aggregate(&r).unwrap()[0];
        assert_eq!(rec.load_one, 2.0);
        assert_eq!(rec.load_five, 0.0);
        assert_eq!(rec.load_fifteen, 0.0);
    }

    #[test]
    fn missing_storage_nesting_defaults_to_zero() {
        let mut s = state("a");
        s.storage_pools = Some(StoragePools { local: None });
        let r = response(vec![info("a")], vec![s], None);
        let rec = &aggregate(&r).unwrap()[0];
        assert_eq!(rec.local_space_total, 0);
        assert_eq!(rec.local_space_used, 0);
        assert_eq!(rec.local_space_percentage, 0.0);
    }

    #[test]
    fn duplicate_telemetry_first_match_wins() {
        let mut first = state("a");
        first.total_ram = 4000;
        let mut second = state("a");
        second.total_ram = 8000;
        let r = response(vec![info("a")], vec![first, second], None);
        assert_eq!(aggregate(&r).unwrap()[0].total_ram, 4000);
    }

    #[test]
    fn leader_flag_set_for_exactly_one_member() {
        let r = response(
            vec![info("a"), info("b")],
            vec![state("a"), state("b")],
            Some("b"),
        );
        let records = aggregate(&r).unwrap();
        assert!(!records[0].is_leader);
        assert!(records[1].is_leader);

        let r = response(vec![info("a"), info("b")], vec![state("a")], None);
        assert!(aggregate(&r).unwrap().iter().all(|r| !r.is_leader));
    }

    #[test]
    fn missing_membership_is_malformed() {
        let r = ClusterResponse {
            members_infos: None,
            members_states: vec![state("a")],
            members_leader: None,
        };
        assert_eq!(
            aggregate(&r),
            Err(Error::MalformedResponse("members_infos missing"))
        );
    }

    #[test]
    fn empty_membership_is_fine() {
        let r = response(vec![], vec![state("a")], Some("a"));
        assert_eq!(aggregate(&r).unwrap(), vec![]);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let r = response(
            vec![info("a"), info("b"), info("c")],
            vec![state("b")],
            Some("b"),
        );
        assert_eq!(aggregate(&r).unwrap(), aggregate(&r).unwrap());
    }

    #[test]
    fn decodes_wire_payload() {
        let raw = r#"{
            "members_infos": [
                {"server_name": "node-1", "status": "online", "roles": ["database"], "groups": ["Resources"]},
                {"server_name": "node-2", "status": "joining"}
            ],
            "members_states": [
                {
                    "server_name": "node-1",
                    "total_ram": 16000000000,
                    "free_ram": 4000000000,
                    "load_averages": [0.8, 0.6, 0.5],
                    "logical_cpus": 8,
                    "storage_pools": {"local": {"space": {"total": 500000, "used": 125000}}}
                }
            ],
            "members_leader": "node-1"
        }"#;
        let response: ClusterResponse = serde_json::from_str(raw).unwrap();
        let records = aggregate(&response).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].percentage_ram, 75.0);
        assert_eq!(records[0].percentage_cpu, 10.0);
        assert_eq!(records[0].local_space_percentage, 25.0);
        assert!(records[0].is_leader);
        assert!(records[0].is_resource);
        assert_eq!(records[1].status, MemberStatus::Transitional);
        assert_eq!(records[1].total_ram, 0);
        assert!(!records[1].is_leader);
    }
}
