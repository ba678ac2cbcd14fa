mod aggregate;
mod member;

pub use aggregate::{aggregate, Error, MemberMetricRecord};
pub use member::{
    ClusterResponse, MemberIdentity, MemberStatus, MemberTelemetry, SpaceUsage, StoragePool,
    StoragePools,
};
