pub mod agent;
pub mod cluster;
pub mod dashboard;
pub mod units;
