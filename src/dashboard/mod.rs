pub mod api;
pub mod client;
pub mod poller;

pub use client::Client;
pub use poller::{poll_loop, ClusterSnapshot, DashboardConfig, MemberConfig, Poller};
