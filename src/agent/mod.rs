pub mod agent;
pub mod api;
pub mod stats;

pub use agent::Agent;
