pub mod engine;
pub mod local_heuristic;
pub mod oracle_client;
pub mod protocol;
pub mod readiness;
pub mod remote_oracle;
pub mod responses;
pub mod runner;
pub mod strategy;
