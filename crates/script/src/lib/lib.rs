pub mod discovery;
pub mod env;
pub mod eth_client;
pub mod progress;
pub mod report;
pub mod scripts;
pub mod tracing;
