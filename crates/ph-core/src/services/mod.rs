pub mod cleanup;
pub mod compose;
pub mod config_loader;
pub mod git;
pub mod lease_manager;
pub mod ledger;
pub mod naming;
pub mod ports;
pub mod registry;
pub mod status;
