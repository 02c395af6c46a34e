pub mod config;
pub mod deploy;
pub mod lease;

pub use config::{ConfigLayer, ProtohostConfig};
pub use deploy::{Allocation, DeployRequest};
pub use lease::{Lease, LeaseStatus};
