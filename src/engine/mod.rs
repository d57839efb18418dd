// StudyGate Engine - Core module structure
pub mod api;
pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod rbac;

pub use config::Config;
pub use rbac::Enforcer;
