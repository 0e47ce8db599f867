//! Library crate for port-probe-rs exposing reusable modules.
pub mod error;
pub mod executor;
pub mod forwarder;
pub mod jobs;
pub mod scanner;
pub mod server;
pub mod services;
pub mod types;
