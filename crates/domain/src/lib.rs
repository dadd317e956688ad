//! Shared types for the credex workspace: errors, configuration, structured
//! trace events, protocol messages, cryptographic system parameters and the
//! scheme metadata contract.

pub mod config;
pub mod error;
pub mod params;
pub mod protocol;
pub mod scheme;
pub mod trace;
