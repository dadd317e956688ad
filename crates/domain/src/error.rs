use crate::protocol::{ProtocolVersion, Status};

/// Shared error type used across all credex crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid protocol version: {0:?}")]
    InvalidVersion(String),

    #[error(
        "unsupported protocol version: client supports {client_min}-{client_max}, \
         server supports {server_min}-{server_max}"
    )]
    UnsupportedVersion {
        client_min: ProtocolVersion,
        client_max: ProtocolVersion,
        server_min: ProtocolVersion,
        server_max: ProtocolVersion,
    },

    #[error("protocol version already set to {0}")]
    VersionAlreadySet(ProtocolVersion),

    #[error("invalid status transition {from} -> {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("no system parameters for {0}-bit keys")]
    UnknownKeySize(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
