//! Protocol-level message types shared between the session layer and the
//! protocol handlers that drive it.
//!
//! The zero-knowledge proof contents are opaque here: requests carry their
//! payload as JSON and proofs as encoded big integers.  Only the fields the
//! session layer reads or writes (action, nonce, context, client timeout,
//! status, result) are modelled explicitly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Action
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The protocol purpose of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Disclosing,
    Signing,
    Issuing,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disclosing => "disclosing",
            Self::Signing => "signing",
            Self::Issuing => "issuing",
        };
        f.write_str(s)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Status
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Position of a session in its state machine.
///
/// `Initialized → (Connected) → Cancelled | Done | Timeout`.  The last three
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Initialized,
    Connected,
    Cancelled,
    Done,
    Timeout,
}

impl Status {
    /// Whether the session has reached a terminal status.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Cancelled | Self::Done | Self::Timeout)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Initialized => 0,
            Self::Connected => 1,
            Self::Cancelled | Self::Done | Self::Timeout => 2,
        }
    }

    /// Whether moving from `self` to `next` respects the state machine.
    ///
    /// Finished statuses never change.  Otherwise the status may stay where
    /// it is or move forward.
    pub fn can_transition_to(self, next: Status) -> bool {
        if self.is_finished() {
            return false;
        }
        next.rank() >= self.rank()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initialized => "INITIALIZED",
            Self::Connected => "CONNECTED",
            Self::Cancelled => "CANCELLED",
            Self::Done => "DONE",
            Self::Timeout => "TIMEOUT",
        };
        f.write_str(s)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Protocol version
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A `major.minor` protocol version.  Ordered by major, then minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProtocolVersion {
    pub major: u16,
    pub minor: u16,
}

impl ProtocolVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ProtocolVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion(s.to_owned());
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for ProtocolVersion {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ProtocolVersion> for String {
    fn from(v: ProtocolVersion) -> Self {
        v.to_string()
    }
}

/// The inclusive range of protocol versions a server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    pub min: ProtocolVersion,
    pub max: ProtocolVersion,
}

impl VersionRange {
    pub fn new(min: ProtocolVersion, max: ProtocolVersion) -> Self {
        Self { min, max }
    }

    /// Pick the highest version supported by both the client range
    /// `[client_min, client_max]` and this range.
    pub fn negotiate(
        &self,
        client_min: ProtocolVersion,
        client_max: ProtocolVersion,
    ) -> Result<ProtocolVersion> {
        let low = client_min.max(self.min);
        let high = client_max.min(self.max);
        if low > high {
            return Err(Error::UnsupportedVersion {
                client_min,
                client_max,
                server_min: self.min,
                server_max: self.max,
            });
        }
        Ok(high)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Nonce
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A session nonce: a big-endian unsigned integer below `2^Lstatzk`.
/// Serialized as lowercase hex.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nonce(Vec<u8>);

impl Nonce {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of significant bits (0 for an all-zero nonce).
    pub fn bit_len(&self) -> u32 {
        match self.0.iter().position(|b| *b != 0) {
            Some(i) => {
                let remaining = (self.0.len() - i - 1) as u32;
                remaining * 8 + (8 - self.0[i].leading_zeros())
            }
            None => 0,
        }
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({self})")
    }
}

impl TryFrom<String> for Nonce {
    type Error = hex::FromHexError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        hex::decode(s).map(Self)
    }
}

impl From<Nonce> for String {
    fn from(n: Nonce) -> Self {
        n.to_string()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Requests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The fixed context value bound into every session request.
pub const SESSION_CONTEXT: u64 = 1;

/// The protocol request the client will answer.  `nonce` and `context` are
/// empty until a session binds the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Nonce>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<u64>,
    /// Protocol payload (disclosure conjunctions, credentials to issue,
    /// message to sign).  Validated upstream.
    #[serde(default)]
    pub content: serde_json::Value,
}

impl SessionRequest {
    pub fn new(action: Action, content: serde_json::Value) -> Self {
        Self {
            action,
            nonce: None,
            context: None,
            content,
        }
    }

    pub fn set_nonce(&mut self, nonce: Nonce) {
        self.nonce = Some(nonce);
    }

    pub fn set_context(&mut self, context: u64) {
        self.context = Some(context);
    }

    /// Whether a session has written its nonce and context into this request.
    pub fn is_bound(&self) -> bool {
        self.nonce.is_some() && self.context.is_some()
    }
}

/// Requestor-level options that wrap every session request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestorBaseRequest {
    /// Seconds the client has to pick up an initialized session.
    /// `0` means "use the server default".
    #[serde(default)]
    pub client_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

/// A request as submitted by a requestor: options plus the session request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestorRequest {
    #[serde(flatten)]
    pub base: RequestorBaseRequest,
    pub request: SessionRequest,
}

impl RequestorRequest {
    pub fn new(request: SessionRequest) -> Self {
        Self {
            base: RequestorBaseRequest::default(),
            request,
        }
    }

    pub fn with_client_timeout(mut self, secs: u64) -> Self {
        self.base.client_timeout = secs;
        self
    }

    pub fn base(&self) -> &RequestorBaseRequest {
        &self.base
    }

    pub fn session_request(&self) -> &SessionRequest {
        &self.request
    }

    pub fn session_request_mut(&mut self) -> &mut SessionRequest {
        &mut self.request
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Results & proofs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The outcome of a session as reported to the requestor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub token: String,
    #[serde(rename = "type")]
    pub action: Action,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclosed: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionResult {
    pub fn new(token: impl Into<String>, action: Action) -> Self {
        Self {
            token: token.into(),
            action,
            status: Status::Initialized,
            disclosed: None,
            signature: None,
            error: None,
        }
    }
}

/// A keyshare server's partial proof of knowledge for one scheme manager.
/// Values are decimal-encoded big integers produced by the crypto library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofP {
    #[serde(rename = "P")]
    pub p: String,
    pub c: String,
    pub s_response: String,
}
