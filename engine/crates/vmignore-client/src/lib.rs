//! vmignore Client - Session and response handling for the vulnerability-management API
//!
//! This crate provides:
//! - `Session`: one authenticated HTTP session, logged out exactly once
//! - `decode`: generic XML-to-`Value` decoding with per-envelope paths
//! - Typed envelope readers for host lists, detections and ignore results

pub mod decode;
pub mod envelope;
pub mod session;

pub use decode::{decode, parse, DecodeError, EnvelopeKind, Value};
pub use envelope::{IgnoreOutcome, RestoreOutcome};
pub use session::{ClientError, Credentials, Session, SessionConfig};
