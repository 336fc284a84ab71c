//! vmignore Core - Foundation types, chunking and error handling
//!
//! This crate provides the request-scoped types shared by the other vmignore crates:
//! - `Host` / `Detection`: a host and its vulnerability detections as returned upstream
//! - `HostSelection`: one host or several hosts matching an IP expression
//! - `Action`, `IgnoreRequest`, `RestoreRequest`: operator-initiated changes
//! - `chunked`: order-preserving partition of target lists

pub mod action;
pub mod chunk;
pub mod error;
pub mod host;

// Re-export commonly used types at crate root
pub use action::{split_targets, Action, ActionParseError, IgnoreRequest, RestoreRequest};
pub use chunk::{chunked, Chunks, MAX_TARGETS_PER_REQUEST};
pub use error::{Error, Result};
pub use host::{Detection, Host, HostSelection};
