//! vmignore Console - Interactive workflows on top of an API session
//!
//! - `lister`: detections of one host, with host disambiguation
//! - `orchestrator`: chunked ignore/restore requests
//! - `lookup`: host ID and hostname for an IP expression
//! - `menu`: the top-level loop that owns and closes the session

pub mod lister;
pub mod lookup;
pub mod menu;
pub mod orchestrator;
pub mod prompt;

pub use menu::{run, MenuChoice};
pub use prompt::{Prompter, Scripted, Terminal};
