//! Orchestration of user requests

pub mod input;
pub mod runner;

pub use input::{parse_broadcast_id, Command, Request};
pub use runner::{print_help, BatchSummary, Session};
