//! Command layer
//!
//! - Parser: text control scripts into commands
//! - Session: single owner of reader and conductor that executes commands

pub mod parser;
pub mod session;

pub use parser::{parse_command, parse_script, Command, TransportVerb};
pub use session::{Reply, Session};
