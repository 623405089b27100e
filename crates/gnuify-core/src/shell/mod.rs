//! Shell integration
//!
//! - `path`: PATH/MANPATH block composition
//! - `config`: idempotent edits to startup files
//! - `login`: login shell registration

pub mod config;
pub mod login;
pub mod path;

pub use config::{ConfigOutcome, ShellConfig};
pub use path::PathKind;
