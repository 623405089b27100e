//! Process boundary shared by the Homebrew queries, the platform probe and the verifier

pub mod command;

pub use command::{CommandOutput, CommandRunner, SystemRunner};
