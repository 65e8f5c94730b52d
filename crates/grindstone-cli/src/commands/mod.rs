//! Command implementations. Each module owns one subcommand's argument
//! struct and its `run` entry point.

pub mod auth;
pub mod case;
pub mod common;
pub mod init;
pub mod list;
pub mod note;
pub mod open;
pub mod solve;
pub mod stats;
pub mod submit;
pub mod timer;
