//! Command-line interface
//!
//! Argument parsing for the ledger binary; command dispatch lives in
//! `main.rs`.

pub mod commands;

pub use commands::{Command, Opt};
