//! pingme CLI library exports.
//!
//! This crate provides the `pingme` binary: argument parsing, command
//! handlers, and wiring of the core scheduler to the platform backends.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (now, in, at, every, list, ...)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    build_scheduler, handle_at, handle_cancel, handle_clear, handle_every, handle_fire,
    handle_in, handle_list, handle_now,
};
