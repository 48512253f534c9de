//! jexifs CLI library.
//!
//! This crate provides the command-line interface for selecting photos by
//! their capture metadata.

mod cli;
pub mod commands;
mod config;
pub mod output;

pub use cli::{Cli, Presorted};
pub use config::Config;
