//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{DemoCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Sequential async task pipelines with shared single-flight steps
#[derive(Debug, Parser, Clone)]
#[command(name = "taskline")]
#[command(author = "Taskline Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Run task pipelines with branch-on-failure hooks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a scripted pipeline from a YAML file
    Run(RunCommand),

    /// Validate a pipeline configuration
    Validate(ValidateCommand),

    /// Start several login pipelines that share one exclusive login task
    Demo(DemoCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
