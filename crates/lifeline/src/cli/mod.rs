//! Command-line interface for lifeline.
//!
//! This module provides the CLI structure for the `lifeline` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, ContactEdit, ContactsCommand, LoginCommand, ProfileCommand, ProfileEdit,
    ShowArgs, StatusCommand,
};

use crate::logging::Verbosity;

/// lifeline - Your medical information, ready for an emergency
///
/// Keep a medical profile and a list of emergency contacts, and bring them
/// up on one screen when it matters.
#[derive(Debug, Parser)]
#[command(name = "lifeline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new user and sign in as them
    Signup,

    /// Sign in as an existing user
    Login(LoginCommand),

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show the dashboard
    Dashboard(ShowArgs),

    /// Declare an emergency and show medical information and contacts
    Emergency(ShowArgs),

    /// View or edit the medical profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Manage emergency contacts
    #[command(subcommand)]
    Contacts(ContactsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Show database and session status
    Status(StatusCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
