//! CLI argument definitions for Kiln.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "A package manager for C and C++",
    long_about = "Kiln resolves version ranges against a local package cache and remote \
                  indexes, and filters binary packages by their settings and options."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a requirement such as `zlib/[>=1.2 <2]` to a concrete reference
    Resolve {
        /// Requirement: name/version or name/[range], optionally @user/channel
        requirement: String,
        /// Reference reported as the one declaring the requirement
        #[arg(long, default_value = "cli")]
        requester: String,
        /// Look at remotes before the local cache
        #[arg(short, long)]
        update: bool,
        /// Only query this remote
        #[arg(short, long)]
        remote: Option<String>,
    },

    /// Search references in the local cache or on a remote
    Search {
        /// Glob over references, e.g. `zlib/*` or `*@lasote/*`
        #[arg(default_value = "*")]
        pattern: String,
        /// Search this remote instead of the local cache
        #[arg(short, long)]
        remote: Option<String>,
    },

    /// List the binary packages of a cached recipe
    Packages {
        /// Package reference: name/version[@user/channel]
        reference: String,
        /// Query over settings and options, e.g. `os=Linux AND options.shared=True`
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Manage remotes
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum RemoteAction {
    /// List configured remotes in lookup order
    List,
}

pub fn parse() -> Cli {
    Cli::parse()
}
