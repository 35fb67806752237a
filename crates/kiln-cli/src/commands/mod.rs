//! Command dispatch and handler modules.

mod packages;
mod remote;
mod resolve;
mod search;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Resolve {
            requirement,
            requester,
            update,
            remote,
        } => resolve::exec(&requirement, &requester, update, remote.as_deref()),
        Command::Search { pattern, remote } => search::exec(&pattern, remote.as_deref()),
        Command::Packages { reference, query } => packages::exec(&reference, query.as_deref()),
        Command::Remote { action } => remote::exec(action),
    }
}
