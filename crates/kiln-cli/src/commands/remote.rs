//! Handler for `kiln remote`.

use miette::Result;

use kiln_core::config::GlobalConfig;

use crate::cli::RemoteAction;

pub fn exec(action: RemoteAction) -> Result<()> {
    match action {
        RemoteAction::List => list(),
    }
}

fn list() -> Result<()> {
    let config = GlobalConfig::load()?;
    if config.remotes.is_empty() {
        println!("No remotes configured.");
        return Ok(());
    }
    for remote in &config.remotes {
        let ssl = if remote.verify_ssl { "" } else { " [verify-ssl: false]" };
        println!("{}: {}{ssl}", remote.name, remote.url);
    }
    Ok(())
}
