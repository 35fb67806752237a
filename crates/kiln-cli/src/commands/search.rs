//! Handler for `kiln search`.

use miette::Result;

use kiln_core::config::GlobalConfig;
use kiln_core::pattern::RefPattern;
use kiln_core::search::RemoteSearch;
use kiln_store::cache::LocalCache;
use kiln_store::index::RemoteSet;
use kiln_util::output::spinner;

pub fn exec(pattern: &str, remote: Option<&str>) -> Result<()> {
    let config = GlobalConfig::load()?;
    let pattern = RefPattern::parse(pattern)?;

    let refs = match remote {
        Some(name) => {
            let remotes = RemoteSet::from_config(&config)?;
            let pb = spinner(&format!("Searching remote '{name}'"));
            let found = remotes.search_remotes(&pattern, Some(name));
            pb.finish_and_clear();
            found?
        }
        None => LocalCache::from_config(&config).search(&pattern)?,
    };

    if refs.is_empty() {
        println!("No references matching '{pattern}'.");
        return Ok(());
    }
    for reference in refs {
        println!("{reference}");
    }
    Ok(())
}
