//! Handler for `kiln resolve`.

use miette::Result;

use kiln_core::config::GlobalConfig;
use kiln_core::requirement::Requirement;
use kiln_resolver::range_resolver::{RangeResolver, Resolution, ResolveOptions};
use kiln_store::cache::LocalCache;
use kiln_store::index::RemoteSet;
use kiln_util::output::ConsoleOutput;

pub fn exec(requirement: &str, requester: &str, update: bool, remote: Option<&str>) -> Result<()> {
    let config = GlobalConfig::load()?;
    let local = LocalCache::from_config(&config);
    let remotes = RemoteSet::from_config(&config)?;
    let output = ConsoleOutput;
    let resolver = RangeResolver::new(&local, &remotes, &output);

    let mut requirement = Requirement::parse(requirement)?;
    let options = ResolveOptions {
        update,
        remote: remote.map(str::to_string),
    };

    let resolution = resolver.resolve(&mut requirement, requester, &options)?;
    if let Resolution::Bound { locality, .. } = resolution {
        tracing::debug!("bound from {locality}");
    }
    if let Some(reference) = requirement.reference() {
        println!("{reference}");
    }
    Ok(())
}
