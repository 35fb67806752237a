//! Handler for `kiln packages`.

use miette::Result;

use kiln_core::config::GlobalConfig;
use kiln_core::reference::PackageReference;
use kiln_query::{filter_packages, PostfixProgram};
use kiln_store::cache::LocalCache;

pub fn exec(reference: &str, query: Option<&str>) -> Result<()> {
    let config = GlobalConfig::load()?;
    let reference = PackageReference::parse(reference)?;
    let program = PostfixProgram::compile(query.unwrap_or_default())?;

    let packages = LocalCache::from_config(&config).packages(&reference)?;
    let matched = filter_packages(&program, &packages)?;

    if matched.is_empty() {
        println!("No packages of '{reference}' match.");
        return Ok(());
    }
    for (id, info) in matched {
        println!("{id}");
        for (key, value) in &info.settings {
            println!("    {key}={value}");
        }
        for (key, value) in &info.options {
            println!("    options.{key}={value}");
        }
    }
    Ok(())
}
