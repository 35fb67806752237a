use std::collections::BTreeMap;

use tracing::debug;

use kiln_core::package_info::PackageInfo;

use crate::errors::QueryError;
use crate::program::{split_term, PostfixProgram};

const OPTIONS_PREFIX: &str = "options.";

/// Whether a package configuration record satisfies `program`.
///
/// Keys prefixed with `options.` are looked up among the record's options,
/// all others among its settings. The value `None` also matches a property
/// the record does not have.
pub fn matches_record(program: &PostfixProgram, record: &PackageInfo) -> Result<bool, QueryError> {
    program.evaluate(|term| term_matches(term, record))
}

/// Records from `records` that satisfy `program`, in key order.
pub fn filter_packages<'a>(
    program: &PostfixProgram,
    records: &'a BTreeMap<String, PackageInfo>,
) -> Result<BTreeMap<&'a str, &'a PackageInfo>, QueryError> {
    let mut matched = BTreeMap::new();
    for (id, record) in records {
        if matches_record(program, record)? {
            matched.insert(id.as_str(), record);
        }
    }
    debug!(
        "{} of {} packages match [{program}]",
        matched.len(),
        records.len()
    );
    Ok(matched)
}

fn term_matches(term: &str, record: &PackageInfo) -> bool {
    let (key, expected) = split_term(term);
    let actual = match key.strip_prefix(OPTIONS_PREFIX) {
        Some(option) => record.option(option),
        None => record.setting(key),
    };
    match actual {
        Some(actual) => actual == expected,
        None => expected == "None",
    }
}
