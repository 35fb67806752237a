use std::collections::BTreeMap;

use kiln_core::config::GlobalConfig;
use kiln_core::package_info::PackageInfo;
use kiln_core::pattern::RefPattern;
use kiln_core::reference::PackageReference;
use kiln_core::search::LocalSearch;
use kiln_store::cache::{LocalCache, RECIPE_FILE};

fn r(s: &str) -> PackageReference {
    PackageReference::parse(s).unwrap()
}

fn populated() -> (tempfile::TempDir, LocalCache) {
    let tmp = tempfile::tempdir().unwrap();
    let cache = LocalCache::new(tmp.path().join("data"));
    for reference in [
        "zlib/1.2.11",
        "zlib/1.2.13",
        "zlib/1.3@lasote/stable",
        "openssl/3.0.12",
    ] {
        cache.export(&r(reference), "").unwrap();
    }
    (tmp, cache)
}

#[test]
fn references_lists_exported_recipes() {
    let (_tmp, cache) = populated();
    let refs: Vec<String> = cache
        .references()
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        refs,
        vec![
            "openssl/3.0.12",
            "zlib/1.2.11",
            "zlib/1.2.13",
            "zlib/1.3@lasote/stable",
        ]
    );
}

#[test]
fn directories_without_recipe_are_ignored() {
    let (_tmp, cache) = populated();
    std::fs::create_dir_all(cache.root().join("zlib/2.0/_/_")).unwrap();
    assert!(!cache.contains(&r("zlib/2.0")));
    assert_eq!(cache.references().unwrap().len(), 4);
}

#[test]
fn search_keeps_qualifiers_exact() {
    let (_tmp, cache) = populated();

    let plain = RefPattern::versions_of("zlib", None, None).unwrap();
    let found = LocalSearch::search(&cache, &plain).unwrap();
    assert_eq!(found, vec![r("zlib/1.2.11"), r("zlib/1.2.13")]);

    let stable = RefPattern::versions_of("zlib", Some("lasote"), Some("stable")).unwrap();
    assert_eq!(cache.search(&stable).unwrap(), vec![r("zlib/1.3@lasote/stable")]);
}

#[test]
fn free_form_search() {
    let (_tmp, cache) = populated();
    let pattern = RefPattern::parse("*@lasote/*").unwrap();
    assert_eq!(cache.search(&pattern).unwrap(), vec![r("zlib/1.3@lasote/stable")]);

    let pattern = RefPattern::parse("open*").unwrap();
    assert_eq!(cache.search(&pattern).unwrap(), vec![r("openssl/3.0.12")]);
}

#[test]
fn packages_round_trip_through_disk() {
    let (_tmp, cache) = populated();
    let reference = r("zlib/1.2.13");

    let mut linux = PackageInfo::default();
    linux.settings.insert("os".to_string(), "Linux".to_string());
    linux.options.insert("shared".to_string(), "True".to_string());
    let mut windows = PackageInfo::default();
    windows.settings.insert("os".to_string(), "Windows".to_string());

    cache.put_package(&reference, "bbbb", &windows).unwrap();
    cache.put_package(&reference, "aaaa", &linux).unwrap();
    std::fs::create_dir_all(cache.reference_dir(&reference).join("packages/cccc")).unwrap();

    let packages = cache.packages(&reference).unwrap();
    let expected: BTreeMap<String, PackageInfo> =
        BTreeMap::from([("aaaa".to_string(), linux), ("bbbb".to_string(), windows)]);
    assert_eq!(packages, expected);
}

#[test]
fn recipe_without_packages_has_none() {
    let (_tmp, cache) = populated();
    assert!(cache.packages(&r("openssl/3.0.12")).unwrap().is_empty());
}

#[test]
fn packages_of_unknown_recipe_is_an_error() {
    let (_tmp, cache) = populated();
    let err = cache.packages(&r("boost/1.83.0")).unwrap_err();
    assert!(err.to_string().contains("boost/1.83.0"));
    assert!(cache
        .put_package(&r("boost/1.83.0"), "aaaa", &PackageInfo::default())
        .is_err());
}

#[test]
fn from_config_uses_storage_path() {
    let tmp = tempfile::tempdir().unwrap();
    let storage = tmp.path().join("store");
    let config = GlobalConfig::parse_toml(&format!(
        "[storage]\npath = {:?}\n",
        storage.display().to_string()
    ))
    .unwrap();
    let cache = LocalCache::from_config(&config);
    assert_eq!(cache.root(), storage);

    let path = cache.export(&r("fmt/10.1.0"), "name = \"fmt\"\n").unwrap();
    assert!(path.ends_with(RECIPE_FILE));
    assert!(cache.contains(&r("fmt/10.1.0")));
}
