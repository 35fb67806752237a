use kiln_util::fs::{ensure_dir, subdirectories};
use tempfile::TempDir;

#[test]
fn test_ensure_dir_creates_nested() {
    let tmp = TempDir::new().unwrap();
    let nested = tmp.path().join("x").join("y").join("z");
    ensure_dir(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn test_ensure_dir_existing_is_ok() {
    let tmp = TempDir::new().unwrap();
    ensure_dir(tmp.path()).unwrap();
    assert!(tmp.path().is_dir());
}

#[test]
fn test_subdirectories_sorted_and_dirs_only() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("zlib")).unwrap();
    std::fs::create_dir(tmp.path().join("boost")).unwrap();
    std::fs::write(tmp.path().join("readme.txt"), "").unwrap();

    let names = subdirectories(tmp.path()).unwrap();
    assert_eq!(names, vec!["boost".to_string(), "zlib".to_string()]);
}

#[test]
fn test_subdirectories_missing_dir_is_empty() {
    let tmp = TempDir::new().unwrap();
    let names = subdirectories(&tmp.path().join("nope")).unwrap();
    assert!(names.is_empty());
}
