/// Tests for installing the file logger
mod common;

use carquery::logging::LogConfig;
use carquery::FilterSpec;
use tempfile::tempdir;

#[test]
fn test_file_logging_writes_engine_events() {
    std::env::remove_var("RUST_LOG");
    let dir = tempdir().unwrap();
    let path = dir.path().join("carquery.log");

    let guard = LogConfig::debug().with_file(&path).init().unwrap();
    assert!(guard.is_some());

    let engine = common::engine();
    engine
        .search(&FilterSpec::new().at_least("Year", 2020))
        .unwrap();
    drop(guard);

    let logged: String = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("carquery.log"))
        .map(|entry| std::fs::read_to_string(entry.path()).unwrap())
        .collect();
    assert!(logged.contains("Opened CarQuery engine"));

    // Only one global subscriber per process
    assert!(LogConfig::info().init().is_err());
}
