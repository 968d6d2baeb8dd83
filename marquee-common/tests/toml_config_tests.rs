//! Config file load/resolve tests

use marquee_common::config::{load_toml_config, resolve_toml_config};
use marquee_common::Error;
use tempfile::TempDir;

#[test]
fn test_resolve_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("custom.toml");
    std::fs::write(
        &target,
        r#"
        [logging]
        level = "warn"

        [scrape]
        batch_size = 5
        include_details = false
        "#,
    )
    .unwrap();

    let config = resolve_toml_config(Some(&target)).unwrap();

    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.scrape.batch_size, Some(5));
    assert_eq!(config.scrape.include_details, Some(false));
    assert!(config.scrape.concurrency_limit.is_none());
}

#[test]
fn test_malformed_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("broken.toml");
    std::fs::write(&target, "[scrape\nbatch_size = ").unwrap();

    let result = load_toml_config(&target);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_wrong_value_type_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("typed.toml");
    std::fs::write(&target, "[scrape]\nconcurrency_limit = \"ten\"\n").unwrap();

    let result = resolve_toml_config(Some(&target));
    assert!(matches!(result, Err(Error::Config(_))));
}
