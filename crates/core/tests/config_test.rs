use gav_core::config::Config;
use std::io::Write;

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.server.port, 4000);
    assert_eq!(config.server.broadcast_capacity, 16);
    assert!(config.watcher.enabled);
}

// Environment overrides are exercised in a single test so that no other test
// in this binary observes the variables.
#[test]
fn test_environment_overrides() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(file, "[server]\nkeep_alive_secs = 7\n\n[data]\nrecursive = true")?;

    let config = Config::from_file(file.path())?;
    assert_eq!(config.server.keep_alive_secs, 7);
    assert!(config.data.recursive);

    std::env::set_var("GAV_WATCHER__DEBOUNCE_MS", "900");
    std::env::set_var("DATA_DIR", "/tmp/gateway-data");
    let config = Config::from_file(file.path());
    std::env::remove_var("GAV_WATCHER__DEBOUNCE_MS");
    std::env::remove_var("DATA_DIR");

    let config = config?;
    assert_eq!(config.watcher.debounce_ms, 900);
    assert_eq!(config.data.dir, std::path::PathBuf::from("/tmp/gateway-data"));
    Ok(())
}
