//! The shipped example configuration must stay loadable

use chorus_console::ConsoleConfig;
use std::path::Path;

#[test]
fn example_config_loads_and_validates() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("chorus.example.toml");

    let config = ConsoleConfig::load(Some(&path)).unwrap();

    config.validate().unwrap();
    assert_eq!(config.catalog.len(), 3);
    assert_eq!(config.simulation.offline_chats, vec![-404]);
    assert_eq!(config.playback.duration_limit_secs, 10_800);
}
