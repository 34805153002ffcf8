//! Integration tests for cache invalidation on file changes.

#![cfg(feature = "file-watch")]

use harness_config::prelude::*;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread")]
async fn test_change_on_disk_is_picked_up() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("Config.properties");
    fs::write(&path, "Environment=Test\nGOOGLEURL_Test=https://old\n").unwrap();

    let config = HarnessConfig::builder()
        .with_properties_dir(temp_dir.path())
        .build()
        .unwrap();
    assert_eq!(config.get_property("GOOGLEURL").unwrap(), "https://old");

    let _watcher = config.watch(Duration::from_millis(50)).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    fs::write(&path, "Environment=Test\nGOOGLEURL_Test=https://new\n").unwrap();

    let mut value = String::new();
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        value = config.get_property("GOOGLEURL").unwrap();
        if value == "https://new" {
            break;
        }
    }
    assert_eq!(value, "https://new");
}

#[tokio::test]
async fn test_watch_requires_properties_dir() {
    let config = HarnessConfig::new(PropertyStore::new());
    assert!(config.watch(Duration::from_millis(50)).is_err());
}
