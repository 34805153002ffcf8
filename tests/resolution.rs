//! Integration tests for environment-qualified property resolution.

use harness_config::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Source that counts how often it is loaded.
struct CountingSource {
    values: HashMap<String, String>,
    loads: Arc<AtomicUsize>,
}

impl PropertySource for CountingSource {
    fn load(&self) -> Result<HashMap<String, String>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.values.clone())
    }

    fn name(&self) -> String {
        "counting".to_string()
    }
}

fn counting(pairs: &[(&str, &str)]) -> (CountingSource, Arc<AtomicUsize>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let source = CountingSource {
        values: pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        loads: Arc::clone(&loads),
    };
    (source, loads)
}

#[test]
fn test_resolves_exact_qualified_key() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("Config.properties"),
        "Environment=Stage\nBrowser=ChromeOnLocal\nGOOGLEURL_Stage=https://stage.example\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("Urls.properties"),
        "GOOGLEURL_CloudStage=https://cloud.example\n",
    )
    .unwrap();

    let config = HarnessConfig::builder()
        .with_properties_dir(temp_dir.path())
        .with_system_args(["-DEnvironment=CloudStage"])
        .build()
        .unwrap();

    assert_eq!(
        config.get_property(WellKnownKey::GoogleUrl).unwrap(),
        "https://cloud.example"
    );
}

#[test]
fn test_unsupported_environment_fails() {
    let (source, _) = counting(&[("Environment", "Prod"), ("GOOGLEURL_Prod", "https://prod")]);
    let config = HarnessConfig::builder().with_source(source).build().unwrap();

    let err = config.get_property("GOOGLEURL").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::UnsupportedEnvironment { ref environment } if environment == "Prod"
    ));
}

#[test]
fn test_environment_lookup_ignores_case() {
    let (source, _) = counting(&[("Environment", "cloudstage"), ("GOOGLEURL_CloudStage", "https://cloud")]);
    let config = HarnessConfig::builder().with_source(source).build().unwrap();
    assert_eq!(config.get_property("GOOGLEURL").unwrap(), "https://cloud");
}

#[test]
fn test_second_read_does_no_io() {
    let (source, loads) = counting(&[("Environment", "Test"), ("GOOGLEURL_Test", "https://test")]);
    let config = HarnessConfig::builder().with_source(source).build().unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    let first = config.get_property("GOOGLEURL").unwrap();
    let second = config.get_property("GOOGLEURL").unwrap();
    assert_eq!(first, second);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_invalidate_reloads_once() {
    let (source, loads) = counting(&[("Environment", "Test"), ("GOOGLEURL_Test", "https://test")]);
    let config = HarnessConfig::builder().with_source(source).build().unwrap();
    config.get_property("GOOGLEURL").unwrap();

    config.invalidate();
    assert!(!config.is_loaded());
    assert_eq!(config.get_property("GOOGLEURL").unwrap(), "https://test");
    config.get_property("GOOGLEURL").unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_missing_key_names_the_key() {
    let (source, _) = counting(&[("Environment", "Stage")]);
    let config = HarnessConfig::builder().with_source(source).build().unwrap();

    let err = config.get_property("SAUCE_KEY").unwrap_err();
    assert!(err.to_string().contains("SAUCE_KEY_Stage"));

    // Failures are not cached; a later system property still wins.
    config.set_system_property("SAUCE_KEY", "abc");
    assert_eq!(config.get_property("SAUCE_KEY").unwrap(), "abc");
}

#[test]
fn test_empty_value_is_unresolved() {
    let (source, _) = counting(&[("Environment", "Stage"), ("DBURL_Stage", "")]);
    let config = HarnessConfig::builder().with_source(source).build().unwrap();
    assert!(matches!(
        config.get_property("DBURL"),
        Err(ConfigError::UnresolvedKey { .. })
    ));
}

#[test]
fn test_explicit_merge_order_decides_duplicates() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("a.properties"),
        "Environment=Stage\nGOOGLEURL_Stage=https://from-a\n",
    )
    .unwrap();
    fs::write(temp_dir.path().join("b.properties"), "GOOGLEURL_Stage=https://from-b\n").unwrap();

    let config = HarnessConfig::builder()
        .with_properties_dir(temp_dir.path())
        .with_merge_order(MergeOrder::Explicit(vec![
            "a.properties".into(),
            "b.properties".into(),
        ]))
        .build()
        .unwrap();
    assert_eq!(config.get_property("GOOGLEURL").unwrap(), "https://from-b");

    let config = HarnessConfig::builder()
        .with_properties_dir(temp_dir.path())
        .with_merge_order(MergeOrder::Explicit(vec![
            "b.properties".into(),
            "a.properties".into(),
        ]))
        .build()
        .unwrap();
    assert_eq!(config.get_property("GOOGLEURL").unwrap(), "https://from-a");
}

#[test]
fn test_source_priority_beats_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("Config.properties"),
        "Environment=Stage\nGOOGLEURL_Stage=https://from-dir\n",
    )
    .unwrap();

    struct Fixed;
    impl PropertySource for Fixed {
        fn load(&self) -> Result<HashMap<String, String>> {
            Ok(HashMap::from([(
                "GOOGLEURL_Stage".to_string(),
                "https://from-source".to_string(),
            )]))
        }
        fn name(&self) -> String {
            "fixed".to_string()
        }
        fn priority(&self) -> i32 {
            200
        }
    }

    let config = HarnessConfig::builder()
        .with_properties_dir(temp_dir.path())
        .with_source(Fixed)
        .build()
        .unwrap();
    assert_eq!(config.get_property("GOOGLEURL").unwrap(), "https://from-source");
}

#[test]
fn test_concurrent_first_reads_agree() {
    let (source, _) = counting(&[("Environment", "Stage2"), ("GOOGLEURL_Stage2", "https://stage2")]);
    let config = HarnessConfig::builder().with_source(source).build().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let config = config.clone();
            std::thread::spawn(move || config.get_property("GOOGLEURL").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "https://stage2");
    }
}

#[test]
fn test_scenarios_do_not_share_runtime_values() {
    let (source, _) = counting(&[("Environment", "Stage")]);
    let config = HarnessConfig::builder().with_source(source).build().unwrap();

    let mut first = ScenarioContext::new(config.clone());
    let second = ScenarioContext::new(config);
    first.runtime_mut().put("orderId", "42");

    assert_eq!(first.substitute("id = {$orderId}").unwrap(), "id = 42");
    assert!(second.substitute("id = {$orderId}").is_err());
}
