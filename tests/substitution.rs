//! Integration tests for `{$key}` placeholder substitution.

use harness_config::prelude::*;
use proptest::prelude::*;

#[test]
fn test_query_substitution() {
    let mut runtime = RuntimeProperties::new();
    runtime.put("name", "Alice");
    runtime.put("lastName", "Smith");

    let sql = runtime
        .substitute("select * from t where name = {$name} and lastName = {$lastName}")
        .unwrap();
    assert_eq!(sql, "select * from t where name = Alice and lastName = Smith");
}

#[test]
fn test_missing_placeholder_names_key() {
    let err = RuntimeProperties::new()
        .substitute("select * from t where id = {$missing}")
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnresolvedKey { ref key, .. } if key == "missing"));
    assert!(err.to_string().contains("missing"));
}

#[test]
fn test_empty_template() {
    assert_eq!(RuntimeProperties::new().substitute("").unwrap(), "");
}

#[test]
fn test_cycle_is_reported() {
    let runtime: RuntimeProperties = [("a", "{$b}"), ("b", "x {$a}")].into_iter().collect();
    let err = runtime.substitute("{$a}").unwrap_err();
    match err {
        ConfigError::CyclicSubstitution { chain } => assert_eq!(chain, ["a", "b", "a"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_values_captured_mid_scenario() {
    let config = HarnessConfig::new(PropertyStore::new());
    let mut scenario = ScenarioContext::new(config);

    scenario.runtime_mut().put("customer", "C-1");
    scenario.runtime_mut().put("order", "{$customer}-O-7");
    assert_eq!(
        scenario.substitute("delete from orders where ref = '{$order}'").unwrap(),
        "delete from orders where ref = 'C-1-O-7'"
    );
}

proptest! {
    #[test]
    fn prop_templates_without_marker_are_unchanged(template in "[^{]*") {
        let runtime: RuntimeProperties = [("k", "v")].into_iter().collect();
        prop_assert_eq!(runtime.substitute(&template).unwrap(), template);
    }

    #[test]
    fn prop_every_occurrence_is_replaced(
        key in "[A-Za-z][A-Za-z0-9_]{0,12}",
        value in "[A-Za-z0-9 ='@.]{0,24}",
        prefix in "[a-z =]{0,10}",
        repeats in 1usize..5,
    ) {
        let mut runtime = RuntimeProperties::new();
        runtime.put(key.clone(), value.clone());

        let placeholder = format!("{{${}}}", key);
        let template = format!("{}{}", prefix, placeholder.repeat(repeats));
        let expected = format!("{}{}", prefix, value.repeat(repeats));
        prop_assert_eq!(runtime.substitute(&template).unwrap(), expected);
    }
}
