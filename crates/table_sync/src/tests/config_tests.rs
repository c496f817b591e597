use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn defaults_match_table_pages() {
    let settings = SyncSettings::default();
    assert_eq!(settings.results_region, "table-content");
    assert_eq!(settings.controls_region, "pagination-content");
    assert_eq!(settings.marker(), PartialMarker::default());
    assert_eq!(settings.search_debounce(), Duration::from_millis(700));
    assert_eq!(settings.search_min_chars, 2);
    assert_eq!(settings.fallback_retries, 0);
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let settings = parse_settings(
        r#"
query_param = "search"
search_debounce_ms = 250
"#,
    )
    .expect("parse");

    assert_eq!(settings.query_param, "search");
    assert_eq!(settings.search_debounce_ms, 250);
    assert_eq!(settings.results_region, "table-content");
}

#[test]
fn rejects_malformed_file() {
    assert!(parse_settings("search_min_chars = \"two\"").is_err());
}

#[test]
fn env_overrides_take_precedence() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("TABLESYNC_RESULTS_REGION", "rows"),
        ("TABLESYNC_SEARCH_MIN_CHARS", "3"),
        ("TABLESYNC_FALLBACK_RETRIES", "not-a-number"),
    ]);
    let mut settings = SyncSettings::default();

    apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.results_region, "rows");
    assert_eq!(settings.search_min_chars, 3);
    assert_eq!(settings.fallback_retries, 0);
}

#[test]
fn missing_file_yields_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("tablesync_missing_{suffix}.toml"));

    let settings = load_settings_from(&path).expect("defaults");

    assert_eq!(settings.partial_param, "partial");
}

#[test]
fn reads_settings_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("tablesync_settings_{suffix}.toml"));
    fs::write(&path, "controls_region = \"pager\"\n").expect("write");

    let settings = load_settings_from(&path).expect("load");
    assert_eq!(settings.controls_region, "pager");

    fs::remove_file(path).expect("cleanup");
}
