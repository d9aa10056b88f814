use std::collections::HashMap;

use tagdesk::config::Config;
use tagdesk::suggest::SuggestOptions;

fn from_map(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_without_environment() {
    let config = from_map(&[]);
    assert_eq!(config.database_url, "sqlite:data/tagdesk.db");
    assert_eq!(config.bind_addr.port(), 3000);
    assert!(!config.secure_cookies);
    assert_eq!(config.tag_name_max_len, 50);
    assert_eq!(config.suggest, SuggestOptions::default());
}

#[test]
fn reads_overrides() {
    let config = from_map(&[
        ("DATABASE_URL", "sqlite::memory:"),
        ("BIND_ADDR", "127.0.0.1:8080"),
        ("SECURE_COOKIES", "true"),
        ("TAG_NAME_MAX_LEN", "80"),
        ("SUGGEST_MAX_RESULTS", "10"),
        ("SUGGEST_MAX_EDIT_DISTANCE", " 2 "),
        ("SUGGEST_MIN_LENGTH", "3"),
    ]);
    assert_eq!(config.database_url, "sqlite::memory:");
    assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
    assert!(config.secure_cookies);
    assert_eq!(config.tag_name_max_len, 80);
    assert_eq!(
        config.suggest,
        SuggestOptions {
            max_results: 10,
            max_edit_distance: 2,
            min_candidate_len: 3,
        }
    );
}

#[test]
fn invalid_values_fall_back_to_defaults() {
    let config = from_map(&[
        ("BIND_ADDR", "not an address"),
        ("SUGGEST_MAX_RESULTS", "-4"),
        ("SUGGEST_MAX_EDIT_DISTANCE", "three"),
    ]);
    assert_eq!(config.bind_addr.port(), 3000);
    assert_eq!(config.suggest, SuggestOptions::default());
}
