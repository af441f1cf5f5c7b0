use super::*;

use std::collections::HashMap;

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = load_settings_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.database.pool_size, 4);
    assert_eq!(settings.auth.permission_prefix, "comicdex");
    assert!(settings.cache.enabled);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[cache]\nttl_secs = 30\n").unwrap();
    let settings = load_settings_from(&path).unwrap();
    assert_eq!(settings.cache.ttl_secs, 30);
    assert_eq!(settings.cache.sweep_secs, 60);
    assert_eq!(settings.database, DatabaseSettings::default());
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[cache\n").unwrap();
    assert!(matches!(
        load_settings_from(&path),
        Err(SettingsError::Parse { .. })
    ));
}

#[test]
fn environment_overrides_file() {
    let mut settings = Settings::default();
    settings
        .apply_env(env(&[
            ("COMICDEX_DATABASE_PATH", "/tmp/catalog.db"),
            ("COMICDEX_DATABASE_POOL_SIZE", "8"),
            ("COMICDEX_AUTH_PERMISSION_PREFIX", "catalog"),
            ("COMICDEX_CACHE_ENABLED", "false"),
        ]))
        .unwrap();
    assert_eq!(settings.database.resolved_path(), PathBuf::from("/tmp/catalog.db"));
    assert_eq!(settings.database.pool_size, 8);
    assert_eq!(settings.auth.permission_prefix, "catalog");
    assert!(!settings.cache.enabled);
}

#[test]
fn bad_environment_value_names_the_variable() {
    let mut settings = Settings::default();
    let err = settings
        .apply_env(env(&[("COMICDEX_CACHE_TTL_SECS", "soon")]))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value \"soon\" for COMICDEX_CACHE_TTL_SECS"
    );
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.toml");
    let mut settings = Settings::default();
    settings.database.path = Some(dir.path().join("catalog.db"));
    settings.cache.sweep_secs = 5;
    save_settings_to(&path, &settings).unwrap();
    assert!(!path.with_extension("toml.tmp").exists());
    assert_eq!(load_settings_from(&path).unwrap(), settings);
}

#[test]
fn sweep_interval_is_never_zero() {
    let cache = CacheSettings {
        sweep_secs: 0,
        ..CacheSettings::default()
    };
    assert_eq!(cache.sweep_interval(), Duration::from_secs(1));
}
