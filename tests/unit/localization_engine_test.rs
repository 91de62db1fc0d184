use std::collections::HashMap;
use std::fs;

use tempfile::TempDir;

use opacity::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};
use opacity::types::errors::LocaleError;

#[test]
fn test_default_locale_is_english() {
    let engine = LocalizationEngine::new().unwrap();

    assert_eq!(engine.get_locale(), "en");
    assert_eq!(engine.t("tabs.new_tab", None), "New Tab");
    assert_eq!(engine.get_available_locales(), vec!["en", "ko"]);
}

#[test]
fn test_switch_to_korean() {
    let mut engine = LocalizationEngine::new().unwrap();

    engine.set_locale("ko").unwrap();

    assert_eq!(engine.get_locale(), "ko");
    assert_eq!(engine.t("error_page.not_find_host.title", None), "페이지를 찾을 수 없음");
}

#[test]
fn test_unsupported_locale_is_rejected() {
    let mut engine = LocalizationEngine::new().unwrap();

    let result = engine.set_locale("xx");

    assert!(matches!(result, Err(LocaleError::UnsupportedLocale(_))));
    assert_eq!(engine.get_locale(), "en");
}

#[test]
fn test_missing_key_returns_key() {
    let engine = LocalizationEngine::new().unwrap();

    assert_eq!(engine.t("no.such.key", None), "no.such.key");
    // A section is not a translation.
    assert_eq!(engine.t("error_page", None), "error_page");
}

#[test]
fn test_interpolates_parameters() {
    let engine = LocalizationEngine::new().unwrap();

    let message = engine.t_with("error_page.not_find_host.message", "url", "nowhere.test");

    assert_eq!(
        message,
        "The server IP address for 'nowhere.test' could not be found."
    );

    let params = HashMap::from([("other".to_string(), "x".to_string())]);
    assert!(engine
        .t("error_page.not_find_host.message", Some(&params))
        .contains("{url}"));
}

#[test]
fn test_override_dir_falls_back_to_english() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("de.json"),
        r#"{ "tabs": { "new_tab": "Neuer Tab" } }"#,
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    let mut engine = LocalizationEngine::with_override_dir(dir.path()).unwrap();

    engine.set_locale("de").unwrap();

    assert_eq!(engine.t("tabs.new_tab", None), "Neuer Tab");
    assert_eq!(engine.t("tabs.settings", None), "Settings");
    assert_eq!(engine.get_available_locales(), vec!["de", "en", "ko"]);
}

#[test]
fn test_override_dir_errors() {
    let dir = TempDir::new().unwrap();

    let missing = LocalizationEngine::with_override_dir(&dir.path().join("absent"));
    assert!(matches!(missing, Err(LocaleError::FileNotFound(_))));

    fs::write(dir.path().join("en.json"), "{ broken").unwrap();
    let malformed = LocalizationEngine::with_override_dir(dir.path());
    assert!(matches!(malformed, Err(LocaleError::Malformed(_))));
}
