use super::*;
use pretty_assertions::assert_eq;

fn args() -> RunArgs {
    RunArgs {
        base_url: None,
        browser: None,
        headed: false,
        timeout: None,
        reruns: 0,
        tests: Vec::new(),
        viewport: None,
        screenshots_dir: None,
        results_dir: None,
        selectors: None,
    }
}

fn env_from(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn test_flags_shadow_invalid_environment() {
    let args = RunArgs {
        browser: Some(BrowserType::Firefox),
        timeout: Some(15_000),
        ..args()
    };
    let config = build_config_with(
        &args,
        env_from(&[("BROWSER", "netscape"), ("TIMEOUT", "soon")]),
    )
    .unwrap();
    assert_eq!(config.browser, BrowserType::Firefox);
    assert_eq!(config.timeout_ms, 15_000);
}

#[test]
fn test_environment_fills_missing_flags() {
    let args = RunArgs {
        base_url: Some("https://flag.test".to_string()),
        ..args()
    };
    let config = build_config_with(
        &args,
        env_from(&[
            ("BASE_URL", "https://env.test"),
            ("BROWSER", "chromium"),
            ("HEADED", "TRUE"),
            ("TIMEOUT", "45000"),
        ]),
    )
    .unwrap();
    assert_eq!(config.base_url, "https://flag.test");
    assert_eq!(config.browser, BrowserType::Chrome);
    assert!(config.headed);
    assert_eq!(config.timeout_ms, 45_000);
}

#[test]
fn test_invalid_environment_without_flag_is_rejected() {
    let err = build_config_with(&args(), env_from(&[("TIMEOUT", "soon")])).unwrap_err();
    assert!(err.to_string().contains("TIMEOUT must be milliseconds"), "{err}");
}
