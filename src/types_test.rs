// Unit tests for types module

use super::*;

#[test]
fn test_viewport_size_parse() {
    // Valid formats
    let size = ViewportSize::parse("1920x1080").unwrap();
    assert_eq!(size, ViewportSize::default());

    let size = ViewportSize::parse("800x600").unwrap();
    assert_eq!(size.width, 800);
    assert_eq!(size.height, 600);

    // Invalid formats
    assert!(ViewportSize::parse("1920").is_err());
    assert!(ViewportSize::parse("1920x").is_err());
    assert!(ViewportSize::parse("x1080").is_err());
    assert!(ViewportSize::parse("1920X1080").is_err()); // uppercase X
}

#[test]
fn test_load_state_document_ready() {
    let interactive = LoadSnapshot {
        ready_state: "interactive".to_string(),
        resource_count: 3,
    };
    let complete = LoadSnapshot {
        ready_state: "complete".to_string(),
        resource_count: 3,
    };

    assert!(LoadState::DomContentLoaded.document_ready(&interactive));
    assert!(!LoadState::Load.document_ready(&interactive));
    assert!(!LoadState::NetworkIdle.document_ready(&interactive));
    assert!(LoadState::Load.document_ready(&complete));
    assert_eq!(LoadState::NetworkIdle.to_string(), "networkidle");
}

#[test]
fn test_outcome_classification() {
    assert!(TestOutcome::Failed("boom".into()).is_failed());
    assert!(!TestOutcome::Broken("no driver".into()).is_failed());
    assert!(TestOutcome::Broken("no driver".into()).counts_as_failure());
    assert!(!TestOutcome::Skipped("absent".into()).counts_as_failure());
    assert_eq!(TestOutcome::Passed.reason(), None);
    assert_eq!(TestOutcome::Skipped("absent".into()).reason(), Some("absent"));
}

#[test]
fn test_severity_labels() {
    assert_eq!(Severity::Critical.to_string(), "critical");
    assert_eq!(
        serde_json::to_string(&Severity::Medium).unwrap(),
        "\"medium\""
    );
}
