use exception_mailer::models::severity::{Severity, SeverityFilter};

const ALL_LEVELS: [Severity; 8] = [
    Severity::Emergency,
    Severity::Alert,
    Severity::Critical,
    Severity::Error,
    Severity::Warning,
    Severity::Notice,
    Severity::Info,
    Severity::Debug,
];

/// Test: a level notifies iff its name is in the configured set
#[test]
fn test_membership_is_exact_identity() {
    let filter = SeverityFilter::from_names(&["ERROR".to_string(), "CRITICAL".to_string()]);

    for level in ALL_LEVELS {
        let expected = matches!(level, Severity::Error | Severity::Critical);
        assert_eq!(
            filter.should_notify(level),
            expected,
            "level {:?}",
            level
        );
    }
}

/// Test: enabling a level does not enable more severe levels
#[test]
fn test_no_threshold_semantics() {
    let filter = SeverityFilter::from_names(&["WARNING".to_string()]);

    assert!(filter.should_notify(Severity::Warning));
    assert!(!filter.should_notify(Severity::Error));
    assert!(!filter.should_notify(Severity::Emergency));
}

/// Test: every name of the fixed enumeration is recognized
#[test]
fn test_all_names_recognized() {
    let names: Vec<String> = ALL_LEVELS
        .iter()
        .map(|level| level.config_name().to_string())
        .collect();

    let filter = SeverityFilter::from_names(&names);

    for level in ALL_LEVELS {
        assert!(filter.should_notify(level));
    }
}

/// Test: unrecognized configured names never cause a match
#[test]
fn test_unknown_names_are_dropped() {
    let filter = SeverityFilter::from_names(&[
        "FATAL".to_string(),
        "VERBOSE".to_string(),
        "ERROR".to_string(),
    ]);

    assert_eq!(filter.enabled_names(), vec!["ERROR".to_string()]);
    assert!(filter.should_notify(Severity::Error));
    assert!(!filter.should_notify(Severity::Debug));
}

/// Test: only unrecognized names leaves the filter empty
#[test]
fn test_only_unknown_names_is_empty() {
    let filter = SeverityFilter::from_names(&["FATAL".to_string()]);

    assert!(filter.is_empty());
    for level in ALL_LEVELS {
        assert!(!filter.should_notify(level));
    }
}

/// Test: configured names are matched case-insensitively
#[test]
fn test_names_case_insensitive() {
    let filter = SeverityFilter::from_names(&["error".to_string()]);

    assert!(filter.should_notify(Severity::Error));
    assert_eq!(filter.label_for(Severity::Error), Some("ERROR"));
}

/// Test: the label is the canonical configured name of the matched level
#[test]
fn test_label_for_matched_level() {
    let filter = SeverityFilter::from_names(&["ERROR".to_string(), "CRITICAL".to_string()]);

    assert_eq!(filter.label_for(Severity::Error), Some("ERROR"));
    assert_eq!(filter.label_for(Severity::Critical), Some("CRITICAL"));
    assert_eq!(filter.label_for(Severity::Warning), None);
}
