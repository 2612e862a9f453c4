use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The eight RFC 5424 severity levels, ordered most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Severity {
    /// The name used in persisted configuration and in record labels.
    pub fn config_name(&self) -> &'static str {
        match self {
            Severity::Emergency => "EMERGENCY",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    pub fn from_config_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "EMERGENCY" => Some(Severity::Emergency),
            "ALERT" => Some(Severity::Alert),
            "CRITICAL" => Some(Severity::Critical),
            "ERROR" => Some(Severity::Error),
            "WARNING" => Some(Severity::Warning),
            "NOTICE" => Some(Severity::Notice),
            "INFO" => Some(Severity::Info),
            "DEBUG" => Some(Severity::Debug),
            _ => None,
        }
    }
}

/// Decides whether an event's level is one of the enabled levels.
///
/// Membership is by exact identity, never "at or above": enabling ERROR does
/// not enable CRITICAL.
#[derive(Debug, Clone, Default)]
pub struct SeverityFilter {
    active: HashMap<String, Severity>,
}

impl SeverityFilter {
    /// Builds the active {name -> level} map from persisted configuration.
    /// Configured names outside the fixed enumeration are dropped silently.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let active = names
            .iter()
            .filter_map(|name| {
                Severity::from_config_name(name.as_ref())
                    .map(|level| (level.config_name().to_string(), level))
            })
            .collect();

        Self { active }
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn should_notify(&self, level: Severity) -> bool {
        self.active.values().any(|enabled| *enabled == level)
    }

    /// The configured name the level matched, used as the record's severity
    /// label.
    pub fn label_for(&self, level: Severity) -> Option<&str> {
        self.active
            .iter()
            .find(|(_, enabled)| **enabled == level)
            .map(|(name, _)| name.as_str())
    }

    pub fn enabled_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.active.keys().cloned().collect();
        names.sort();
        names
    }
}
