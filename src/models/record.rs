use serde::{Deserialize, Serialize};

/// Longest channel name stored on a record, in characters.
pub const CHANNEL_MAX_CHARS: usize = 64;

/// Longest client hostname stored on a record, in characters.
pub const HOSTNAME_MAX_CHARS: usize = 128;

/// Who triggered the event: a numeric account id on the log path, a display
/// name on the exception path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(i64),
    Name(String),
}

impl Default for UserRef {
    fn default() -> Self {
        UserRef::Name(String::new())
    }
}

/// The unit of work placed on the notification queue, one per recipient.
///
/// The two entry points deliberately populate different subsets of the
/// optional fields: log-originated records carry an epoch `timestamp`,
/// a `severity` label, a `channel` and a `link`; exception-originated records
/// carry a non-empty `exception_kind` and a pre-formatted `date` string.
/// A record is immutable once enqueued and must survive serialization by the
/// queue store between enqueue and claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub recipient: String,

    /// Empty for log-originated records.
    #[serde(default)]
    pub exception_kind: String,

    pub message: String,
    pub site: String,

    /// Epoch seconds; log path only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// Pre-formatted display date; exception path only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    pub user: UserRef,

    /// Name of the matched severity level; log path only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// Emitting subsystem, truncated to [`CHANNEL_MAX_CHARS`]; log path only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Related link supplied by the logging subsystem; log path only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default)]
    pub request_uri: String,

    #[serde(default)]
    pub referrer: String,

    /// Client host or address, truncated to [`HOSTNAME_MAX_CHARS`].
    #[serde(default)]
    pub hostname: String,
}
