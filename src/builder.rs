//! Turns a qualifying event into one serializable [`NotificationRecord`] per
//! resolved recipient. All records of one event share the event-derived
//! fields and differ only in `recipient`, in resolver order.
//!
//! The log path and the exception path produce deliberately different record
//! shapes; see [`crate::models::record::NotificationRecord`].

use std::collections::HashMap;

use serde_json::Value;

use crate::{
    format::{Translator, filter_admin, parse_placeholders},
    models::{
        exception::AppException,
        record::{CHANNEL_MAX_CHARS, HOSTNAME_MAX_CHARS, NotificationRecord, UserRef},
        request::RequestContext,
    },
    utils::truncate_chars,
};

/// Structured context attached to a log event by the logging subsystem.
pub type LogContext = HashMap<String, Value>;

/// Context key holding debugging structures that must never reach the queue:
/// they are frequently not serializable.
const BACKTRACE_KEY: &str = "backtrace";

pub fn log_records<T: Translator>(
    site: &str,
    translator: &T,
    severity_label: &str,
    message: &str,
    context: &LogContext,
    recipients: &[String],
) -> Vec<NotificationRecord> {
    let mut context = context.clone();
    context.remove(BACKTRACE_KEY);

    let placeholders = parse_placeholders(message, &context);
    let text = translator.translate(&filter_admin(message), &placeholders);

    let timestamp = ctx_i64(&context, "timestamp").unwrap_or_else(|| chrono::Utc::now().timestamp());
    let uid = ctx_i64(&context, "uid").unwrap_or(0);
    let channel = truncate_chars(&ctx_str(&context, "channel"), CHANNEL_MAX_CHARS);
    let hostname = truncate_chars(&ctx_str(&context, "ip"), HOSTNAME_MAX_CHARS);

    recipients
        .iter()
        .map(|recipient| NotificationRecord {
            recipient: recipient.clone(),
            exception_kind: String::new(),
            message: text.clone(),
            site: site.to_string(),
            timestamp: Some(timestamp),
            date: None,
            user: UserRef::Id(uid),
            severity: Some(severity_label.to_string()),
            channel: Some(channel.clone()),
            link: Some(ctx_str(&context, "link")),
            request_uri: ctx_str(&context, "request_uri"),
            referrer: ctx_str(&context, "referer"),
            hostname: hostname.clone(),
        })
        .collect()
}

pub fn exception_records(
    site: &str,
    exception: &AppException,
    request: &RequestContext,
    date: &str,
    recipients: &[String],
) -> Vec<NotificationRecord> {
    // The raw message plus the backtrace, untranslated and unsanitized: the
    // audience is administrators reading plain-text email.
    let message = format!("{}\n{}", exception.message, exception.backtrace);
    let hostname = truncate_chars(&request.client_ip, HOSTNAME_MAX_CHARS);

    recipients
        .iter()
        .map(|recipient| NotificationRecord {
            recipient: recipient.clone(),
            exception_kind: exception.kind.name().to_string(),
            message: message.clone(),
            site: site.to_string(),
            timestamp: None,
            date: Some(date.to_string()),
            user: UserRef::Name(request.user_name.clone()),
            severity: None,
            channel: None,
            link: None,
            request_uri: request.uri.clone(),
            referrer: request.referrer.clone(),
            hostname: hostname.clone(),
        })
        .collect()
}

fn ctx_str(context: &LogContext, key: &str) -> String {
    match context.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn ctx_i64(context: &LogContext, key: &str) -> Option<i64> {
    match context.get(key) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}
