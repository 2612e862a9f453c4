#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Error, Result, anyhow};
use exception_mailer::{
    clients::{
        mailer::{MailProcessor, ProcessError},
        queue::{QueueItem, QueueStore},
        recipients::RecipientResolver,
    },
    config::Config,
    models::record::{NotificationRecord, UserRef},
};

pub fn test_config() -> Config {
    Config {
        site_name: "Example Site".to_string(),
        admin_role: "administrator".to_string(),
        notification_levels: vec!["ERROR".to_string(), "CRITICAL".to_string()],
        queue_name: "admin_error_notifications".to_string(),
        claim_lease_seconds: 3600,
        user_service_url: "http://localhost:0".to_string(),
        smtp_host: "localhost".to_string(),
        smtp_port: 587,
        smtp_username: "mailer".to_string(),
        smtp_password: "secret".to_string(),
        smtp_from: "Site Admin <noreply@example.com>".to_string(),
        circuit_breaker_failure_threshold: 3,
        circuit_breaker_timeout_seconds: 30,
        circuit_breaker_success_threshold: 2,
        max_retry_attempts: 3,
        initial_retry_delay_ms: 10,
        max_retry_delay_ms: 50,
        retry_backoff_multiplier: 2,
        server_port: 0,
    }
}

pub fn sample_record(recipient: &str) -> NotificationRecord {
    NotificationRecord {
        recipient: recipient.to_string(),
        exception_kind: String::new(),
        message: "Something broke".to_string(),
        site: "Example Site".to_string(),
        timestamp: Some(1_700_000_000),
        date: None,
        user: UserRef::Id(1),
        severity: Some("ERROR".to_string()),
        channel: Some("cron".to_string()),
        link: Some(String::new()),
        request_uri: "https://example.com/page".to_string(),
        referrer: String::new(),
        hostname: "203.0.113.9".to_string(),
    }
}

/// Per-recipient processing outcome for [`FakeMailer`]. Recipients without a
/// configured outcome are delivered.
#[derive(Debug, Clone, Copy)]
pub enum FakeOutcome {
    Deliver,
    Suspend,
    Fail,
}

/// Scripted mail processor recording every record it was handed, in order.
#[derive(Default)]
pub struct FakeMailer {
    outcomes: Mutex<HashMap<String, FakeOutcome>>,
    processed: Mutex<Vec<NotificationRecord>>,
}

impl FakeMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_outcome(&self, recipient: &str, outcome: FakeOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(recipient.to_string(), outcome);
    }

    pub fn processed(&self) -> Vec<NotificationRecord> {
        self.processed.lock().unwrap().clone()
    }

    pub fn processed_recipients(&self) -> Vec<String> {
        self.processed
            .lock()
            .unwrap()
            .iter()
            .map(|record| record.recipient.clone())
            .collect()
    }
}

impl MailProcessor for FakeMailer {
    async fn process(&self, record: &NotificationRecord) -> Result<(), ProcessError> {
        self.processed.lock().unwrap().push(record.clone());

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(&record.recipient)
            .copied()
            .unwrap_or(FakeOutcome::Deliver);

        match outcome {
            FakeOutcome::Deliver => Ok(()),
            FakeOutcome::Suspend => Err(ProcessError::Suspend),
            FakeOutcome::Fail => Err(ProcessError::Failed(anyhow!("simulated delivery failure"))),
        }
    }
}

/// Fixed-list recipient resolver, optionally failing every lookup.
pub struct FakeResolver {
    emails: Vec<String>,
    fail: bool,
}

impl FakeResolver {
    pub fn with_emails(emails: &[&str]) -> Self {
        Self {
            emails: emails.iter().map(|email| email.to_string()).collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            emails: Vec::new(),
            fail: true,
        }
    }
}

impl RecipientResolver for FakeResolver {
    async fn emails_for_role(&self, _role: &str) -> Result<Vec<String>, Error> {
        if self.fail {
            return Err(anyhow!("user service unavailable"));
        }
        Ok(self.emails.clone())
    }
}

/// Queue store whose storage layer is down: every enqueue fails.
pub struct FailingQueue;

impl QueueStore for FailingQueue {
    async fn enqueue(&self, _record: &NotificationRecord) -> Result<(), Error> {
        Err(anyhow!("queue storage unavailable"))
    }

    async fn claim(&self) -> Result<Option<QueueItem>, Error> {
        Ok(None)
    }

    async fn delete(&self, _item: &QueueItem) -> Result<(), Error> {
        Ok(())
    }

    async fn release(&self, _item: &QueueItem) -> Result<(), Error> {
        Ok(())
    }
}
