use std::fmt::{Display, Formatter};
use std::future::Future;

use anyhow::{Error, Result, anyhow};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{debug, info};

use crate::{
    clients::circuit_breaker::CircuitBreaker,
    config::Config,
    models::record::{NotificationRecord, UserRef},
};

/// How processing one queue item went wrong. The drain loop treats the two
/// variants very differently: `Suspend` halts the whole drain and returns the
/// item to the queue, `Failed` abandons the item and keeps draining.
#[derive(Debug)]
pub enum ProcessError {
    /// The transport is unavailable or saturated; retry the queue later.
    Suspend,
    /// This item cannot be delivered; other items are unaffected.
    Failed(Error),
}

impl Display for ProcessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessError::Suspend => write!(f, "mail transport suspended"),
            ProcessError::Failed(e) => write!(f, "mail delivery failed: {}", e),
        }
    }
}

impl std::error::Error for ProcessError {}

/// Delivery boundary the queue dispatcher drains into.
pub trait MailProcessor: Send + Sync {
    fn process(
        &self,
        record: &NotificationRecord,
    ) -> impl Future<Output = Result<(), ProcessError>> + Send;
}

/// SMTP delivery of admin notification emails, guarded by a circuit breaker
/// so a dead relay suspends the drain instead of failing item after item.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    breaker: CircuitBreaker,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| anyhow!("Invalid SMTP relay host: {}", e))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| anyhow!("Invalid SMTP sender address: {}", e))?;

        info!(host = %config.smtp_host, port = config.smtp_port, "SMTP mailer initialized");

        Ok(Self {
            transport,
            from,
            breaker: CircuitBreaker::new("smtp".to_string(), config.circuit_breaker_config()),
        })
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    fn subject(record: &NotificationRecord) -> String {
        if record.exception_kind.is_empty() {
            format!(
                "[{}] {} notification",
                record.site,
                record.severity.as_deref().unwrap_or("ERROR")
            )
        } else {
            format!("[{}] Uncaught exception: {}", record.site, record.exception_kind)
        }
    }

    fn body(record: &NotificationRecord) -> String {
        let mut lines = vec![format!("Site: {}", record.site)];

        match &record.user {
            UserRef::Id(id) => lines.push(format!("User id: {}", id)),
            UserRef::Name(name) => lines.push(format!("User: {}", name)),
        }

        if let Some(severity) = &record.severity {
            lines.push(format!("Severity: {}", severity));
        }
        if let Some(channel) = &record.channel {
            lines.push(format!("Channel: {}", channel));
        }
        if let Some(timestamp) = record.timestamp {
            lines.push(format!("Timestamp: {}", timestamp));
        }
        if let Some(date) = &record.date {
            lines.push(format!("Date: {}", date));
        }

        lines.push(format!("Request URI: {}", record.request_uri));
        lines.push(format!("Referrer: {}", record.referrer));
        lines.push(format!("Hostname: {}", record.hostname));

        if let Some(link) = &record.link {
            lines.push(format!("Link: {}", link));
        }

        lines.push(String::new());
        lines.push(record.message.clone());

        lines.join("\n")
    }
}

impl MailProcessor for SmtpMailer {
    async fn process(&self, record: &NotificationRecord) -> Result<(), ProcessError> {
        if !self.breaker.allow_request() {
            return Err(ProcessError::Suspend);
        }

        let to = record
            .recipient
            .parse::<Mailbox>()
            .map_err(|e| ProcessError::Failed(anyhow!("Invalid recipient address: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(Self::subject(record))
            .header(ContentType::TEXT_PLAIN)
            .body(Self::body(record))
            .map_err(|e| ProcessError::Failed(anyhow!("Failed to build email: {}", e)))?;

        match self.transport.send(message).await {
            Ok(_) => {
                self.breaker.record_success();
                debug!(recipient = %record.recipient, "Notification email sent");
                Ok(())
            }
            Err(e) if e.is_permanent() => {
                // The relay is alive and rejected this message specifically.
                self.breaker.record_success();
                Err(ProcessError::Failed(anyhow!(
                    "SMTP relay rejected message: {}",
                    e
                )))
            }
            Err(_) => {
                self.breaker.record_failure();
                Err(ProcessError::Suspend)
            }
        }
    }
}
