use std::sync::Arc;

use anyhow::{Error, Result};
use tracing::debug;

use crate::{
    builder::{self, LogContext},
    clients::{mailer::MailProcessor, queue::QueueStore, recipients::RecipientResolver},
    config::Config,
    dispatcher::QueueDispatcher,
    format::Translator,
    models::severity::{Severity, SeverityFilter},
};

/// Log-sink entry point: receives every structured log event routed through
/// the logging subsystem and notifies administrators of the ones whose level
/// is enabled in configuration.
pub struct ErrorLog<Q, M, R, T>
where
    Q: QueueStore,
    M: MailProcessor,
    R: RecipientResolver,
    T: Translator,
{
    dispatcher: Arc<QueueDispatcher<Q, M>>,
    resolver: Arc<R>,
    translator: T,
    site_name: String,
    admin_role: String,
    notification_levels: Vec<String>,
}

impl<Q, M, R, T> ErrorLog<Q, M, R, T>
where
    Q: QueueStore,
    M: MailProcessor,
    R: RecipientResolver,
    T: Translator,
{
    pub fn new(
        config: &Config,
        dispatcher: Arc<QueueDispatcher<Q, M>>,
        resolver: Arc<R>,
        translator: T,
    ) -> Self {
        Self {
            dispatcher,
            resolver,
            translator,
            site_name: config.site_name.clone(),
            admin_role: config.admin_role.clone(),
            notification_levels: config.notification_levels.clone(),
        }
    }

    /// Filters the event by configured severity and, on a match, enqueues
    /// one record per administrator and drains the queue before returning.
    ///
    /// Only a queue storage failure (or a recipient lookup failure)
    /// propagates to the caller; mail delivery failures stay inside the
    /// drain loop.
    pub async fn log(
        &self,
        level: Severity,
        message: &str,
        context: &LogContext,
    ) -> Result<(), Error> {
        let filter = SeverityFilter::from_names(&self.notification_levels);

        if filter.is_empty() {
            return Ok(());
        }

        if !filter.should_notify(level) {
            debug!(level = level.config_name(), "Log event level not enabled for notification");
            return Ok(());
        }

        let label = filter.label_for(level).unwrap_or(level.config_name());

        let recipients = self.resolver.emails_for_role(&self.admin_role).await?;

        let records = builder::log_records(
            &self.site_name,
            &self.translator,
            label,
            message,
            context,
            &recipients,
        );

        self.dispatcher.dispatch(records).await
    }
}
