use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{error, warn};

use crate::{
    builder,
    clients::{mailer::MailProcessor, queue::QueueStore, recipients::RecipientResolver},
    config::Config,
    dispatcher::QueueDispatcher,
    models::{exception::AppException, request::RequestContext},
};

/// Display format for the exception path's date field, e.g.
/// "5 Mar 2026 - 14:07 UTC".
const DATE_FORMAT: &str = "%-d %b %Y - %-H:%M %Z";

/// Exception entry point: invoked once per uncaught exception surfaced
/// during request processing. Unlike the log sink it has no severity filter;
/// it fires for every exception outside the two exempted kinds.
pub struct ExceptionSubscriber<Q, M, R>
where
    Q: QueueStore,
    M: MailProcessor,
    R: RecipientResolver,
{
    dispatcher: Arc<QueueDispatcher<Q, M>>,
    resolver: Arc<R>,
    site_name: String,
    admin_role: String,
}

impl<Q, M, R> ExceptionSubscriber<Q, M, R>
where
    Q: QueueStore,
    M: MailProcessor,
    R: RecipientResolver,
{
    pub fn new(config: &Config, dispatcher: Arc<QueueDispatcher<Q, M>>, resolver: Arc<R>) -> Self {
        Self {
            dispatcher,
            resolver,
            site_name: config.site_name.clone(),
            admin_role: config.admin_role.clone(),
        }
    }

    /// Notifies administrators and produces the replacement response.
    ///
    /// Returns `None` for the two exempted kinds: nothing is enqueued and
    /// the in-flight response stays untouched. For every other kind the
    /// returned response is a generic 500 carrying the raw exception message
    /// as its body, and it is returned whether or not notification
    /// succeeded. Dispatch failures are logged, never re-raised.
    pub async fn on_exception(
        &self,
        exception: &AppException,
        request: &RequestContext,
    ) -> Option<Response> {
        if exception.kind.is_exempt() {
            return None;
        }

        let date = Utc::now().format(DATE_FORMAT).to_string();

        let recipients = match self.resolver.emails_for_role(&self.admin_role).await {
            Ok(recipients) => recipients,
            Err(e) => {
                warn!(error = %e, "Failed to resolve notification recipients");
                Vec::new()
            }
        };

        let records = builder::exception_records(
            &self.site_name,
            exception,
            request,
            &date,
            &recipients,
        );

        if let Err(e) = self.dispatcher.dispatch(records).await {
            error!(error = %e, "Failed to enqueue exception notifications");
        }

        error!(kind = exception.kind.name(), "{}", exception.message);

        Some((StatusCode::INTERNAL_SERVER_ERROR, exception.message.clone()).into_response())
    }
}
