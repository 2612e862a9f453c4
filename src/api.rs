use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    clients::{
        mailer::{MailProcessor, SmtpMailer},
        queue::MemoryQueue,
        recipients::{HttpRecipientResolver, RecipientResolver},
    },
    config::Config,
    dispatcher::QueueDispatcher,
    models::{
        exception::AppException,
        request::{CurrentUser, RequestContext},
        severity::SeverityFilter,
    },
    subscriber::ExceptionSubscriber,
};

pub struct AppState<M, R>
where
    M: MailProcessor,
    R: RecipientResolver,
{
    pub subscriber: ExceptionSubscriber<MemoryQueue, M, R>,
    pub queue: MemoryQueue,
    pub config: Config,
}

#[derive(Debug, Serialize)]
struct HealthView {
    status: &'static str,
    queue_name: String,
    pending_items: usize,
    claimed_items: usize,
}

#[derive(Debug, Serialize)]
struct SettingsView {
    site_name: String,
    notification_levels: Vec<String>,
    queue_name: String,
}

/// Builds the service router: the read-only operational endpoints plus the
/// exception-capture middleware realizing the framework's top-level error
/// hook.
pub fn build_router<M, R>(state: Arc<AppState<M, R>>) -> Router
where
    M: MailProcessor + 'static,
    R: RecipientResolver + 'static,
{
    Router::new()
        .route("/health", get(health_check::<M, R>))
        .route("/settings", get(settings::<M, R>))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            capture_exceptions::<M, R>,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let queue = MemoryQueue::open(
        &config.queue_name,
        std::time::Duration::from_secs(config.claim_lease_seconds),
    );
    let mailer = SmtpMailer::new(&config)?;
    let resolver = Arc::new(HttpRecipientResolver::new(&config)?);
    let dispatcher = Arc::new(QueueDispatcher::new(queue.clone(), mailer));

    let state = Arc::new(AppState {
        subscriber: ExceptionSubscriber::new(&config, dispatcher, resolver),
        queue,
        config: config.clone(),
    });

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Notification service started");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Runs the inner service and, when the response carries an uncaught
/// [`AppException`], hands it with the request context to the subscriber and
/// substitutes the subscriber's 500 response. Exempt kinds pass through with
/// their original response.
pub async fn capture_exceptions<M, R>(
    State(state): State<Arc<AppState<M, R>>>,
    request: Request,
    next: Next,
) -> Response
where
    M: MailProcessor + 'static,
    R: RecipientResolver + 'static,
{
    let context = request_context(&request);

    let response = next.run(request).await;

    if let Some(exception) = response.extensions().get::<AppException>().cloned() {
        if let Some(replaced) = state.subscriber.on_exception(&exception, &context).await {
            return replaced;
        }
    }

    response
}

fn request_context(request: &Request) -> RequestContext {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string()
    };

    let user_name = request
        .extensions()
        .get::<CurrentUser>()
        .map(|user| user.0.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    RequestContext {
        uri: request.uri().to_string(),
        referrer: header("referer"),
        client_ip: header("x-forwarded-for"),
        user_name,
    }
}

async fn health_check<M, R>(State(state): State<Arc<AppState<M, R>>>) -> impl IntoResponse
where
    M: MailProcessor + 'static,
    R: RecipientResolver + 'static,
{
    Json(HealthView {
        status: "ok",
        queue_name: state.queue.name().to_string(),
        pending_items: state.queue.pending_count(),
        claimed_items: state.queue.claimed_count(),
    })
}

async fn settings<M, R>(State(state): State<Arc<AppState<M, R>>>) -> impl IntoResponse
where
    M: MailProcessor + 'static,
    R: RecipientResolver + 'static,
{
    let filter = SeverityFilter::from_names(&state.config.notification_levels);

    Json(SettingsView {
        site_name: state.config.site_name.clone(),
        notification_levels: filter.enabled_names(),
        queue_name: state.config.queue_name.clone(),
    })
}
