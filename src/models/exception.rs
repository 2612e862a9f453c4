use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Closed set of exception kinds surfaced to the top-level error handler.
///
/// Exactly two kinds are exempt from notification: the AJAX form lifecycle
/// uses exceptions for control flow, and missing resources are routine.
/// The check is exact by construction; there is no category or hierarchy
/// matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    FormAjax,
    NotFound,
    AccessDenied,
    Application,
}

impl ExceptionKind {
    pub fn is_exempt(&self) -> bool {
        matches!(self, ExceptionKind::FormAjax | ExceptionKind::NotFound)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExceptionKind::FormAjax => "FormAjaxException",
            ExceptionKind::NotFound => "NotFoundException",
            ExceptionKind::AccessDenied => "AccessDeniedException",
            ExceptionKind::Application => "ApplicationException",
        }
    }
}

/// An uncaught failure surfaced during request processing.
///
/// Handlers return this through their error path; its [`IntoResponse`]
/// rendering attaches a clone to the response extensions so the
/// exception-capture middleware can hand it to the subscriber.
#[derive(Debug, Clone)]
pub struct AppException {
    pub kind: ExceptionKind,
    pub message: String,
    pub backtrace: String,
}

impl AppException {
    pub fn new(kind: ExceptionKind, message: impl Into<String>, backtrace: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            backtrace: backtrace.into(),
        }
    }
}

impl IntoResponse for AppException {
    fn into_response(self) -> Response {
        let status = match self.kind {
            ExceptionKind::FormAjax => StatusCode::BAD_REQUEST,
            ExceptionKind::NotFound => StatusCode::NOT_FOUND,
            ExceptionKind::AccessDenied => StatusCode::FORBIDDEN,
            ExceptionKind::Application => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut response = (status, self.message.clone()).into_response();
        response.extensions_mut().insert(self);
        response
    }
}
