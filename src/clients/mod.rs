pub mod circuit_breaker;
pub mod mailer;
pub mod queue;
pub mod recipients;
