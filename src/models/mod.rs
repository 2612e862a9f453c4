pub mod circuit_breaker;
pub mod exception;
pub mod record;
pub mod request;
pub mod retry;
pub mod severity;
