mod common;

use exception_mailer::{
    clients::mailer::{MailProcessor, ProcessError, SmtpMailer},
    models::circuit_breaker::CircuitState,
};

use common::{sample_record, test_config};

/// Test: an unparseable sender address is a construction error
#[tokio::test]
async fn test_invalid_sender_address_rejected() {
    let mut config = test_config();
    config.smtp_from = "not an address".to_string();

    assert!(SmtpMailer::new(&config).is_err());
}

/// Test: an unparseable recipient fails the item without touching the breaker
#[tokio::test]
async fn test_invalid_recipient_fails_item() {
    let mailer = SmtpMailer::new(&test_config()).unwrap();

    let result = mailer.process(&sample_record("not-an-address")).await;

    assert!(matches!(result, Err(ProcessError::Failed(_))));
    assert_eq!(mailer.breaker().state(), CircuitState::Closed);
}

/// Test: an open breaker suspends processing before any send is attempted
#[tokio::test]
async fn test_open_breaker_suspends_processing() {
    let mailer = SmtpMailer::new(&test_config()).unwrap();
    for _ in 0..3 {
        mailer.breaker().record_failure();
    }
    assert_eq!(mailer.breaker().state(), CircuitState::Open);

    let result = mailer.process(&sample_record("admin@example.com")).await;

    assert!(matches!(result, Err(ProcessError::Suspend)));
}
