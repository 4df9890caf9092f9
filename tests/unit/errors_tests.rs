/*!
 * Tests for error types and conversions
 */

use vocab_drill::errors::{AppError, StoreError};

#[test]
fn test_storeError_networkFailure_shouldDisplayCorrectly() {
    let error = StoreError::NetworkFailure("connection refused".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Network request failed"));
    assert!(display.contains("connection refused"));
}

#[test]
fn test_storeError_status_shouldCarryCodeAndBody() {
    let error = StoreError::status(500, r#"{"detail":"boom"}"#);
    assert_eq!(error.message(), r#"server responded with status 500: {"detail":"boom"}"#);
}

#[test]
fn test_storeError_shouldBeCloneAndComparable() {
    let error = StoreError::status(404, "");
    assert_eq!(error.clone(), error);
}

#[test]
fn test_appError_fromStoreError_shouldWrap() {
    let error: AppError = StoreError::status(502, "bad gateway").into();
    let display = format!("{}", error);
    assert!(display.starts_with("Store error:"));
    assert!(display.contains("502"));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "conf.json missing");
    let error: AppError = io.into();
    assert!(matches!(error, AppError::File(ref m) if m.contains("conf.json missing")));
}

#[test]
fn test_appError_fromAnyhow_shouldBecomeUnknown() {
    let error: AppError = anyhow::anyhow!("something odd").into();
    assert!(matches!(error, AppError::Unknown(_)));
    assert_eq!(error.to_string(), "Unknown error: something odd");
}

#[test]
fn test_appError_config_shouldDisplayCorrectly() {
    let error = AppError::Config("debounce_ms must be greater than zero".to_string());
    assert_eq!(error.to_string(), "Configuration error: debounce_ms must be greater than zero");
}
