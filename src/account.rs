//! Login and registration
//!
//! Credentials are 3-20 characters of ASCII letters, digits or `_`.

use crate::persistence::{PlayerRecordStore, StoreError};

pub const MIN_CREDENTIAL_LEN: usize = 3;
pub const MAX_CREDENTIAL_LEN: usize = 20;

#[derive(thiserror::Error, Debug)]
pub enum AccountError {
    #[error("Username and password need at least 3 characters")]
    TooShort,

    #[error("Username and password are limited to 20 characters")]
    TooLong,

    #[error("Only letters, digits and '_' are allowed")]
    InvalidCharacter,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Wrong username or password")]
    BadCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Check one credential field
pub fn validate_credential(value: &str) -> Result<(), AccountError> {
    let len = value.chars().count();
    if len < MIN_CREDENTIAL_LEN {
        return Err(AccountError::TooShort);
    }
    if len > MAX_CREDENTIAL_LEN {
        return Err(AccountError::TooLong);
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AccountError::InvalidCharacter);
    }
    Ok(())
}

/// Create an account with default progress
pub fn register(
    store: &mut dyn PlayerRecordStore,
    username: &str,
    password: &str,
) -> Result<(), AccountError> {
    validate_credential(username)?;
    validate_credential(password)?;
    if !store.register(username, password)? {
        return Err(AccountError::UsernameTaken);
    }
    Ok(())
}

/// Verify credentials, returning the username to start a session with
pub fn login(
    store: &dyn PlayerRecordStore,
    username: &str,
    password: &str,
) -> Result<String, AccountError> {
    validate_credential(username)?;
    validate_credential(password)?;
    if !store.authenticate(username, password) {
        log::info!("Rejected login for {}", username);
        return Err(AccountError::BadCredentials);
    }
    log::info!("{} logged in", username);
    Ok(username.to_string())
}
