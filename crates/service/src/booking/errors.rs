use thiserror::Error;

/// Business errors for booking workflows
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("validation failed: {0}")]
    Validation(String),
    /// Covers both "no such booking" and "not the caller's booking";
    /// the distinction is deliberately hidden.
    #[error("Booking not found")]
    NotFound,
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<models::errors::ModelError> for BookingError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(m) => BookingError::Validation(m),
            models::errors::ModelError::Db(m) => BookingError::Repository(m),
        }
    }
}
