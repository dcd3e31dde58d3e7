// vetter-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VetterError {
    // --- DOMAIN (compile aborts, malformed data, missing metadata) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE (IO, parsing, encodings) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- APPLICATION ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for VetterError {
    fn from(err: std::io::Error) -> Self {
        VetterError::Infrastructure(InfrastructureError::Io(err))
    }
}
