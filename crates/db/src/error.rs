//! Errors for repository operations that enforce domain rules inside a
//! transaction (wallet debits, campaign launch).

use msgdesk_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Domain(#[from] CoreError),
}
