use thiserror::Error;

use super::storage::StorageError;
use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
