use crate::client::ApiError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartError {
    #[error(transparent)]
    Transport(#[from] ApiError),

    #[error("malformed cart response: {0}")]
    MalformedResponse(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
