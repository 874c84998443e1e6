use crate::client::{ApiClient, ApiError};
use crate::domain::{ApiResponse, AuthResult, LoginRequest, RegisterRequest, User};
use crate::logging::log_success;
use crate::services::user::UserService;
use crate::storage::StorageError;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("server did not return a token")]
    MissingToken,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<ApiResponse<Value>, AuthError> {
        Ok(self.api.post("auth/register", request).await?)
    }

    /// Exchanges credentials for a token without storing it.
    pub async fn login(&self, request: &LoginRequest) -> Result<String, AuthError> {
        let response: ApiResponse<AuthResult> = self.api.post("auth/login", request).await?;

        response
            .result
            .and_then(|r| r.token)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)
    }

    /// Logs in, keeps the token for later requests and loads the profile.
    pub async fn login_and_store(&self, request: &LoginRequest) -> Result<User, AuthError> {
        let token = self.login(request).await?;
        self.api.storage().store_token(Some(token.as_str())).await?;

        let user = UserService::new(self.api.clone()).me().await?;
        log_success(&format!("Signed in as {}", user.username));
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.api.storage().clear_token().await?;
        Ok(())
    }

    /// Token presence only; the server decides whether it is still valid.
    pub async fn is_authenticated(&self) -> bool {
        self.api.storage().get_token().await.is_some()
    }
}
