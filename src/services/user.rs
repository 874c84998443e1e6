use crate::client::{ApiClient, ApiError};
use crate::domain::{ApiResponse, PasswordChange, ProfileUpdate, User};
use serde_json::Value;

#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Current account. Returns `None` without a request when signed out.
    pub async fn current(&self) -> Result<Option<User>, ApiError> {
        if self.api.storage().get_token().await.is_none() {
            return Ok(None);
        }
        self.me().await.map(Some)
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.api.get::<User>("users/me").await?.into_result()
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.api
            .put::<_, User>("users/profile", update)
            .await?
            .into_result()
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<Option<String>, ApiError> {
        let response: ApiResponse<Value> = self.api.put("users/change-password", change).await?;
        Ok(response.message)
    }
}
