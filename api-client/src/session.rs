//! Signed-in user session

use inventu_core::storage::{keys, LocalStorage};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ApiService;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

/// Persists the current user alongside the API token
#[derive(Clone)]
pub struct Session {
    storage: LocalStorage,
}

impl Session {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    pub async fn current_user(&self) -> Result<Option<User>> {
        Ok(self.storage.get(keys::USER).await?)
    }

    pub async fn sign_in(&self, api: &ApiService, user: &User, token: &str) -> Result<()> {
        self.storage.set(keys::USER, user).await?;
        api.set_token(token).await?;
        info!("Signed in as {}", user.email);
        Ok(())
    }

    pub async fn sign_out(&self, api: &ApiService) -> Result<()> {
        self.storage.remove(keys::USER).await?;
        api.clear_token().await?;
        info!("Signed out");
        Ok(())
    }

    /// Admin-only views check this before loading
    pub async fn is_admin(&self) -> Result<bool> {
        Ok(self
            .current_user()
            .await?
            .is_some_and(|user| user.role == UserRole::Admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    fn admin() -> User {
        User {
            id: "u-1".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            role: UserRole::Admin,
        }
    }

    fn setup() -> (LocalStorage, ApiService, Session) {
        let storage = LocalStorage::in_memory();
        let api = ApiService::with_config(
            storage.clone(),
            ApiConfig::new("http://localhost:3001").unwrap(),
        );
        let session = Session::new(storage.clone());
        (storage, api, session)
    }

    #[tokio::test]
    async fn sign_in_stores_user_and_token() {
        let (storage, api, session) = setup();

        session.sign_in(&api, &admin(), "tok-1").await.unwrap();

        assert_eq!(session.current_user().await.unwrap(), Some(admin()));
        assert!(session.is_admin().await.unwrap());
        assert_eq!(api.config().await.token.as_deref(), Some("tok-1"));
        let stored: Option<String> = storage.get(keys::API_TOKEN).await.unwrap();
        assert_eq!(stored.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn sign_out_clears_everything() {
        let (storage, api, session) = setup();
        session.sign_in(&api, &admin(), "tok-1").await.unwrap();

        session.sign_out(&api).await.unwrap();

        assert!(session.current_user().await.unwrap().is_none());
        assert!(!session.is_admin().await.unwrap());
        assert!(api.config().await.token.is_none());
        let stored: Option<String> = storage.get(keys::API_TOKEN).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn regular_user_is_not_admin() {
        let (_storage, api, session) = setup();
        let user = User {
            role: UserRole::User,
            ..admin()
        };

        session.sign_in(&api, &user, "tok-2").await.unwrap();
        assert!(!session.is_admin().await.unwrap());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(admin()).unwrap();
        assert_eq!(json["role"], "admin");
    }
}
