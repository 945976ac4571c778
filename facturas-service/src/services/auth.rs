//! Credential authentication: two configured pairs, the admin and the
//! workspace-locked client.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tracing::{info, instrument};

use crate::config::AuthConfig;
use crate::services::jwt::JwtService;

/// Account role carried in the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

/// Result of a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<i64>,
}

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(config: AuthConfig, jwt: JwtService) -> Self {
        Self { config, jwt }
    }

    /// Verify a credential pair and issue an access token. The admin picks a
    /// workspace per request; the client is locked to the configured one.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let email = email.trim();

        if email.is_empty() || password.is_empty() {
            return Err(AppError::AuthError(anyhow::anyhow!("Invalid credentials")));
        }

        let (sub, role, workspace_id) = if email == self.config.admin_email
            && password == self.config.admin_password.expose_secret()
        {
            ("admin-1", Role::Admin, None)
        } else if email == self.config.client_email
            && password == self.config.client_password.expose_secret()
        {
            (
                "client-1",
                Role::Client,
                Some(self.config.client_workspace_id),
            )
        } else {
            return Err(AppError::AuthError(anyhow::anyhow!("Invalid credentials")));
        };

        let (access_token, expires_in) = self.jwt.issue(sub, role, workspace_id)?;

        info!(subject = %sub, role = ?role, "Login succeeded");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            role,
            workspace_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn auth_service() -> AuthService {
        let config = AuthConfig {
            admin_email: "admin@nexo.example".to_string(),
            admin_password: SecretString::new("admin-pass".to_string()),
            client_email: "claudinei@nexo.example".to_string(),
            client_password: SecretString::new("client-pass".to_string()),
            client_workspace_id: 1,
            jwt_secret: SecretString::new("test-secret".to_string()),
            access_token_expiry_minutes: 60,
        };
        let jwt = JwtService::new(&config.jwt_secret, config.access_token_expiry_minutes);
        AuthService::new(config, jwt)
    }

    #[tokio::test]
    async fn admin_login_succeeds_without_workspace() {
        let auth = auth_service();
        let response = auth
            .login("admin@nexo.example", "admin-pass")
            .await
            .unwrap();
        assert_eq!(response.role, Role::Admin);
        assert_eq!(response.workspace_id, None);
        assert_eq!(response.token_type, "Bearer");
    }

    #[tokio::test]
    async fn client_login_is_workspace_locked() {
        let auth = auth_service();
        let response = auth
            .login("claudinei@nexo.example", "client-pass")
            .await
            .unwrap();
        assert_eq!(response.role, Role::Client);
        assert_eq!(response.workspace_id, Some(1));
    }

    #[tokio::test]
    async fn email_is_trimmed_before_matching() {
        let auth = auth_service();
        let response = auth
            .login("  admin@nexo.example  ", "admin-pass")
            .await
            .unwrap();
        assert_eq!(response.role, Role::Admin);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = auth_service();
        let result = auth.login("admin@nexo.example", "nope").await;
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn unknown_email_is_rejected() {
        let auth = auth_service();
        let result = auth.login("other@nexo.example", "admin-pass").await;
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn empty_credentials_are_rejected() {
        let auth = auth_service();
        assert!(auth.login("", "admin-pass").await.is_err());
        assert!(auth.login("admin@nexo.example", "").await.is_err());
    }
}
