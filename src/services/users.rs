//! Account registration and login.
//!
//! Login failures never say whether the email or the password was wrong.
//! Both paths answer with the same message so account existence cannot be
//! probed.

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AuthService;
use crate::common::{normalize_email, normalize_person_name};
use crate::entities::user;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Public view of an account; never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }

    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ServiceError> {
        let email = normalize_email(&request.email);

        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(email.clone()))
            .one(self.db.as_ref())
            .await?
            .is_some();
        if taken {
            return Err(ServiceError::Conflict(
                "Email is already registered".to_string(),
            ));
        }

        let password_hash = self.auth.hash_password(&request.password)?;

        let account = user::ActiveModel {
            name: Set(normalize_person_name(&request.name)),
            email: Set(email),
            password_hash: Set(password_hash),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(user_id = account.id, "account registered");
        self.issue_response(account)
    }

    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError> {
        let email = normalize_email(&request.email);

        let account = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid email or password".to_string()))?;

        if !self
            .auth
            .verify_password(&request.password, &account.password_hash)?
        {
            return Err(ServiceError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        info!(user_id = account.id, "user logged in");
        self.issue_response(account)
    }

    fn issue_response(&self, account: user::Model) -> Result<AuthResponse, ServiceError> {
        let token = self.auth.generate_token(account.id)?;
        Ok(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.auth.token_lifetime_secs(),
            user: account.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::time::Duration;

    fn auth() -> Arc<AuthService> {
        Arc::new(AuthService::new(AuthConfig {
            jwt_secret: "test-secret-test-secret-test-secret".to_string(),
            jwt_issuer: "stockpilot-api".to_string(),
            jwt_audience: "stockpilot-clients".to_string(),
            token_lifetime: Duration::from_secs(3600),
        }))
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let existing = user::Model {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "x".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .into_connection();
        let service = UserService::new(Arc::new(db), auth());

        let request = RegisterRequest {
            name: "Ada".to_string(),
            email: "ADA@example.com".to_string(),
            password: "password123".to_string(),
        };
        let err = service.register(request).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_identical() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let service = UserService::new(Arc::new(db), auth());

        let err = service
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "whatever123".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(msg)
            if msg == "Invalid email or password"));
    }

    #[tokio::test]
    async fn login_verifies_the_stored_hash() {
        let auth = auth();
        let hash = auth.hash_password("correct-horse1").unwrap();
        let account = user::Model {
            id: 3,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: hash,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![account]])
            .into_connection();
        let service = UserService::new(Arc::new(db), auth);

        let response = service
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "correct-horse1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.user.id, 3);
        assert_eq!(response.token_type, "Bearer");
    }
}
