//! User service.
//!
//! Authentication is delegated to an external identity provider; this
//! service only resolves the provider's opaque token to a local account
//! and handles the boundary glue for registration.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use trackdrop_common::{AppError, AppResult, IdGenerator};
use trackdrop_db::{
    entities::user,
    repositories::UserRepository,
};
use validator::Validate;

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[validate(length(max = 256))]
    pub display_name: Option<String>,
}

/// Input for updating a user's profile.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(length(max = 256))]
    pub display_name: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    #[validate(url)]
    pub avatar_url: Option<String>,

    pub is_public: Option<bool>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve an identity-provider token to a user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Register a new account and issue its token.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if !input
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AppError::Validation(
                "Username may only contain letters, digits, '_' and '-'".to_string(),
            ));
        }

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            token: Set(Some(self.id_gen.generate_token())),
            display_name: Set(input.display_name),
            bio: Set(None),
            avatar_url: Set(None),
            is_public: Set(true),
            points: Set(0),
            is_admin: Set(false),
            is_super_admin: Set(false),
            followers_count: Set(0),
            following_count: Set(0),
            upload_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.user_repo.create(model).await?;
        tracing::info!(user_id = %created.id, username = %created.username, "User registered");
        Ok(created)
    }

    /// Get a user by ID.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Update a user's own profile.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateUserInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut model: user::ActiveModel = user.into();

        if let Some(display_name) = input.display_name {
            model.display_name = Set(Some(display_name));
        }
        if let Some(bio) = input.bio {
            model.bio = Set(Some(bio));
        }
        if let Some(avatar_url) = input.avatar_url {
            model.avatar_url = Set(Some(avatar_url));
        }
        if let Some(is_public) = input.is_public {
            model.is_public = Set(is_public);
        }
        model.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(model).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            token: Some(format!("token-{id}")),
            display_name: None,
            bio: None,
            avatar_url: None,
            is_public: true,
            points: 0,
            is_admin: false,
            is_super_admin: false,
            followers_count: 0,
            following_count: 0,
            upload_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(user_db: MockDatabase) -> UserService {
        UserService::new(UserRepository::new(Arc::new(user_db.into_connection())))
    }

    #[tokio::test]
    async fn test_authenticate_by_token_found() {
        let user = create_test_user("user1", "alice");
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]);

        let service = service(db);
        let result = service.authenticate_by_token("token-user1").await.unwrap();

        assert_eq!(result.id, "user1");
    }

    #[tokio::test]
    async fn test_authenticate_by_token_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);

        let service = service(db);
        let result = service.authenticate_by_token("bogus").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_register_username_taken() {
        let existing = create_test_user("user1", "alice");
        let db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]);

        let service = service(db);
        let result = service
            .register(RegisterInput {
                username: "alice".to_string(),
                display_name: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_register_invalid_username() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = service
            .register(RegisterInput {
                username: "bad name!".to_string(),
                display_name: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
