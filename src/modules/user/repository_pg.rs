use crate::{
    api::error,
    modules::user::{model::UpdatePreferences, repository::UserRepository, schema::UserEntity},
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_preferences(
        &self,
        id: &str,
        preferences: &UpdatePreferences,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
        UPDATE users
        SET
            allow_friend_requests = COALESCE($2, allow_friend_requests),
            profile_visibility    = COALESCE($3, profile_visibility),
            updated_at            = NOW()
        WHERE id = $1
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(preferences.allow_friend_requests)
        .bind(preferences.profile_visibility)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
