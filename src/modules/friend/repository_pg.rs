use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        model::{FriendRequestResponse, FriendResponse, FriendUserRow, IdOrInfo, NewFriendRequest},
        repository::{FriendRepo, FriendRepository, FriendRequestRepository},
        schema::{canonical_pair, FriendRequestEntity, FriendshipEntity, FRIENDSHIP_PAIR_KEY},
    },
};

#[derive(Clone)]
pub struct FriendRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

/// Serializes every writer touching the same unordered pair until the
/// surrounding transaction ends.
async fn lock_pair(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id_a: &str,
    user_id_b: &str,
) -> Result<(), error::SystemError> {
    let (user_a, user_b) = canonical_pair(user_id_a, user_id_b);

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(format!("{user_a}:{user_b}"))
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[async_trait::async_trait]
impl FriendRepository for FriendRepositoryPg {
    async fn find_friendship(
        &self,
        user_id_a: &str,
        user_id_b: &str,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let (user_a, user_b) = canonical_pair(user_id_a, user_id_b);

        let friendship = sqlx::query_as::<_, FriendshipEntity>(
            r#"
            SELECT *
            FROM friendships
            WHERE LEAST(user_a, user_b) = $1
              AND GREATEST(user_a, user_b) = $2
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(friendship)
    }

    async fn find_friends(&self, user_id: &str) -> Result<Vec<FriendResponse>, error::SystemError> {
        let friends = sqlx::query_as::<_, FriendResponse>(
            r#"
        SELECT
            f.id AS friendship_id,
            u.id,
            u.username,
            u.display_name,
            u.avatar_url,
            f.created_at AS since
        FROM friendships f
        JOIN users u
            ON u.id = CASE
                WHEN f.user_a = $1 THEN f.user_b
                ELSE f.user_a
            END
        WHERE f.user_a = $1
           OR f.user_b = $1
        ORDER BY f.created_at DESC, f.id DESC
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    async fn delete_friendship(
        &self,
        friendship_id: &Uuid,
        user_id: &str,
    ) -> Result<bool, error::SystemError> {
        let rows = sqlx::query(
            "DELETE FROM friendships WHERE id = $1 AND (user_a = $2 OR user_b = $2)",
        )
        .bind(friendship_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRepositoryPg {
    async fn find_pending_request(
        &self,
        user_id_a: &str,
        user_id_b: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let (user_a, user_b) = canonical_pair(user_id_a, user_id_b);

        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE LEAST(from_user_id, to_user_id) = $1
              AND GREATEST(from_user_id, to_user_id) = $2
              AND status = 'pending'
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_friend_request_from_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let rows = sqlx::query_as::<_, FriendUserRow>(
            r#"
            SELECT
                fr.id AS req_id,
                u.id AS user_id,
                u.username,
                u.display_name,
                u.avatar_url,
                fr.message,
                fr.created_at
            FROM friend_requests fr
            JOIN users u
                ON fr.to_user_id = u.id
            WHERE fr.from_user_id = $1
              AND fr.status = 'pending'
            ORDER BY fr.created_at DESC, fr.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| FriendRequestResponse {
                id: r.req_id,
                from: IdOrInfo::Id(user_id.to_string()),
                to: IdOrInfo::Info(r.counterpart()),
                message: r.message,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn find_friend_request_to_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let rows = sqlx::query_as::<_, FriendUserRow>(
            r#"
            SELECT
                fr.id AS req_id,
                u.id AS user_id,
                u.username,
                u.display_name,
                u.avatar_url,
                fr.message,
                fr.created_at
            FROM friend_requests fr
            JOIN users u
                ON fr.from_user_id = u.id
            WHERE fr.to_user_id = $1
              AND fr.status = 'pending'
            ORDER BY fr.created_at DESC, fr.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| FriendRequestResponse {
                id: r.req_id,
                from: IdOrInfo::Info(r.counterpart()),
                to: IdOrInfo::Id(user_id.to_string()),
                message: r.message,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn create_friend_request(
        &self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        lock_pair(&mut tx, &request.from_user_id, &request.to_user_id).await?;

        let (user_a, user_b) = canonical_pair(&request.from_user_id, &request.to_user_id);
        let already_friends = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM friendships
                WHERE LEAST(user_a, user_b) = $1
                  AND GREATEST(user_a, user_b) = $2
            )
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(&mut *tx)
        .await?;

        if already_friends {
            return Err(error::SystemError::conflict_on(FRIENDSHIP_PAIR_KEY));
        }

        // friend_requests_pending_pair_key rejects a second pending row for the pair
        let created = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (id, from_user_id, to_user_id, message)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(&request.from_user_id)
        .bind(&request.to_user_id)
        .bind(&request.message)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn decline_friend_request(
        &self,
        request_id: &Uuid,
        recipient_id: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            UPDATE friend_requests
            SET status = 'declined', updated_at = NOW()
            WHERE id = $1
              AND to_user_id = $2
              AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn cancel_friend_request(
        &self,
        request_id: &Uuid,
        sender_id: &str,
    ) -> Result<bool, error::SystemError> {
        let rows = sqlx::query(
            r#"
            DELETE FROM friend_requests
            WHERE id = $1
              AND from_user_id = $2
              AND status = 'pending'
            "#,
        )
        .bind(request_id)
        .bind(sender_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }
}

#[async_trait::async_trait]
impl FriendRepo for FriendRepositoryPg {
    async fn accept_friend_request_atomic(
        &self,
        request_id: &Uuid,
        recipient_id: &str,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let pair = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT from_user_id, to_user_id
            FROM friend_requests
            WHERE id = $1 AND to_user_id = $2 AND status = 'pending'
            "#,
        )
        .bind(request_id)
        .bind(recipient_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((from_user_id, to_user_id)) = pair else {
            return Ok(None);
        };

        // Pair lock first, row lock second: the same order create_friend_request uses.
        lock_pair(&mut tx, &from_user_id, &to_user_id).await?;

        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE id = $1 AND to_user_id = $2 AND status = 'pending'
            FOR UPDATE
            "#,
        )
        .bind(request_id)
        .bind(recipient_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(request) = request else {
            tx.rollback().await?;
            return Ok(None);
        };

        let friendship = sqlx::query_as::<_, FriendshipEntity>(
            r#"
            INSERT INTO friendships (id, user_a, user_b)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&request.from_user_id)
        .bind(&request.to_user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE friend_requests SET status = 'accepted', updated_at = NOW() WHERE id = $1",
        )
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(friendship))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sqlx::PgPool;

    use super::*;
    use crate::modules::{
        friend::{
            error::RelationshipError,
            model::{RelationshipStatus, RespondAction},
            schema::{FriendRequestStatus, PENDING_REQUEST_PAIR_KEY},
            service::FriendService,
        },
        user::repository_pg::UserRepositoryPg,
    };

    async fn seed_users(pool: &PgPool, ids: &[&str]) {
        for id in ids {
            sqlx::query("INSERT INTO users (id, username, display_name) VALUES ($1, $1, $1)")
                .bind(id)
                .execute(pool)
                .await
                .unwrap();
        }
    }

    fn service(pool: &PgPool) -> FriendService {
        FriendService::with_dependencies(
            Arc::new(FriendRepositoryPg::new(pool.clone())),
            Arc::new(UserRepositoryPg::new(pool.clone())),
        )
    }

    fn new_request(from: &str, to: &str) -> NewFriendRequest {
        NewFriendRequest {
            id: Uuid::now_v7(),
            from_user_id: from.to_string(),
            to_user_id: to.to_string(),
            message: None,
        }
    }

    async fn count(pool: &PgPool, sql: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await.unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_user_id_columns_compare_bytewise(pool: PgPool) {
        let collations = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT collation_name::text
            FROM information_schema.columns
            WHERE (table_name, column_name) IN (
                ('users', 'id'),
                ('friendships', 'user_a'),
                ('friendships', 'user_b'),
                ('friend_requests', 'from_user_id'),
                ('friend_requests', 'to_user_id')
            )
            "#,
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(collations.len(), 5);
        assert!(collations.iter().all(|c| c.as_deref() == Some("C")));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_mixed_case_ids_resolve_from_both_sides(pool: PgPool) {
        const LOWER: &str = "user_2abc";
        const UPPER: &str = "user_2Bxy";
        seed_users(&pool, &[LOWER, UPPER]).await;
        let service = service(&pool);
        let repo = FriendRepositoryPg::new(pool.clone());

        let request = service.send_friend_request(LOWER, UPPER, None).await.unwrap();
        assert!(repo.find_pending_request(UPPER, LOWER).await.unwrap().is_some());
        assert_eq!(
            service.get_relationship_status(LOWER, UPPER).await.unwrap(),
            RelationshipStatus::RequestSent { request_id: request.id }
        );
        assert_eq!(
            service.get_relationship_status(UPPER, LOWER).await.unwrap(),
            RelationshipStatus::RequestReceived { request_id: request.id }
        );

        service
            .respond_to_friend_request(UPPER, request.id, RespondAction::Accept)
            .await
            .unwrap();
        let friendship = repo.find_friendship(LOWER, UPPER).await.unwrap().unwrap();
        assert_eq!(
            service.get_relationship_status(UPPER, LOWER).await.unwrap(),
            RelationshipStatus::Friends { friendship_id: friendship.id }
        );

        let resend = service.send_friend_request(UPPER, LOWER, None).await;
        assert!(matches!(resend, Err(RelationshipError::AlreadyFriends)));

        let err = repo.create_friend_request(&new_request(UPPER, LOWER)).await.unwrap_err();
        assert!(matches!(RelationshipError::from(err), RelationshipError::AlreadyFriends));
        assert_eq!(
            count(&pool, "SELECT COUNT(*) FROM friend_requests WHERE status = 'pending'").await,
            0
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_accepts_create_one_friendship(pool: PgPool) {
        let repo = FriendRepositoryPg::new(pool.clone());

        for i in 0..5 {
            let (from, to) = (format!("user_from{i}"), format!("user_To{i}"));
            seed_users(&pool, &[from.as_str(), to.as_str()]).await;
            let request = repo.create_friend_request(&new_request(&from, &to)).await.unwrap();

            let (first, second) = tokio::join!(
                repo.accept_friend_request_atomic(&request.id, &to),
                repo.accept_friend_request_atomic(&request.id, &to),
            );
            let accepted = [first.unwrap(), second.unwrap()].into_iter().flatten().count();
            assert_eq!(accepted, 1);

            let status = sqlx::query_scalar::<_, FriendRequestStatus>(
                "SELECT status FROM friend_requests WHERE id = $1",
            )
            .bind(request.id)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(status, FriendRequestStatus::Accepted);
        }

        assert_eq!(count(&pool, "SELECT COUNT(*) FROM friendships").await, 5);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_two_way_sends_leave_one_pending(pool: PgPool) {
        let service = service(&pool);

        for i in 0..5 {
            let (a, b) = (format!("user_a{i}"), format!("user_B{i}"));
            seed_users(&pool, &[a.as_str(), b.as_str()]).await;

            let (ab, ba) = tokio::join!(
                service.send_friend_request(&a, &b, None),
                service.send_friend_request(&b, &a, None),
            );
            let results = [ab, ba];
            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(results
                .iter()
                .any(|r| matches!(r, Err(RelationshipError::RequestAlreadyExists))));
        }

        assert_eq!(
            count(&pool, "SELECT COUNT(*) FROM friend_requests WHERE status = 'pending'").await,
            5
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unique_indexes_map_to_business_errors(pool: PgPool) {
        seed_users(&pool, &["user_alice", "user_bob"]).await;
        let repo = FriendRepositoryPg::new(pool.clone());

        repo.create_friend_request(&new_request("user_alice", "user_bob")).await.unwrap();
        let err = repo
            .create_friend_request(&new_request("user_bob", "user_alice"))
            .await
            .unwrap_err();
        assert_eq!(err.conflict_constraint(), Some(PENDING_REQUEST_PAIR_KEY));
        assert!(matches!(RelationshipError::from(err), RelationshipError::RequestAlreadyExists));

        let insert = "INSERT INTO friendships (id, user_a, user_b) VALUES ($1, $2, $3)";
        sqlx::query(insert)
            .bind(Uuid::now_v7())
            .bind("user_alice")
            .bind("user_bob")
            .execute(&pool)
            .await
            .unwrap();
        let db_err = sqlx::query(insert)
            .bind(Uuid::now_v7())
            .bind("user_bob")
            .bind("user_alice")
            .execute(&pool)
            .await
            .unwrap_err();

        let err = error::SystemError::from(db_err);
        assert_eq!(err.conflict_constraint(), Some(FRIENDSHIP_PAIR_KEY));
        assert!(matches!(RelationshipError::from(err), RelationshipError::AlreadyFriends));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_decline_and_cancel_only_touch_pending_rows(pool: PgPool) {
        seed_users(&pool, &["user_alice", "user_bob"]).await;
        let repo = FriendRepositoryPg::new(pool.clone());
        let request =
            repo.create_friend_request(&new_request("user_alice", "user_bob")).await.unwrap();

        assert!(repo.decline_friend_request(&request.id, "user_alice").await.unwrap().is_none());
        let declined = repo.decline_friend_request(&request.id, "user_bob").await.unwrap().unwrap();
        assert_eq!(declined.status, FriendRequestStatus::Declined);

        assert!(!repo.cancel_friend_request(&request.id, "user_alice").await.unwrap());
        assert!(repo.accept_friend_request_atomic(&request.id, "user_bob").await.unwrap().is_none());

        // a declined pair may be requested again
        repo.create_friend_request(&new_request("user_alice", "user_bob")).await.unwrap();
    }
}
