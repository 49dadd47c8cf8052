use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use wayfare_core::repository::UserRepository;
use wayfare_core::{CoreError, CoreResult, NewUser, Role, User, UserPatch};

use crate::storage_error;

const USER_COLUMNS: &str = "id, user_name, email, password_hash, role, reset_password_token, \
    reset_password_expiry, created_at, updated_at";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    user_name: String,
    email: String,
    password_hash: String,
    role: String,
    reset_password_token: Option<String>,
    reset_password_expiry: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = CoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            user_name: row.user_name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(CoreError::StorageError)?,
            reset_password_token: row.reset_password_token,
            reset_password_expiry: row.reset_password_expiry,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, input: NewUser) -> CoreResult<User> {
        let user = User::new(input);

        sqlx::query(
            r#"
            INSERT INTO users (id, user_name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error("User"))?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("User"))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("User"))?;

        row.map(User::try_from).transpose()
    }

    async fn list_users(&self, limit: Option<u32>) -> CoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC LIMIT $1",
            USER_COLUMNS
        ))
        // NULL means no limit
        .bind(limit.map(i64::from))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("User"))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn count_users(&self) -> CoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("User"))?;

        Ok(count.max(0) as u64)
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                user_name = COALESCE($2, user_name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(patch.user_name)
        .bind(patch.email)
        .bind(patch.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("User"))?;

        row.map(User::try_from).transpose()
    }

    async fn update_role(&self, id: Uuid, role: Role) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("User"))?;

        row.map(User::try_from).transpose()
    }

    async fn delete_user(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error("User"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET reset_password_token = $2, reset_password_expiry = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error("User"))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound { entity: "User", id: id.to_string() });
        }
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                password_hash = $3,
                reset_password_token = NULL,
                reset_password_expiry = NULL,
                updated_at = NOW()
            WHERE reset_password_token = $1 AND reset_password_expiry > $2
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(token)
        .bind(now)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("User"))?;

        row.map(User::try_from).transpose()
    }
}
