use crate::entities::User;
use crate::error::{AppError, AppResult};
use crate::models::{CreateUserRequest, UserResponse};
use crate::utils::{format_phone, validate_phone};
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<UserResponse> {
        if request.nickname.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Nickname must not be empty".to_string(),
            ));
        }

        let phone = match request.phone.as_deref() {
            Some(p) => {
                let formatted = format_phone(p);
                validate_phone(&formatted)?;
                Some(formatted)
            }
            None => None,
        };

        let id = sqlx::query(
            "INSERT INTO users (nickname, phone, status, created_at) VALUES (?, ?, 'active', ?)",
        )
        .bind(&request.nickname)
        .bind(&phone)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        let user = self.get_user(id).await?;
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        Ok(UserResponse::from(user))
    }

    pub async fn get_phone(&self, user_id: i64) -> AppResult<Option<String>> {
        let phone: Option<Option<String>> =
            sqlx::query_scalar("SELECT phone FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(phone.flatten())
    }
}
