//! 사용자 저장소.

use chrono::{DateTime, Utc};
use kripta_core::{ExchangeError, ExchangeResult, Role, User};
use sqlx::{FromRow, PgExecutor};

/// users 테이블 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_signed_in: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = ExchangeError;

    fn try_from(r: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: r.id,
            open_id: r.open_id,
            name: r.name,
            email: r.email,
            login_method: r.login_method,
            role: r.role.parse::<Role>()?,
            created_at: r.created_at,
            updated_at: r.updated_at,
            last_signed_in: r.last_signed_in,
        })
    }
}

/// 로그인 시 upsert 입력.
#[derive(Debug, Clone)]
pub struct UserUpsert {
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
    /// 소유자 계정이면 관리자로 승격
    pub promote_to_admin: bool,
}

/// 사용자 저장소.
pub struct UserRepository;

impl UserRepository {
    /// open id로 사용자를 생성하거나 갱신합니다.
    ///
    /// 이름/이메일/로그인 방식은 값이 있을 때만 덮어쓰고,
    /// `last_signed_in`은 항상 현재 시각으로 갱신합니다.
    pub async fn upsert<'e>(
        executor: impl PgExecutor<'e>,
        input: &UserUpsert,
    ) -> ExchangeResult<User> {
        let initial_role = if input.promote_to_admin {
            Role::Admin
        } else {
            Role::User
        };

        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (open_id, name, email, login_method, role, last_signed_in)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (open_id) DO UPDATE SET
                name = COALESCE(EXCLUDED.name, users.name),
                email = COALESCE(EXCLUDED.email, users.email),
                login_method = COALESCE(EXCLUDED.login_method, users.login_method),
                role = CASE WHEN $6 THEN 'admin' ELSE users.role END,
                last_signed_in = NOW(),
                updated_at = NOW()
            RETURNING id, open_id, name, email, login_method, role,
                      created_at, updated_at, last_signed_in
            "#,
        )
        .bind(&input.open_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.login_method)
        .bind(initial_role.as_str())
        .bind(input.promote_to_admin)
        .fetch_one(executor)
        .await?;

        User::try_from(record)
    }

    /// id로 사용자 조회.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        user_id: i64,
    ) -> ExchangeResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, open_id, name, email, login_method, role,
                   created_at, updated_at, last_signed_in
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        record.map(User::try_from).transpose()
    }

    /// 지갑을 하나 이상 보유한 사용자 id 목록.
    pub async fn list_ids_with_wallets<'e>(executor: impl PgExecutor<'e>) -> ExchangeResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT DISTINCT user_id
            FROM wallets
            ORDER BY user_id
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }
}
