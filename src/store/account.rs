//! Account store

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::{Account, NewAccount};
use crate::error::{AppError, AppResult};

use super::Page;

/// Postgres error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Listing filter for accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub page: Page,
    /// Case-insensitive substring match on the document number.
    pub document: Option<String>,
}

/// Owns Account records.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create(&self, account: NewAccount) -> AppResult<Account>;

    async fn find_by_id(&self, id: i64) -> AppResult<Account>;

    async fn find_all(&self, filter: AccountFilter) -> AppResult<Vec<Account>>;

    /// Persist the account's in-memory limit, fenced on `version`.
    ///
    /// Loses to any concurrent limit write with `LimitConflict`; on success the
    /// in-memory `version` is bumped to match the row.
    async fn update_limit(&self, account: &mut Account) -> AppResult<()>;
}

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO account (document_number, "limit")
            VALUES ($1, $2)
            RETURNING id, document_number, "limit", version
            "#,
        )
        .bind(&account.document)
        .bind(account.limit)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                AppError::DocumentTaken
            }
            _ => AppError::Database(e),
        })?;

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Account> {
        let account: Option<Account> = sqlx::query_as(
            r#"
            SELECT id, document_number, "limit", version
            FROM account
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        account.ok_or(AppError::AccountNotFound(id))
    }

    async fn find_all(&self, filter: AccountFilter) -> AppResult<Vec<Account>> {
        let (limit, offset) = filter.page.limit_offset();

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(r#"SELECT id, document_number, "limit", version FROM account"#);

        if let Some(document) = &filter.document {
            query
                .push(" WHERE document_number ILIKE ")
                .push_bind(format!("%{document}%"));
        }

        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let accounts = query.build_query_as().fetch_all(&self.pool).await?;

        Ok(accounts)
    }

    async fn update_limit(&self, account: &mut Account) -> AppResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE account
            SET "limit" = $1, version = version + 1
            WHERE id = $2 AND version = $3
            "#,
        )
        .bind(account.limit)
        .bind(account.id)
        .bind(account.version)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::LimitConflict);
        }

        account.version += 1;
        Ok(())
    }
}
