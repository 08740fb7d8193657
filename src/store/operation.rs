//! Operation store

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::{NewOperation, Operation};
use crate::error::{AppError, AppResult};

use super::Page;

/// Listing filter for operation types.
#[derive(Debug, Clone, Default)]
pub struct OperationFilter {
    pub page: Page,
    /// Case-insensitive substring match on the description.
    pub description: Option<String>,
    pub debit: Option<bool>,
}

/// Owns Operation records.
#[async_trait]
pub trait OperationStore: Send + Sync {
    async fn create(&self, operation: NewOperation) -> AppResult<Operation>;

    async fn find_by_id(&self, id: i64) -> AppResult<Operation>;

    async fn find_all(&self, filter: OperationFilter) -> AppResult<Vec<Operation>>;
}

pub struct PgOperationStore {
    pool: PgPool,
}

impl PgOperationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OperationStore for PgOperationStore {
    async fn create(&self, operation: NewOperation) -> AppResult<Operation> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO operation (description, debit)
            VALUES ($1, $2)
            RETURNING id, description, debit
            "#,
        )
        .bind(&operation.description)
        .bind(operation.debit)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Operation> {
        let operation: Option<Operation> = sqlx::query_as(
            r#"
            SELECT id, description, debit
            FROM operation
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        operation.ok_or(AppError::OperationNotFound(id))
    }

    async fn find_all(&self, filter: OperationFilter) -> AppResult<Vec<Operation>> {
        let (limit, offset) = filter.page.limit_offset();

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id, description, debit FROM operation WHERE true");

        if let Some(debit) = filter.debit {
            query.push(" AND debit = ").push_bind(debit);
        }

        if let Some(description) = &filter.description {
            query
                .push(" AND description ILIKE ")
                .push_bind(format!("%{description}%"));
        }

        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let operations = query.build_query_as().fetch_all(&self.pool).await?;

        Ok(operations)
    }
}
