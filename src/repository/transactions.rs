//! Transactions repository for database operations
//!
//! Every mutation carries its authorization in the `WHERE` clause
//! (owner or requester, and `status = 'pendente'`), so a concurrent
//! decision or cancellation matches zero rows instead of overwriting.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::AppResult,
    models::{
        notification::NewNotification,
        transaction::{
            NewTransaction, Transaction, TransactionCheck, TransactionDetails, TransactionStatus,
        },
    },
    services::transactions::TransactionStore,
};

use super::Repository;

const TRANSACTION_DETAILS: &str = r#"
    SELECT
        t.*,
        b.title AS book_title,
        b.author AS book_author,
        u_req.username AS requester_name,
        u_req.email AS requester_email,
        u_owner.username AS owner_name,
        u_owner.email AS owner_email,
        ob.title AS offered_book_title,
        ob.author AS offered_book_author
    FROM transactions t
    JOIN books b ON t.book_id = b.book_id
    JOIN users u_req ON t.requester_id = u_req.user_id
    JOIN users u_owner ON t.owner_id = u_owner.user_id
    LEFT JOIN books ob ON t.offered_book_id = ob.book_id
"#;

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Postgres>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new pending request
    pub async fn create(&self, transaction: &NewTransaction) -> AppResult<Transaction> {
        let created = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                book_id, requester_id, owner_id, offered_book_id,
                transaction_type, request_message
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(transaction.book_id)
        .bind(transaction.requester_id)
        .bind(transaction.owner_id)
        .bind(transaction.offered_book_id)
        .bind(transaction.transaction_type)
        .bind(&transaction.request_message)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Transactions where the user is requester or owner, newest first
    pub async fn list_for_user(
        &self,
        user_id: i32,
        status: Option<TransactionStatus>,
    ) -> AppResult<Vec<TransactionDetails>> {
        let mut builder = QueryBuilder::<Postgres>::new(TRANSACTION_DETAILS);
        builder
            .push(" WHERE (t.requester_id = ")
            .push_bind(user_id)
            .push(" OR t.owner_id = ")
            .push_bind(user_id)
            .push(")");

        if let Some(status) = status {
            builder.push(" AND t.status = ").push_bind(status);
        }

        builder.push(" ORDER BY t.request_date DESC");

        let transactions = builder
            .build_query_as::<TransactionDetails>()
            .fetch_all(&self.pool)
            .await?;

        Ok(transactions)
    }

    /// Full transaction details by ID
    pub async fn get_details(&self, id: i32) -> AppResult<Option<TransactionDetails>> {
        let query = format!("{} WHERE t.transaction_id = $1", TRANSACTION_DETAILS);
        let details = sqlx::query_as::<_, TransactionDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(details)
    }

    /// Participants and status of a transaction
    pub async fn check(&self, id: i32) -> AppResult<Option<TransactionCheck>> {
        let check = sqlx::query_as::<_, TransactionCheck>(
            "SELECT transaction_id, requester_id, owner_id, status FROM transactions WHERE transaction_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(check)
    }

    /// Whether the requester already has a pending request for the book
    pub async fn has_pending_request(&self, book_id: i32, requester_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM transactions
                WHERE book_id = $1 AND requester_id = $2 AND status = 'pendente'
            )
            "#,
        )
        .bind(book_id)
        .bind(requester_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Move a pending transaction to `status`, scoped to its owner
    pub async fn update_pending_status(
        &self,
        id: i32,
        owner_id: i32,
        status: TransactionStatus,
    ) -> AppResult<Option<Transaction>> {
        let updated = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $1, updated_at = NOW()
            WHERE transaction_id = $2 AND owner_id = $3 AND status = 'pendente'
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a pending transaction, scoped to its requester
    pub async fn delete_pending(&self, id: i32, requester_id: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM transactions WHERE transaction_id = $1 AND requester_id = $2 AND status = 'pendente'",
        )
        .bind(id)
        .bind(requester_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TransactionStore for Repository {
    async fn book_owner(&self, book_id: i32) -> AppResult<Option<i32>> {
        self.books.owner_of(book_id).await
    }

    async fn has_pending_request(&self, book_id: i32, requester_id: i32) -> AppResult<bool> {
        self.transactions.has_pending_request(book_id, requester_id).await
    }

    async fn insert(&self, transaction: &NewTransaction) -> AppResult<Transaction> {
        self.transactions.create(transaction).await
    }

    async fn check(&self, transaction_id: i32) -> AppResult<Option<TransactionCheck>> {
        self.transactions.check(transaction_id).await
    }

    async fn details(&self, transaction_id: i32) -> AppResult<Option<TransactionDetails>> {
        self.transactions.get_details(transaction_id).await
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        status: Option<TransactionStatus>,
    ) -> AppResult<Vec<TransactionDetails>> {
        self.transactions.list_for_user(user_id, status).await
    }

    async fn update_pending_status(
        &self,
        transaction_id: i32,
        owner_id: i32,
        status: TransactionStatus,
    ) -> AppResult<Option<Transaction>> {
        self.transactions
            .update_pending_status(transaction_id, owner_id, status)
            .await
    }

    async fn delete_pending(&self, transaction_id: i32, requester_id: i32) -> AppResult<bool> {
        self.transactions.delete_pending(transaction_id, requester_id).await
    }

    async fn notify(&self, notification: NewNotification) -> AppResult<()> {
        self.notifications.create(&notification).await.map(|_| ())
    }
}
