//! Exchange / loan transaction lifecycle service

use std::sync::Arc;

use async_trait::async_trait;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        notification::{NewNotification, NotificationKind},
        transaction::{
            CreateTransactionRequest, NewTransaction, Transaction, TransactionCheck,
            TransactionDecision, TransactionDetails, TransactionStatus, TransactionType,
        },
    },
};

/// Storage operations the lifecycle needs.
///
/// State-changing methods are conditional on `status = 'pendente'` and on the
/// acting party, and report `None`/`false` when no row matched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn book_owner(&self, book_id: i32) -> AppResult<Option<i32>>;

    async fn has_pending_request(&self, book_id: i32, requester_id: i32) -> AppResult<bool>;

    async fn insert(&self, transaction: &NewTransaction) -> AppResult<Transaction>;

    async fn check(&self, transaction_id: i32) -> AppResult<Option<TransactionCheck>>;

    async fn details(&self, transaction_id: i32) -> AppResult<Option<TransactionDetails>>;

    async fn list_for_user(
        &self,
        user_id: i32,
        status: Option<TransactionStatus>,
    ) -> AppResult<Vec<TransactionDetails>>;

    async fn update_pending_status(
        &self,
        transaction_id: i32,
        owner_id: i32,
        status: TransactionStatus,
    ) -> AppResult<Option<Transaction>>;

    async fn delete_pending(&self, transaction_id: i32, requester_id: i32) -> AppResult<bool>;

    async fn notify(&self, notification: NewNotification) -> AppResult<()>;
}

fn not_found() -> AppError {
    AppError::NotFound("Transaction not found".to_string())
}

#[derive(Clone)]
pub struct TransactionsService {
    store: Arc<dyn TransactionStore>,
}

impl TransactionsService {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Open a new exchange or loan request for someone else's book
    pub async fn create(
        &self,
        requester_id: i32,
        request: CreateTransactionRequest,
    ) -> AppResult<Transaction> {
        request.validate()?;

        let owner_id = self
            .store
            .book_owner(request.book_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        if owner_id == requester_id {
            return Err(AppError::BadRequest(
                "You cannot request your own book".to_string(),
            ));
        }

        if self
            .store
            .has_pending_request(request.book_id, requester_id)
            .await?
        {
            return Err(AppError::Conflict(
                "You already have a pending request for this book".to_string(),
            ));
        }

        // Offered books only make sense for an exchange
        let offered_book_id = match request.transaction_type {
            TransactionType::Troca => request.offered_book_id,
            TransactionType::Emprestimo => None,
        };

        if let Some(offered_id) = offered_book_id {
            match self.store.book_owner(offered_id).await? {
                None => return Err(AppError::NotFound("Offered book not found".to_string())),
                Some(offered_owner) if offered_owner != requester_id => {
                    return Err(AppError::Authorization(
                        "The offered book must belong to you".to_string(),
                    ))
                }
                Some(_) => {}
            }
        }

        let new_transaction = NewTransaction {
            book_id: request.book_id,
            requester_id,
            owner_id,
            offered_book_id,
            transaction_type: request.transaction_type,
            request_message: request
                .request_message
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
        };

        let transaction = self.store.insert(&new_transaction).await?;
        tracing::info!(
            transaction_id = transaction.transaction_id,
            book_id = transaction.book_id,
            requester_id,
            kind = %transaction.transaction_type,
            "Transaction requested"
        );

        let title = match transaction.transaction_type {
            TransactionType::Troca => "New exchange request",
            TransactionType::Emprestimo => "New loan request",
        };
        self.notify(NewNotification::new(
            owner_id,
            NotificationKind::TransactionRequested,
            title,
            "Someone wants one of your books",
            Some(transaction.transaction_id),
        ))
        .await;

        Ok(transaction)
    }

    /// Owner accepts or rejects a pending request
    pub async fn decide(
        &self,
        transaction_id: i32,
        user_id: i32,
        decision: TransactionDecision,
    ) -> AppResult<Transaction> {
        let check = self.store.check(transaction_id).await?.ok_or_else(not_found)?;

        if !check.can_decide(user_id, decision) {
            return Err(AppError::Authorization(
                "Only the book owner can respond, and only while the request is pending"
                    .to_string(),
            ));
        }

        let target = decision.target_status();
        let transaction = self
            .store
            .update_pending_status(transaction_id, user_id, target)
            .await?
            .ok_or_else(not_found)?;

        tracing::info!(transaction_id, status = %target, "Transaction decided");

        let (kind, title) = match decision {
            TransactionDecision::Accept => {
                (NotificationKind::TransactionAccepted, "Request accepted")
            }
            TransactionDecision::Reject => {
                (NotificationKind::TransactionRejected, "Request rejected")
            }
        };
        self.notify(NewNotification::new(
            check.requester_id,
            kind,
            title,
            format!("Your request is now {}", target),
            Some(transaction_id),
        ))
        .await;

        Ok(transaction)
    }

    pub async fn accept(&self, transaction_id: i32, user_id: i32) -> AppResult<Transaction> {
        self.decide(transaction_id, user_id, TransactionDecision::Accept)
            .await
    }

    pub async fn reject(&self, transaction_id: i32, user_id: i32) -> AppResult<Transaction> {
        self.decide(transaction_id, user_id, TransactionDecision::Reject)
            .await
    }

    /// Requester withdraws a pending request; the row is removed
    pub async fn cancel(&self, transaction_id: i32, user_id: i32) -> AppResult<()> {
        let check = self.store.check(transaction_id).await?.ok_or_else(not_found)?;

        if !check.can_cancel(user_id) {
            return Err(AppError::Authorization(
                "Only the requester can cancel, and only while the request is pending"
                    .to_string(),
            ));
        }

        if !self.store.delete_pending(transaction_id, user_id).await? {
            return Err(not_found());
        }

        tracing::info!(transaction_id, "Transaction cancelled");
        self.notify(NewNotification::new(
            check.owner_id,
            NotificationKind::TransactionCancelled,
            "Request cancelled",
            "A request for one of your books was withdrawn",
            None,
        ))
        .await;

        Ok(())
    }

    /// Transactions the user takes part in, newest first
    pub async fn list(
        &self,
        user_id: i32,
        status: Option<TransactionStatus>,
    ) -> AppResult<Vec<TransactionDetails>> {
        self.store.list_for_user(user_id, status).await
    }

    /// Transaction details, visible to its two participants only
    pub async fn get(&self, transaction_id: i32, user_id: i32) -> AppResult<TransactionDetails> {
        let details = self
            .store
            .details(transaction_id)
            .await?
            .ok_or_else(not_found)?;

        if !details.transaction.is_participant(user_id) {
            return Err(AppError::Authorization(
                "You do not have access to this transaction".to_string(),
            ));
        }

        Ok(details)
    }

    /// Notifications never fail the operation that produced them
    async fn notify(&self, notification: NewNotification) {
        let user_id = notification.user_id;
        if let Err(e) = self.store.notify(notification).await {
            tracing::warn!(user_id, "Failed to create notification: {}", e);
        }
    }
}
