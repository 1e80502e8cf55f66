//! Exchange / loan transaction model and lifecycle rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Kind of request: exchange ("troca") or loan ("emprestimo")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Troca,
    Emprestimo,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Troca => "troca",
            TransactionType::Emprestimo => "emprestimo",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "troca" => Ok(TransactionType::Troca),
            "emprestimo" => Ok(TransactionType::Emprestimo),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

/// Transaction status.
///
/// `Pendente` is the only state reachable from creation and the only one
/// with outgoing transitions (to `Aceito` or `Recusado`). `Concluido` is set
/// by a fulfillment step outside this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pendente,
    Aceito,
    Recusado,
    Concluido,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pendente => "pendente",
            TransactionStatus::Aceito => "aceito",
            TransactionStatus::Recusado => "recusado",
            TransactionStatus::Concluido => "concluido",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TransactionStatus::Pendente)
    }

    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (TransactionStatus::Pendente, TransactionStatus::Aceito)
                | (TransactionStatus::Pendente, TransactionStatus::Recusado)
        )
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendente" => Ok(TransactionStatus::Pendente),
            "aceito" => Ok(TransactionStatus::Aceito),
            "recusado" => Ok(TransactionStatus::Recusado),
            "concluido" => Ok(TransactionStatus::Concluido),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

// SQLx conversions (both enums are stored as text)
impl sqlx::Type<Postgres> for TransactionType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for TransactionType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for TransactionType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

impl sqlx::Type<Postgres> for TransactionStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for TransactionStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for TransactionStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Owner decision on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionDecision {
    Accept,
    Reject,
}

impl TransactionDecision {
    pub fn target_status(&self) -> TransactionStatus {
        match self {
            TransactionDecision::Accept => TransactionStatus::Aceito,
            TransactionDecision::Reject => TransactionStatus::Recusado,
        }
    }
}

/// Transaction model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transaction {
    pub transaction_id: i32,
    pub book_id: i32,
    pub requester_id: i32,
    pub owner_id: i32,
    pub offered_book_id: Option<i32>,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub request_message: Option<String>,
    pub request_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_participant(&self, user_id: i32) -> bool {
        self.requester_id == user_id || self.owner_id == user_id
    }
}

/// Transaction with book and participant details for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TransactionDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub transaction: Transaction,
    pub book_title: String,
    pub book_author: String,
    pub requester_name: String,
    pub requester_email: String,
    pub owner_name: String,
    pub owner_email: String,
    pub offered_book_title: Option<String>,
    pub offered_book_author: Option<String>,
}

/// Minimal row used to authorize a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct TransactionCheck {
    pub transaction_id: i32,
    pub requester_id: i32,
    pub owner_id: i32,
    pub status: TransactionStatus,
}

impl TransactionCheck {
    /// Only the owner may accept or reject, and only while the lifecycle allows it
    pub fn can_decide(&self, user_id: i32, decision: TransactionDecision) -> bool {
        self.owner_id == user_id && self.status.can_transition_to(decision.target_status())
    }

    /// Only the requester may cancel, and only before the owner acts
    pub fn can_cancel(&self, user_id: i32) -> bool {
        self.requester_id == user_id && self.status.is_pending()
    }
}

/// Create transaction request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionRequest {
    #[validate(range(min = 1, message = "book_id must be a positive integer"))]
    pub book_id: i32,
    pub transaction_type: TransactionType,
    #[validate(range(min = 1, message = "offered_book_id must be a positive integer"))]
    pub offered_book_id: Option<i32>,
    #[validate(length(max = 500, message = "Request message is too long (max 500 characters)"))]
    pub request_message: Option<String>,
}

/// Row to insert for a new request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub book_id: i32,
    pub requester_id: i32,
    pub owner_id: i32,
    pub offered_book_id: Option<i32>,
    pub transaction_type: TransactionType,
    pub request_message: Option<String>,
}

/// Transaction list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct TransactionQuery {
    /// pendente, aceito, recusado or concluido; other values are ignored
    pub status: Option<String>,
}

impl TransactionQuery {
    pub fn status_filter(&self) -> Option<TransactionStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}
