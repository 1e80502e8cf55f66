//! Book listing model and related types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppError;

static ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{9}X|\d{10}|\d{13})$").expect("valid isbn pattern"));

/// Physical condition of a listed book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookCondition {
    #[serde(rename = "novo")]
    New,
    #[serde(rename = "usado - bom")]
    UsedGood,
    #[serde(rename = "usado - razoável")]
    UsedFair,
    #[serde(rename = "usado - ruim")]
    UsedPoor,
}

impl BookCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookCondition::New => "novo",
            BookCondition::UsedGood => "usado - bom",
            BookCondition::UsedFair => "usado - razoável",
            BookCondition::UsedPoor => "usado - ruim",
        }
    }
}

impl std::fmt::Display for BookCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "novo" => Ok(BookCondition::New),
            "usado - bom" => Ok(BookCondition::UsedGood),
            "usado - razoável" => Ok(BookCondition::UsedFair),
            "usado - ruim" => Ok(BookCondition::UsedPoor),
            _ => Err(format!("Invalid book condition: {}", s)),
        }
    }
}

// SQLx conversion for BookCondition (stored as text)
impl sqlx::Type<Postgres> for BookCondition {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BookCondition {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookCondition {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub condition: BookCondition,
    pub exchange_available: bool,
    pub loan_available: bool,
    pub available: bool,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book joined with its owner's username, as shown in the public catalog
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub book: Book,
    pub owner_name: String,
}

/// Catalog query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Free text over title and author
    pub search: Option<String>,
    pub author: Option<String>,
    pub available: Option<bool>,
    /// "troca" (exchange available) or "emprestimo" (loan available)
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Create / update book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookPayload {
    #[validate(length(min = 1, max = 255, message = "Title is required (max 255 characters)"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Author is required (max 255 characters)"))]
    pub author: String,
    #[validate(length(max = 100, message = "Publisher name is too long"))]
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    #[validate(length(max = 1000, message = "Description is too long"))]
    pub description: Option<String>,
    pub condition: BookCondition,
    pub exchange_available: bool,
    pub loan_available: bool,
    pub available: Option<bool>,
}

/// Normalize an ISBN to its canonical form (no hyphens or spaces).
/// Returns `None` when it is neither a valid ISBN-10 nor ISBN-13 shape.
pub fn canonical_isbn(raw: &str) -> Option<String> {
    let clean: String = raw
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    ISBN_RE.is_match(&clean).then_some(clean)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl BookPayload {
    /// Trim text fields, canonicalize the ISBN and run field validation
    pub fn normalized(self) -> Result<Self, AppError> {
        let isbn = match trimmed(self.isbn) {
            Some(raw) => Some(
                canonical_isbn(&raw)
                    .ok_or_else(|| AppError::InvalidInput(vec!["Invalid ISBN".to_string()]))?,
            ),
            None => None,
        };

        let payload = BookPayload {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            publisher: trimmed(self.publisher),
            isbn,
            description: trimmed(self.description),
            available: Some(self.available.unwrap_or(true)),
            ..self
        };
        payload.validate()?;
        Ok(payload)
    }
}
