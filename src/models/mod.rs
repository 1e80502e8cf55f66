//! Data models for Bookswap

pub mod book;
pub mod message;
pub mod notification;
pub mod rating;
pub mod transaction;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookCondition, BookWithOwner};
pub use message::Message;
pub use notification::Notification;
pub use rating::Rating;
pub use transaction::{Transaction, TransactionDetails, TransactionStatus, TransactionType};
pub use user::{User, UserClaims};
