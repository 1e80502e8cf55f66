//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookPayload, BookQuery, BookWithOwner},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with filters
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<Vec<BookWithOwner>> {
        self.repository.books.search(query).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<BookWithOwner> {
        self.repository
            .books
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Books listed by the current user
    pub async fn my_books(&self, owner_id: i32) -> AppResult<Vec<Book>> {
        self.repository.books.list_by_owner(owner_id).await
    }

    pub async fn create_book(&self, owner_id: i32, payload: BookPayload) -> AppResult<Book> {
        let payload = payload.normalized()?;
        let book = self.repository.books.create(owner_id, &payload).await?;
        tracing::info!(book_id = book.book_id, owner_id, "Book listed");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, user_id: i32, payload: BookPayload) -> AppResult<Book> {
        let payload = payload.normalized()?;
        self.ensure_owner(id, user_id).await?;

        self.repository
            .books
            .update(id, user_id, &payload)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    pub async fn delete_book(&self, id: i32, user_id: i32) -> AppResult<()> {
        self.ensure_owner(id, user_id).await?;

        if !self.repository.books.delete(id, user_id).await? {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        tracing::info!(book_id = id, owner_id = user_id, "Book removed");
        Ok(())
    }

    async fn ensure_owner(&self, id: i32, user_id: i32) -> AppResult<()> {
        match self.repository.books.owner_of(id).await? {
            None => Err(AppError::NotFound("Book not found".to_string())),
            Some(owner_id) if owner_id != user_id => Err(AppError::Authorization(
                "You can only modify your own books".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::book::BookCondition, repository::lazy_repository};

    fn payload(title: &str, isbn: Option<&str>) -> BookPayload {
        BookPayload {
            title: title.into(),
            author: "Clarice Lispector".into(),
            publisher: None,
            isbn: isbn.map(Into::into),
            description: None,
            condition: BookCondition::New,
            exchange_available: true,
            loan_available: true,
            available: None,
        }
    }

    #[tokio::test]
    async fn test_blank_title_rejected_before_database() {
        let service = CatalogService::new(lazy_repository());
        let err = service.create_book(1, payload("   ", None)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_bad_isbn_rejected_before_ownership_check() {
        let service = CatalogService::new(lazy_repository());
        let err = service
            .update_book(1, 1, payload("A hora da estrela", Some("12-34")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
