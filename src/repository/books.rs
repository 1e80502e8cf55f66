//! Books repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookPayload, BookQuery, BookWithOwner},
        transaction::TransactionType,
    },
};

const BOOK_WITH_OWNER: &str = r#"
    SELECT b.*, u.username AS owner_name
    FROM books b
    JOIN users u ON b.owner_id = u.user_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search the public catalog
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<BookWithOwner>> {
        let mut builder = QueryBuilder::<Postgres>::new(BOOK_WITH_OWNER);
        builder.push(" WHERE 1=1");

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            builder
                .push(" AND (b.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR b.author ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(author) = query.author.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            builder
                .push(" AND b.author ILIKE ")
                .push_bind(format!("%{}%", author));
        }

        if let Some(available) = query.available {
            builder.push(" AND b.available = ").push_bind(available);
        }

        match query.kind.as_deref().and_then(|k| k.parse::<TransactionType>().ok()) {
            Some(TransactionType::Troca) => {
                builder.push(" AND b.exchange_available = TRUE");
            }
            Some(TransactionType::Emprestimo) => {
                builder.push(" AND b.loan_available = TRUE");
            }
            None => {}
        }

        builder.push(" ORDER BY b.created_at DESC");

        let books = builder
            .build_query_as::<BookWithOwner>()
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Get book by ID with its owner's username
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<BookWithOwner>> {
        let query = format!("{} WHERE b.book_id = $1", BOOK_WITH_OWNER);
        let book = sqlx::query_as::<_, BookWithOwner>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    /// Current owner of a book, if the book exists
    pub async fn owner_of(&self, id: i32) -> AppResult<Option<i32>> {
        let owner: Option<i32> = sqlx::query_scalar("SELECT owner_id FROM books WHERE book_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner)
    }

    /// Books listed by one user
    pub async fn list_by_owner(&self, owner_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Create a new book listing
    pub async fn create(&self, owner_id: i32, book: &BookPayload) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                title, author, publisher, isbn, description, condition,
                exchange_available, loan_available, available, owner_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.condition)
        .bind(book.exchange_available)
        .bind(book.loan_available)
        .bind(book.available.unwrap_or(true))
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book; only matches when `owner_id` still owns it
    pub async fn update(&self, id: i32, owner_id: i32, book: &BookPayload) -> AppResult<Option<Book>> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = $1, author = $2, publisher = $3, isbn = $4,
                description = $5, condition = $6, exchange_available = $7,
                loan_available = $8, available = $9, updated_at = NOW()
            WHERE book_id = $10 AND owner_id = $11
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.condition)
        .bind(book.exchange_available)
        .bind(book.loan_available)
        .bind(book.available.unwrap_or(true))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a book; only matches when `owner_id` still owns it
    pub async fn delete(&self, id: i32, owner_id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
