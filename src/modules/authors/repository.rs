//! Author persistence and the book side of the author/book join.

use async_trait::async_trait;
use catalog_db::{SqlitePool, StoreResult};

use super::models::Author;
use crate::modules::books::models::Book;

const AUTHOR_COLUMNS: &str = "a.id, a.first_name, a.last_name, a.country_id";

#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// All authors ordered by last name.
    async fn list(&self) -> StoreResult<Vec<Author>>;
    async fn get(&self, id: i64) -> StoreResult<Option<Author>>;
    async fn exists(&self, id: i64) -> StoreResult<bool>;
    async fn create(&self, author: &Author) -> StoreResult<Author>;
    async fn update(&self, author: &Author) -> StoreResult<()>;
    /// Callers must first make sure no book is linked to the author.
    async fn delete(&self, author: &Author) -> StoreResult<()>;
    async fn authors_of_book(&self, book_id: i64) -> StoreResult<Vec<Author>>;
    async fn books_of_author(&self, author_id: i64) -> StoreResult<Vec<Book>>;
}

pub struct SqliteAuthorRepository {
    pool: SqlitePool,
}

impl SqliteAuthorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorRepository for SqliteAuthorRepository {
    async fn list(&self) -> StoreResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors a ORDER BY a.last_name, a.first_name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors a WHERE a.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create(&self, author: &Author) -> StoreResult<Author> {
        let id = sqlx::query(
            "INSERT INTO authors (first_name, last_name, country_id) VALUES (?, ?, ?)",
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(author.country_id)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(Author {
            id,
            ..author.clone()
        })
    }

    async fn update(&self, author: &Author) -> StoreResult<()> {
        sqlx::query(
            "UPDATE authors SET first_name = ?, last_name = ?, country_id = ? WHERE id = ?",
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(author.country_id)
        .bind(author.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, author: &Author) -> StoreResult<()> {
        sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(author.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn authors_of_book(&self, book_id: i64) -> StoreResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(&format!(
            "SELECT {AUTHOR_COLUMNS}
             FROM authors a
             JOIN book_authors ba ON ba.author_id = a.id
             WHERE ba.book_id = ?
             ORDER BY a.last_name, a.first_name"
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    async fn books_of_author(&self, author_id: i64) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT b.id, b.isbn, b.title, b.date_published
             FROM books b
             JOIN book_authors ba ON ba.book_id = b.id
             WHERE ba.author_id = ?
             ORDER BY b.title",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }
}
