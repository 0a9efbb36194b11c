//! Book persistence, including the author/category join records and ratings.

use async_trait::async_trait;
use catalog_db::{SqlitePool, StoreResult};
use sqlx::{Sqlite, Transaction};

use super::models::Book;

const BOOK_COLUMNS: &str = "id, isbn, title, date_published";

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books ordered by title.
    async fn list(&self) -> StoreResult<Vec<Book>>;
    async fn get(&self, id: i64) -> StoreResult<Option<Book>>;
    async fn get_by_isbn(&self, isbn: &str) -> StoreResult<Option<Book>>;
    async fn exists(&self, id: i64) -> StoreResult<bool>;
    async fn isbn_exists(&self, isbn: &str) -> StoreResult<bool>;
    /// True when a book other than `book_id` has the same trimmed, case-folded ISBN.
    async fn is_duplicate_isbn(&self, book_id: i64, isbn: &str) -> StoreResult<bool>;
    /// Mean review rating, `0.0` for a book without reviews.
    async fn rating(&self, book_id: i64) -> StoreResult<f64>;
    /// Inserts the book and links every id that resolves; unknown ids are skipped.
    async fn create(&self, book: &Book, author_ids: &[i64], category_ids: &[i64])
        -> StoreResult<Book>;
    /// Replaces the book row and all of its join records.
    async fn update(&self, book: &Book, author_ids: &[i64], category_ids: &[i64])
        -> StoreResult<()>;
    /// Join records go with the book; reviews must already be gone.
    async fn delete(&self, book: &Book) -> StoreResult<()>;
}

pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn link(
    tx: &mut Transaction<'_, Sqlite>,
    book_id: i64,
    author_ids: &[i64],
    category_ids: &[i64],
) -> StoreResult<()> {
    for author_id in author_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO book_authors (book_id, author_id)
             SELECT ?, id FROM authors WHERE id = ?",
        )
        .bind(book_id)
        .bind(author_id)
        .execute(&mut **tx)
        .await?;
    }

    for category_id in category_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO book_categories (book_id, category_id)
             SELECT ?, id FROM categories WHERE id = ?",
        )
        .bind(book_id)
        .bind(category_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn list(&self) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY title"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn get_by_isbn(&self, isbn: &str) -> StoreResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE UPPER(TRIM(isbn)) = UPPER(TRIM(?)) LIMIT 1"
        ))
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn isbn_exists(&self, isbn: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE UPPER(TRIM(isbn)) = UPPER(TRIM(?)))",
        )
        .bind(isbn)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn is_duplicate_isbn(&self, book_id: i64, isbn: &str) -> StoreResult<bool> {
        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM books
                WHERE UPPER(TRIM(isbn)) = UPPER(TRIM(?)) AND id <> ?
            )",
        )
        .bind(isbn)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(duplicate)
    }

    async fn rating(&self, book_id: i64) -> StoreResult<f64> {
        let (count, total): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(rating), 0) FROM reviews WHERE book_id = ?",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        if count == 0 {
            return Ok(0.0);
        }
        Ok(total as f64 / count as f64)
    }

    async fn create(
        &self,
        book: &Book,
        author_ids: &[i64],
        category_ids: &[i64],
    ) -> StoreResult<Book> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query("INSERT INTO books (isbn, title, date_published) VALUES (?, ?, ?)")
            .bind(&book.isbn)
            .bind(&book.title)
            .bind(book.date_published)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        link(&mut tx, id, author_ids, category_ids).await?;
        tx.commit().await?;

        Ok(Book {
            id,
            ..book.clone()
        })
    }

    async fn update(
        &self,
        book: &Book,
        author_ids: &[i64],
        category_ids: &[i64],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM book_authors WHERE book_id = ?")
            .bind(book.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM book_categories WHERE book_id = ?")
            .bind(book.id)
            .execute(&mut *tx)
            .await?;

        link(&mut tx, book.id, author_ids, category_ids).await?;

        sqlx::query("UPDATE books SET isbn = ?, title = ?, date_published = ? WHERE id = ?")
            .bind(&book.isbn)
            .bind(&book.title)
            .bind(book.date_published)
            .bind(book.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, book: &Book) -> StoreResult<()> {
        sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(book.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing;

    #[tokio::test]
    async fn create_links_only_existing_ids() {
        let (_db, state) = testing::state().await;
        let country = testing::country(&state, "France").await;
        let author = testing::author(&state, "Jules", "Verne", country.id).await;
        let category = testing::category(&state, "Adventure").await;

        let book = Book {
            id: 0,
            isbn: "2070417".into(),
            title: "Vingt mille lieues".into(),
            date_published: None,
        };
        let created = state
            .books
            .create(&book, &[author.id, 999], &[category.id, 998])
            .await
            .unwrap();

        assert!(created.id > 0);
        let authors = state.authors.authors_of_book(created.id).await.unwrap();
        assert_eq!(authors, vec![author]);
        let categories = state.categories.categories_of_book(created.id).await.unwrap();
        assert_eq!(categories, vec![category]);
    }

    #[tokio::test]
    async fn update_replaces_join_records() {
        let (_db, state) = testing::state().await;
        let country = testing::country(&state, "France").await;
        let verne = testing::author(&state, "Jules", "Verne", country.id).await;
        let dumas = testing::author(&state, "Alexandre", "Dumas", country.id).await;
        let adventure = testing::category(&state, "Adventure").await;
        let history = testing::category(&state, "History").await;
        let book = testing::book(&state, "2070417", "Draft", &[verne.id], &[adventure.id]).await;

        let renamed = Book {
            title: "Les Trois Mousquetaires".into(),
            ..book.clone()
        };
        state
            .books
            .update(&renamed, &[dumas.id], &[history.id])
            .await
            .unwrap();

        assert_eq!(state.books.get(book.id).await.unwrap(), Some(renamed));
        assert_eq!(state.authors.authors_of_book(book.id).await.unwrap(), vec![dumas]);
        assert_eq!(
            state.categories.categories_of_book(book.id).await.unwrap(),
            vec![history]
        );
    }

    #[tokio::test]
    async fn isbn_lookups_ignore_case_and_whitespace() {
        let (_db, state) = testing::state().await;
        let country = testing::country(&state, "France").await;
        let author = testing::author(&state, "Jules", "Verne", country.id).await;
        let category = testing::category(&state, "Adventure").await;
        let book = testing::book(&state, "207041x", "Vingt mille lieues", &[author.id], &[category.id]).await;

        assert_eq!(state.books.get_by_isbn(" 207041X ").await.unwrap(), Some(book.clone()));
        assert!(state.books.isbn_exists("207041X").await.unwrap());
        assert!(state.books.is_duplicate_isbn(0, "207041X").await.unwrap());
        assert!(!state.books.is_duplicate_isbn(book.id, "207041X").await.unwrap());
        assert!(state.books.get_by_isbn("0000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rating_is_the_mean_or_zero() {
        let (_db, state) = testing::state().await;
        let country = testing::country(&state, "France").await;
        let author = testing::author(&state, "Jules", "Verne", country.id).await;
        let category = testing::category(&state, "Adventure").await;
        let book = testing::book(&state, "2070417", "Vingt mille lieues", &[author.id], &[category.id]).await;
        let reviewer = testing::reviewer(&state, "Ada", "Lovelace").await;

        assert_eq!(state.books.rating(book.id).await.unwrap(), 0.0);

        for rating in [3, 4, 5] {
            testing::review(&state, "Fine", rating, book.id, reviewer.id).await;
        }
        assert_eq!(state.books.rating(book.id).await.unwrap(), 4.0);
    }

    #[tokio::test]
    async fn delete_removes_join_records() {
        let (db, state) = testing::state().await;
        let country = testing::country(&state, "France").await;
        let author = testing::author(&state, "Jules", "Verne", country.id).await;
        let category = testing::category(&state, "Adventure").await;
        let book = testing::book(&state, "2070417", "Vingt mille lieues", &[author.id], &[category.id]).await;

        state.books.delete(&book).await.unwrap();

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_authors")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(links, 0);
        assert!(!state.books.exists(book.id).await.unwrap());
    }
}
