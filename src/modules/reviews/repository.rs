//! Review persistence.

use async_trait::async_trait;
use catalog_db::{SqlitePool, StoreResult};

use super::models::Review;
use crate::modules::books::models::Book;

const REVIEW_COLUMNS: &str = "r.id, r.headline, r.review_text, r.rating, r.book_id, r.reviewer_id";

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// All reviews ordered by headline.
    async fn list(&self) -> StoreResult<Vec<Review>>;
    async fn get(&self, id: i64) -> StoreResult<Option<Review>>;
    async fn exists(&self, id: i64) -> StoreResult<bool>;
    async fn reviews_of_book(&self, book_id: i64) -> StoreResult<Vec<Review>>;
    async fn book_of_review(&self, review_id: i64) -> StoreResult<Option<Book>>;
    async fn create(&self, review: &Review) -> StoreResult<Review>;
    async fn update(&self, review: &Review) -> StoreResult<()>;
    async fn delete(&self, review: &Review) -> StoreResult<()>;
    /// Bulk removal used before deleting a book or reviewer.
    async fn delete_many(&self, reviews: &[Review]) -> StoreResult<()>;
}

pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    async fn list(&self) -> StoreResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews r ORDER BY r.headline"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews r WHERE r.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn reviews_of_book(&self, book_id: i64) -> StoreResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews r WHERE r.book_id = ? ORDER BY r.headline"
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn book_of_review(&self, review_id: i64) -> StoreResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT b.id, b.isbn, b.title, b.date_published
             FROM books b
             JOIN reviews r ON r.book_id = b.id
             WHERE r.id = ?",
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn create(&self, review: &Review) -> StoreResult<Review> {
        let id = sqlx::query(
            "INSERT INTO reviews (headline, review_text, rating, book_id, reviewer_id)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&review.headline)
        .bind(&review.review_text)
        .bind(review.rating)
        .bind(review.book_id)
        .bind(review.reviewer_id)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(Review {
            id,
            ..review.clone()
        })
    }

    async fn update(&self, review: &Review) -> StoreResult<()> {
        sqlx::query(
            "UPDATE reviews
             SET headline = ?, review_text = ?, rating = ?, book_id = ?, reviewer_id = ?
             WHERE id = ?",
        )
        .bind(&review.headline)
        .bind(&review.review_text)
        .bind(review.rating)
        .bind(review.book_id)
        .bind(review.reviewer_id)
        .bind(review.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, review: &Review) -> StoreResult<()> {
        sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(review.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_many(&self, reviews: &[Review]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for review in reviews {
            sqlx::query("DELETE FROM reviews WHERE id = ?")
                .bind(review.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::debug!(count = reviews.len(), "reviews deleted");
        Ok(())
    }
}
