use async_trait::async_trait;
use catalog_db::{SqlitePool, StoreResult};

use super::models::Reviewer;
use crate::modules::reviews::models::Review;

#[async_trait]
pub trait ReviewerRepository: Send + Sync {
    /// All reviewers ordered by last name.
    async fn list(&self) -> StoreResult<Vec<Reviewer>>;
    async fn get(&self, id: i64) -> StoreResult<Option<Reviewer>>;
    async fn exists(&self, id: i64) -> StoreResult<bool>;
    async fn create(&self, reviewer: &Reviewer) -> StoreResult<Reviewer>;
    async fn update(&self, reviewer: &Reviewer) -> StoreResult<()>;
    /// Callers delete the reviewer's reviews first.
    async fn delete(&self, reviewer: &Reviewer) -> StoreResult<()>;
    async fn reviews_of_reviewer(&self, reviewer_id: i64) -> StoreResult<Vec<Review>>;
    async fn reviewer_of_review(&self, review_id: i64) -> StoreResult<Option<Reviewer>>;
}

pub struct SqliteReviewerRepository {
    pool: SqlitePool,
}

impl SqliteReviewerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewerRepository for SqliteReviewerRepository {
    async fn list(&self) -> StoreResult<Vec<Reviewer>> {
        let reviewers = sqlx::query_as::<_, Reviewer>(
            "SELECT id, first_name, last_name FROM reviewers ORDER BY last_name, first_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(reviewers)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Reviewer>> {
        let reviewer = sqlx::query_as::<_, Reviewer>(
            "SELECT id, first_name, last_name FROM reviewers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(reviewer)
    }

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviewers WHERE id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create(&self, reviewer: &Reviewer) -> StoreResult<Reviewer> {
        let id = sqlx::query("INSERT INTO reviewers (first_name, last_name) VALUES (?, ?)")
            .bind(&reviewer.first_name)
            .bind(&reviewer.last_name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(Reviewer {
            id,
            ..reviewer.clone()
        })
    }

    async fn update(&self, reviewer: &Reviewer) -> StoreResult<()> {
        sqlx::query("UPDATE reviewers SET first_name = ?, last_name = ? WHERE id = ?")
            .bind(&reviewer.first_name)
            .bind(&reviewer.last_name)
            .bind(reviewer.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, reviewer: &Reviewer) -> StoreResult<()> {
        sqlx::query("DELETE FROM reviewers WHERE id = ?")
            .bind(reviewer.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reviews_of_reviewer(&self, reviewer_id: i64) -> StoreResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT id, headline, review_text, rating, book_id, reviewer_id
             FROM reviews
             WHERE reviewer_id = ?
             ORDER BY headline",
        )
        .bind(reviewer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn reviewer_of_review(&self, review_id: i64) -> StoreResult<Option<Reviewer>> {
        let reviewer = sqlx::query_as::<_, Reviewer>(
            "SELECT rv.id, rv.first_name, rv.last_name
             FROM reviewers rv
             JOIN reviews r ON r.reviewer_id = rv.id
             WHERE r.id = ?",
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(reviewer)
    }
}
