//! Category persistence and the category side of the book/category join.

use async_trait::async_trait;
use catalog_db::{SqlitePool, StoreResult};

use super::models::Category;
use crate::modules::books::models::Book;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name.
    async fn list(&self) -> StoreResult<Vec<Category>>;
    async fn get(&self, id: i64) -> StoreResult<Option<Category>>;
    async fn exists(&self, id: i64) -> StoreResult<bool>;
    /// True when a category other than `id` has the same trimmed, case-folded name.
    async fn is_duplicate_name(&self, id: i64, name: &str) -> StoreResult<bool>;
    async fn create(&self, category: &Category) -> StoreResult<Category>;
    async fn update(&self, category: &Category) -> StoreResult<()>;
    /// Callers must first make sure no book is linked to the category.
    async fn delete(&self, category: &Category) -> StoreResult<()>;
    async fn categories_of_book(&self, book_id: i64) -> StoreResult<Vec<Category>>;
    async fn books_of_category(&self, category_id: i64) -> StoreResult<Vec<Book>>;
}

pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn list(&self) -> StoreResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Category>> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(category)
    }

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn is_duplicate_name(&self, id: i64, name: &str) -> StoreResult<bool> {
        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM categories
                WHERE UPPER(TRIM(name)) = UPPER(TRIM(?)) AND id <> ?
            )",
        )
        .bind(name)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(duplicate)
    }

    async fn create(&self, category: &Category) -> StoreResult<Category> {
        let id = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(&category.name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(Category {
            id,
            name: category.name.clone(),
        })
    }

    async fn update(&self, category: &Category) -> StoreResult<()> {
        sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(&category.name)
            .bind(category.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, category: &Category) -> StoreResult<()> {
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(category.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn categories_of_book(&self, book_id: i64) -> StoreResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT c.id, c.name
             FROM categories c
             JOIN book_categories bc ON bc.category_id = c.id
             WHERE bc.book_id = ?
             ORDER BY c.name",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn books_of_category(&self, category_id: i64) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT b.id, b.isbn, b.title, b.date_published
             FROM books b
             JOIN book_categories bc ON bc.book_id = b.id
             WHERE bc.category_id = ?
             ORDER BY b.title",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }
}
