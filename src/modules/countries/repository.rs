//! Country persistence.

use async_trait::async_trait;
use catalog_db::{SqlitePool, StoreResult};

use super::models::Country;
use crate::modules::authors::models::Author;

/// Query and mutation operations over stored countries.
#[async_trait]
pub trait CountryRepository: Send + Sync {
    /// All countries ordered by name.
    async fn list(&self) -> StoreResult<Vec<Country>>;
    async fn get(&self, id: i64) -> StoreResult<Option<Country>>;
    async fn exists(&self, id: i64) -> StoreResult<bool>;
    /// True when a country other than `id` has the same trimmed, case-folded name.
    async fn is_duplicate_name(&self, id: i64, name: &str) -> StoreResult<bool>;
    /// Insert and return the stored row with its assigned id.
    async fn create(&self, country: &Country) -> StoreResult<Country>;
    async fn update(&self, country: &Country) -> StoreResult<()>;
    /// Callers must first make sure no author references the country.
    async fn delete(&self, country: &Country) -> StoreResult<()>;
    async fn authors_of(&self, country_id: i64) -> StoreResult<Vec<Author>>;
    async fn country_of_author(&self, author_id: i64) -> StoreResult<Option<Country>>;
}

/// SQLite-backed [`CountryRepository`].
pub struct SqliteCountryRepository {
    pool: SqlitePool,
}

impl SqliteCountryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CountryRepository for SqliteCountryRepository {
    async fn list(&self) -> StoreResult<Vec<Country>> {
        let countries = sqlx::query_as::<_, Country>("SELECT id, name FROM countries ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(countries)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Country>> {
        let country = sqlx::query_as::<_, Country>("SELECT id, name FROM countries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(country)
    }

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM countries WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn is_duplicate_name(&self, id: i64, name: &str) -> StoreResult<bool> {
        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM countries
                WHERE UPPER(TRIM(name)) = UPPER(TRIM(?)) AND id <> ?
            )",
        )
        .bind(name)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(duplicate)
    }

    async fn create(&self, country: &Country) -> StoreResult<Country> {
        let id = sqlx::query("INSERT INTO countries (name) VALUES (?)")
            .bind(&country.name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(Country {
            id,
            name: country.name.clone(),
        })
    }

    async fn update(&self, country: &Country) -> StoreResult<()> {
        sqlx::query("UPDATE countries SET name = ? WHERE id = ?")
            .bind(&country.name)
            .bind(country.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, country: &Country) -> StoreResult<()> {
        sqlx::query("DELETE FROM countries WHERE id = ?")
            .bind(country.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn authors_of(&self, country_id: i64) -> StoreResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, country_id
             FROM authors
             WHERE country_id = ?
             ORDER BY last_name, first_name",
        )
        .bind(country_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    async fn country_of_author(&self, author_id: i64) -> StoreResult<Option<Country>> {
        let country = sqlx::query_as::<_, Country>(
            "SELECT c.id, c.name
             FROM countries c
             JOIN authors a ON a.country_id = c.id
             WHERE a.id = ?",
        )
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(country)
    }
}
