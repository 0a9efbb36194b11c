//! Repositories shared by every request handler.

use std::sync::Arc;

use catalog_db::Database;

use crate::modules::authors::repository::{AuthorRepository, SqliteAuthorRepository};
use crate::modules::books::repository::{BookRepository, SqliteBookRepository};
use crate::modules::categories::repository::{CategoryRepository, SqliteCategoryRepository};
use crate::modules::countries::repository::{CountryRepository, SqliteCountryRepository};
use crate::modules::reviewers::repository::{ReviewerRepository, SqliteReviewerRepository};
use crate::modules::reviews::repository::{ReviewRepository, SqliteReviewRepository};

/// One repository per entity kind, injected into every module router.
///
/// Handlers often need more than their own repository (a country delete
/// consults authors), so the whole set travels together.
#[derive(Clone)]
pub struct AppState {
    pub countries: Arc<dyn CountryRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub books: Arc<dyn BookRepository>,
    pub reviewers: Arc<dyn ReviewerRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
}

impl AppState {
    /// Wire the SQLite-backed repositories to one shared pool.
    pub fn sqlite(db: &Database) -> Self {
        let pool = db.pool().clone();
        Self {
            countries: Arc::new(SqliteCountryRepository::new(pool.clone())),
            categories: Arc::new(SqliteCategoryRepository::new(pool.clone())),
            authors: Arc::new(SqliteAuthorRepository::new(pool.clone())),
            books: Arc::new(SqliteBookRepository::new(pool.clone())),
            reviewers: Arc::new(SqliteReviewerRepository::new(pool.clone())),
            reviews: Arc::new(SqliteReviewRepository::new(pool)),
        }
    }
}
