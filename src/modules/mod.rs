pub mod authors;
pub mod books;
pub mod categories;
pub mod countries;
pub mod reviewers;
pub mod reviews;

use catalog_kernel::ModuleRegistry;

use crate::state::AppState;

/// Register every catalog resource module with the registry
pub fn register_all(registry: &mut ModuleRegistry, state: &AppState) -> anyhow::Result<()> {
    registry.register(countries::create_module(state.clone()))?;
    registry.register(categories::create_module(state.clone()))?;
    registry.register(authors::create_module(state.clone()))?;
    registry.register(books::create_module(state.clone()))?;
    registry.register(reviewers::create_module(state.clone()))?;
    registry.register(reviews::create_module(state.clone()))?;
    Ok(())
}
