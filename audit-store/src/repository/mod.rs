//! Repository Module
//!
//! Mutation operations over the audit document. Every entity has two layers:
//!
//! - `apply_*` functions: pure transformers `AppState -> AppState`, testable
//!   without a store. They own the Finding ↔ CAPA link invariant.
//! - store-bound functions: run a transformer through
//!   [`StateStore::update_document`](crate::store::StateStore::update_document)
//!   and return the persisted document.
//!
//! Input validation happens one level up (see [`crate::validation`]); the
//! transformers only reject references to entities that do not exist.

pub mod capa;
pub mod finding;
pub mod import;

use shared::AppState;
use shared::error::AppResult;

use crate::store::StateStore;

/// Run a fallible transformer through the store, mapping store failures
/// into the user-facing error type.
pub(crate) fn commit<F>(store: &StateStore, mutate: F) -> AppResult<AppState>
where
    F: FnOnce(AppState) -> AppResult<AppState>,
{
    store.try_update_document(mutate)
}
