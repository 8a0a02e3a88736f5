//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use inkpad_storage::Store;

use crate::auth::{AuthConfig, TokenService};
use crate::password::PasswordHasher;
use crate::services::{AccountService, ActivityService, NoteService};

/// Application-wide state, built once at startup and cloned into handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub notes: Arc<NoteService>,
    pub activity: Arc<ActivityService>,
    pub tokens: Arc<TokenService>,
    /// Backing store, used directly by the readiness probe.
    pub store: Arc<dyn Store>,
    pub start_time: Instant,
}

impl AppState {
    /// Wire the services over `store`.
    pub fn new(store: Arc<dyn Store>, hasher: PasswordHasher, auth: AuthConfig) -> Self {
        let tokens = Arc::new(TokenService::new(auth));
        let activity = Arc::new(ActivityService::new(store.clone()));
        let accounts = Arc::new(AccountService::new(
            store.clone(),
            hasher,
            tokens.clone(),
            activity.clone(),
        ));
        let notes = Arc::new(NoteService::new(store.clone()));

        Self {
            accounts,
            notes,
            activity,
            tokens,
            store,
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(Arc<AccountService>, accounts);
crate::impl_from_ref!(Arc<NoteService>, notes);
crate::impl_from_ref!(Arc<ActivityService>, activity);
crate::impl_from_ref!(Arc<TokenService>, tokens);
crate::impl_from_ref!(Arc<dyn Store>, store);
crate::impl_from_ref!(Instant, start_time);
