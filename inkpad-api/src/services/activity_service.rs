//! Activity Service
//!
//! Read access to the per-user counters. Counters only change as a side
//! effect of account and note operations.

use std::sync::Arc;

use inkpad_core::{UserActivity, UserId};
use inkpad_storage::Store;

use crate::error::{ApiError, ApiResult};

pub struct ActivityService {
    store: Arc<dyn Store>,
}

impl ActivityService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Counters for `user_id`.
    pub async fn get(&self, user_id: UserId) -> ApiResult<UserActivity> {
        self.store
            .activity_get(user_id)
            .await?
            .ok_or_else(|| ApiError::user_not_found(user_id))
    }

    /// Counters for the account named `username`.
    pub async fn get_by_username(&self, username: &str) -> ApiResult<UserActivity> {
        self.store
            .activity_get_by_username(username)
            .await?
            .ok_or_else(|| ApiError::activity_not_found(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use inkpad_core::new_entity_id;
    use inkpad_test_utils::fixtures::store_with_user;

    #[tokio::test]
    async fn test_get_fresh_counters() -> Result<(), Box<dyn std::error::Error>> {
        let (store, user) = store_with_user("alice", "a@x.com").await?;
        let service = ActivityService::new(Arc::new(store));

        let by_id = service.get(user.user_id).await?;
        let by_name = service.get_by_username("alice").await?;
        assert_eq!(by_id, by_name);
        assert_eq!(by_id, UserActivity::new(user.user_id));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_user() -> Result<(), Box<dyn std::error::Error>> {
        let (store, _) = store_with_user("alice", "a@x.com").await?;
        let service = ActivityService::new(Arc::new(store));

        let err = service.get_by_username("bob").await.err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::ActivityNotFound));

        let err = service.get(new_entity_id()).await.err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::UserNotFound));
        Ok(())
    }
}
