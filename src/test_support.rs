//! Fixtures shared by unit tests that need a real database.

use crate::config::StorageBackend;
use crate::db::Store;

/// Fresh sqlite file under the system temp dir, fully migrated.
pub async fn temp_store() -> Store {
    let path = std::env::temp_dir().join(format!("focusledger-test-{}.db", uuid::Uuid::new_v4()));
    Store::connect(&StorageBackend::Local { path }, 5, 1)
        .await
        .expect("temp store")
}

/// Inserts a bare account without starter subjects and returns its id.
pub async fn seed_user(store: &Store, email: &str) -> i32 {
    store
        .create_user_with_subjects(email, "not-a-real-hash".to_string(), None, &[])
        .await
        .expect("seed user")
        .id
}
