pub mod handlers;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::core::config::AppPaths;
    use crate::state::AppState;

    /// State over a fresh temporary data directory with the default
    /// (hashing) embedder.
    pub async fn test_state() -> (Arc<AppState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let paths = Arc::new(AppPaths::with_data_dir(
            dir.path().to_path_buf(),
            dir.path().join("data"),
        ));
        let state = AppState::initialize(paths).await.unwrap();
        (state, dir)
    }
}
