use std::sync::Arc;

use agora_core::Forum;

use crate::auth::GithubOAuth;

#[derive(Clone)]
pub struct AppState {
    pub forum: Forum,
    pub github: Arc<GithubOAuth>,
}

impl AppState {
    pub fn new(forum: Forum, github: GithubOAuth) -> Self {
        Self {
            forum,
            github: Arc::new(github),
        }
    }
}
