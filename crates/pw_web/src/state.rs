use std::sync::Arc;

use pw_core::Settings;
use pw_pipeline::ArticleManager;
use reqwest::Client;

pub struct AppState {
    pub manager: Arc<ArticleManager>,
    pub settings: Settings,
    /// Used by the connection diagnostic.
    pub client: Client,
}

impl AppState {
    pub fn new(manager: Arc<ArticleManager>, settings: Settings) -> Self {
        Self {
            manager,
            settings,
            client: Client::new(),
        }
    }
}
