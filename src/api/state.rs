use std::sync::Arc;

use tokio::sync::RwLock;

use crate::classify::Classifier;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Swapped whole on taxonomy reload; handlers clone the inner `Arc`.
    pub classifier: Arc<RwLock<Arc<Classifier>>>,
}

impl AppState {
    pub fn new(config: AppConfig, classifier: Classifier) -> Self {
        Self {
            config: Arc::new(config),
            classifier: Arc::new(RwLock::new(Arc::new(classifier))),
        }
    }

    /// Current classifier snapshot.
    pub async fn classifier(&self) -> Arc<Classifier> {
        Arc::clone(&*self.classifier.read().await)
    }
}
