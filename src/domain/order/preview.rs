use std::collections::HashSet;
use std::sync::Mutex;

use uuid::Uuid;

use super::value_objects::PhotoFile;

/// Hands out local preview URLs for selected photos.
///
/// Every allocated URL must be revoked once its file is replaced, removed or
/// the wizard is torn down.
pub trait PreviewAllocator: Send + Sync {
    fn allocate(&self, file: &PhotoFile) -> String;
    fn revoke(&self, url: &str);
}

/// Tracks live preview URLs in memory
#[derive(Debug, Default)]
pub struct InMemoryPreviews {
    live: Mutex<HashSet<String>>,
}

impl InMemoryPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.lock().map(|live| live.contains(url)).unwrap_or(false)
    }
}

impl PreviewAllocator for InMemoryPreviews {
    fn allocate(&self, file: &PhotoFile) -> String {
        let url = format!("blob:preview/{}", Uuid::new_v4());
        tracing::debug!(file = %file.name, url = %url, "Allocated photo preview");
        if let Ok(mut live) = self.live.lock() {
            live.insert(url.clone());
        }
        url
    }

    fn revoke(&self, url: &str) {
        let removed = self
            .live
            .lock()
            .map(|mut live| live.remove(url))
            .unwrap_or(false);
        if removed {
            tracing::debug!(url = %url, "Revoked photo preview");
        } else {
            tracing::warn!(url = %url, "Revoking unknown photo preview");
        }
    }
}
