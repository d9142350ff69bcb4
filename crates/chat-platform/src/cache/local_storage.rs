//! `window.localStorage` cache backend.
//! Persistent across page reloads, scoped to the page origin.

use wasm_bindgen::JsValue;
use web_sys::Storage;

use chat_core::ports::CachePort;
use chat_types::{ChatError, Result};

pub struct LocalStorageCache {
    storage: Storage,
}

impl LocalStorageCache {
    /// Bind to the window's localStorage. Fails outside a browser window or
    /// when storage access is blocked (private mode, sandboxed iframes).
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| ChatError::Storage("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(storage_error)?
            .ok_or_else(|| ChatError::Storage("localStorage not available".to_string()))?;
        Ok(Self { storage })
    }
}

impl CachePort for LocalStorageCache {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(storage_error)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(storage_error)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(storage_error)
    }

    fn backend_name(&self) -> &str {
        "localStorage"
    }
}

fn storage_error(e: JsValue) -> ChatError {
    ChatError::Storage(format!("{:?}", e))
}
