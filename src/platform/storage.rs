//! LocalStorage backend

use wasm_bindgen::{JsCast, JsValue};
use web_sys::Storage;

use crate::error::{EditorError, EditorResult};
use crate::store::KeyValueStore;

/// `window.localStorage`
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    pub fn open() -> EditorResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| EditorError::StorageUnavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| EditorError::StorageUnavailable(describe(&e)))?
            .ok_or_else(|| EditorError::StorageUnavailable("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> EditorResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| EditorError::storage_read(key, describe(&e)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> EditorResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| EditorError::storage_write(key, describe(&e)))
    }

    fn remove_item(&mut self, key: &str) -> EditorResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| EditorError::storage_write(key, describe(&e)))
    }
}

/// Human readable text for a thrown JS value (QuotaExceededError etc.)
pub fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.to_string());
    }
    format!("{value:?}")
}
