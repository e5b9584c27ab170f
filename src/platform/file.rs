//! Backup download and import file reading

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, HtmlAnchorElement, Url};

use super::storage::describe;
use crate::error::{EditorError, EditorResult};

/// Delay before a download's object URL is released
const REVOKE_DELAY_MS: i32 = 1_000;

fn export_error(e: JsValue) -> EditorError {
    EditorError::Export(describe(&e))
}

/// Offer `contents` to the user as a file download
pub fn download(
    document: &web_sys::Document,
    file_name: &str,
    mime_type: &str,
    contents: &str,
) -> EditorResult<()> {
    let parts = js_sys::Array::of1(&JsValue::from_str(contents));
    let options = BlobPropertyBag::new();
    options.set_type(mime_type);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(export_error)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(export_error)?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(export_error)?
        .dyn_into()
        .map_err(|_| EditorError::Export("not an anchor".to_string()))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);

    let body = document
        .body()
        .ok_or_else(|| EditorError::Export("document has no body".to_string()))?;
    body.append_child(&anchor).map_err(export_error)?;
    anchor.click();
    let _ = body.remove_child(&anchor);
    revoke_later(url);

    log::info!("Offered {} for download ({} bytes)", file_name, contents.len());
    Ok(())
}

/// Release an object URL once the browser has started the download.
/// Some browsers cancel a download whose URL is revoked during `click()`.
fn revoke_later(url: String) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let revoke = Closure::once_into_js(move || {
        let _ = Url::revoke_object_url(&url);
    });
    if let Err(e) = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(revoke.unchecked_ref(), REVOKE_DELAY_MS)
    {
        log::warn!("Could not schedule object URL release: {}", describe(&e));
    }
}

/// Read a user-selected file as UTF-8 text
pub async fn read_text(file: File) -> EditorResult<String> {
    let text = JsFuture::from(file.text())
        .await
        .map_err(|e| EditorError::FileRead(describe(&e)))?;
    text.as_string()
        .ok_or_else(|| EditorError::FileRead("file contents are not text".to_string()))
}

/// Blocking notification
pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}
