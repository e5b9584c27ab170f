//! Tab navigation
//!
//! Pure class toggling; nothing here is persisted.

use wasm_bindgen::JsCast;
use web_sys::Element;

use super::{ACTION_ATTRIBUTE, TARGET_ATTRIBUTE};

const ACTIVE_CLASS: &str = "active";

/// Show the primary view `tab_id` and highlight its nav item
pub fn switch_tab(document: &web_sys::Document, tab_id: &str) {
    activate(document, ".tab-content", "tab", tab_id);
}

/// Show the secondary view `sub_tab_id` and highlight its button
pub fn switch_sub_tab(document: &web_sys::Document, sub_tab_id: &str) {
    activate(document, ".sub-tab-content", "sub-tab", sub_tab_id);
}

fn activate(document: &web_sys::Document, panels: &str, action: &str, id: &str) {
    clear_active(document, panels);
    match document.get_element_by_id(id) {
        Some(panel) => {
            let _ = panel.class_list().add_1(ACTIVE_CLASS);
        }
        None => log::warn!("No view with id {}", id),
    }

    let triggers = format!("[{ACTION_ATTRIBUTE}=\"{action}\"]");
    clear_active(document, &triggers);
    let selected = format!("[{ACTION_ATTRIBUTE}=\"{action}\"][{TARGET_ATTRIBUTE}=\"{id}\"]");
    if let Ok(Some(trigger)) = document.query_selector(&selected) {
        let _ = trigger.class_list().add_1(ACTIVE_CLASS);
    }
}

fn clear_active(document: &web_sys::Document, selector: &str) {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return;
    };
    for i in 0..nodes.length() {
        if let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            let _ = el.class_list().remove_1(ACTIVE_CLASS);
        }
    }
}
