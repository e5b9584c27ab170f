//! Siridhamma editor entry point
//!
//! On web: hydrates the page and wires edit, row, backup and tab handlers.
//! Natively: inspects backup files, or prints the backup a fresh page would
//! produce.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_editor {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, HtmlInputElement};

    use siridhamma_editor::config::BACKUP_MIME_TYPE;
    use siridhamma_editor::platform::dom::BrowserDocument;
    use siridhamma_editor::platform::storage::LocalStorage;
    use siridhamma_editor::platform::{
        ACTION_ATTRIBUTE, Action, COLUMNS_ATTRIBUTE, TARGET_ATTRIBUTE, file, nav,
    };
    use siridhamma_editor::{EditorConfig, EditorError, EditorResult, EditorSession, SystemClock};

    type Session = EditorSession<LocalStorage, BrowserDocument, SystemClock>;
    type SharedSession = Rc<RefCell<Session>>;

    /// Value of `data-action` on the backup file input
    const IMPORT_ACTION: &str = "import";

    /// Tells the user about failed saves once per page load
    #[derive(Clone, Default)]
    struct SaveFailureNotice {
        shown: Rc<Cell<bool>>,
    }

    impl SaveFailureNotice {
        fn report(&self, err: &EditorError) {
            log::error!("Save failed: {}", err);
            if !self.shown.replace(true) {
                file::alert(&format!(
                    "Your latest changes could not be saved ({err}). \
                     Export a backup and free some browser storage."
                ));
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Siridhamma editor starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let config = EditorConfig::load(&document);
        let storage = match LocalStorage::open() {
            Ok(storage) => storage,
            Err(e) => {
                log::error!("{}", e);
                file::alert(&format!("Changes cannot be saved in this browser: {e}"));
                return;
            }
        };

        let mut session = match EditorSession::from_config(
            &config,
            storage,
            BrowserDocument::new(document.clone()),
            SystemClock,
        ) {
            Ok(session) => session,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };

        let notice = SaveFailureNotice::default();
        let report = match session.hydrate() {
            Ok(report) => report,
            Err(e) => {
                // Edits are not captured for a half-loaded page
                notice.report(&e);
                return;
            }
        };
        if !report.undecodable.is_empty() {
            file::alert(&format!(
                "Saved rows for {} could not be read. Changes to these tables will not be \
                 saved until a backup is restored.",
                report.undecodable.join(", ")
            ));
        }

        let session = Rc::new(RefCell::new(session));
        setup_change_capture(&document, session.clone(), notice.clone());
        setup_actions(&document, session.clone(), notice, config.backup_file_name.clone());
        setup_import(&document, session);

        log::info!("Siridhamma editor ready");
    }

    fn event_element(event: &web_sys::Event) -> Option<Element> {
        event.target()?.dyn_into::<Element>().ok()
    }

    fn setup_change_capture(document: &web_sys::Document, session: SharedSession, notice: SaveFailureNotice) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let Some(target) = event_element(&event) else {
                return;
            };
            let result = session.borrow_mut().handle_edit(&target);
            if let Err(e) = result {
                notice.report(&e);
            }
        });
        let _ = document.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_actions(
        document: &web_sys::Document,
        session: SharedSession,
        notice: SaveFailureNotice,
        backup_file_name: String,
    ) {
        let selector = format!("[{ACTION_ATTRIBUTE}]");
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let Some(trigger) = event_element(&event).and_then(|el| el.closest(&selector).ok().flatten())
            else {
                return;
            };
            let Some(name) = trigger.get_attribute(ACTION_ATTRIBUTE) else {
                return;
            };
            let Some(action) = Action::parse(
                &name,
                trigger.get_attribute(TARGET_ATTRIBUTE).as_deref(),
                trigger.get_attribute(COLUMNS_ATTRIBUTE).as_deref(),
            ) else {
                return;
            };

            if let Err(e) = dispatch(&session, action, &backup_file_name) {
                match e {
                    EditorError::Export(_) | EditorError::Serialization(_) => {
                        log::error!("{}", e);
                        file::alert(&e.to_string());
                    }
                    _ => notice.report(&e),
                }
            }
        });
        let _ = document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn dispatch(session: &SharedSession, action: Action, backup_file_name: &str) -> EditorResult<()> {
        match action {
            Action::AddRow(id) => session.borrow_mut().add_row(&id).map(drop),
            Action::AddAttendanceRow(id) => session.borrow_mut().add_attendance_row(&id).map(drop),
            Action::AddGenericRow(id, columns) => {
                session.borrow_mut().add_generic_row(&id, columns).map(drop)
            }
            Action::Export => {
                let session = session.borrow();
                let json = session.export_json()?;
                file::download(session.document().inner(), backup_file_name, BACKUP_MIME_TYPE, &json)
            }
            Action::Tab(id) => {
                nav::switch_tab(session.borrow().document().inner(), &id);
                Ok(())
            }
            Action::SubTab(id) => {
                nav::switch_sub_tab(session.borrow().document().inner(), &id);
                Ok(())
            }
        }
    }

    fn setup_import(document: &web_sys::Document, session: SharedSession) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            if input.get_attribute(ACTION_ATTRIBUTE).as_deref() != Some(IMPORT_ACTION) {
                return;
            }
            let Some(selected) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            // Allow picking the same file again
            input.set_value("");

            let session = session.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let text = match file::read_text(selected).await {
                    Ok(text) => text,
                    Err(e) => {
                        log::error!("{}", e);
                        file::alert(&e.to_string());
                        return;
                    }
                };

                let result = session.borrow_mut().import_json(&text);
                match result {
                    Ok(report) => {
                        log::info!("Restore wrote {} records", report.written.len());
                        file::alert("Data restored successfully! The page will reload.");
                        if let Some(window) = web_sys::window() {
                            let _ = window.location().reload();
                        }
                    }
                    Err(e) if e.is_import_rejection() => {
                        log::warn!("{}", e);
                        file::alert(&e.to_string());
                    }
                    Err(e) => {
                        log::error!("Restore stopped part way: {}", e);
                        file::alert(&format!("Restore failed: {e}"));
                    }
                }
            });
        });
        let _ = document.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_editor::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();

    match std::env::args().nth(1) {
        Some(path) => check_backup(&path),
        None => print_fresh_backup(),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Summarize a backup file against the default regions
#[cfg(not(target_arch = "wasm32"))]
fn check_backup(path: &str) -> std::process::ExitCode {
    use siridhamma_editor::{EditorConfig, Snapshot, TableContent};
    use std::process::ExitCode;

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{path}: {e}");
            return ExitCode::FAILURE;
        }
    };
    let snapshot = match Snapshot::parse(&text) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("{path}: {e}");
            return ExitCode::FAILURE;
        }
    };
    let registry = match EditorConfig::default().registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut unreadable = 0;
    for (key, value) in snapshot.iter() {
        let status = match (registry.lookup(key), value) {
            (None, _) => "unknown key, ignored by the editor".to_string(),
            (Some(_), None) => "never saved".to_string(),
            (Some(region), Some(markup)) if region.is_table() => match TableContent::from_markup(markup) {
                Ok(table) => format!("{} rows", table.row_count()),
                Err(e) => {
                    unreadable += 1;
                    format!("unreadable: {e}")
                }
            },
            (Some(_), Some(markup)) => format!("{} bytes", markup.len()),
        };
        println!("{key}: {status}");
    }

    let missing: Vec<_> = registry.ids().filter(|id| !snapshot.contains_key(id)).collect();
    if !missing.is_empty() {
        println!("not in backup: {}", missing.join(", "));
    }

    if unreadable > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Hydrate an empty page in memory and print the backup it would export
#[cfg(not(target_arch = "wasm32"))]
fn print_fresh_backup() -> std::process::ExitCode {
    use siridhamma_editor::{
        EditorConfig, EditorResult, EditorSession, MemoryDocument, MemoryStorage, SystemClock,
    };
    use std::process::ExitCode;

    let run = || -> EditorResult<String> {
        let mut session = EditorSession::from_config(
            &EditorConfig::default(),
            MemoryStorage::new(),
            MemoryDocument::siridhamma_page(),
            SystemClock,
        )?;
        let report = session.hydrate()?;
        log::info!("Seeded {:?}", report.seeded);
        session.export_json()
    };

    match run() {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
