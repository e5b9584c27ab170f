//! Siridhamma editor - persistence for an editable school records page
//!
//! Core modules:
//! - `store`: Namespaced records over LocalStorage (or memory)
//! - `region`: Which tables and fields are persisted
//! - `content`: Typed rows/cells and the stored markup codec
//! - `document`: Page accessor used by the core (DOM on web, memory natively)
//! - `session`: Hydration, change capture and the row factory
//! - `persistence`: JSON backup export/import
//! - `platform`: Browser glue (storage, DOM, files, tabs)

pub mod clock;
pub mod config;
pub mod content;
pub mod document;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod region;
pub mod session;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EditorConfig;
pub use content::{Cell, FieldContent, RegionContent, Row, TableContent};
pub use document::{Document, MemoryDocument, MemoryNode};
pub use error::{EditorError, EditorResult};
pub use persistence::{ImportReport, Snapshot};
pub use region::{RegionDescriptor, RegionKind, RegionRegistry, SeedPolicy};
pub use session::{EditorSession, HydrationReport};
pub use store::{KeyValueStore, MemoryStorage, RecordStore};
