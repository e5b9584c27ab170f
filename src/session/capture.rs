//! Change capture
//!
//! A single delegated `input` listener feeds every edit here. The edited
//! node is resolved to its tagged region and that region's full content is
//! written back; there is no diffing, batching or throttling.

use super::EditorSession;
use crate::clock::Clock;
use crate::document::Document;
use crate::error::EditorResult;
use crate::store::KeyValueStore;

impl<S, D, C> EditorSession<S, D, C>
where
    S: KeyValueStore,
    D: Document,
    C: Clock,
{
    /// Handle one edit event. Returns the id of the region that was saved.
    pub fn handle_edit(&mut self, target: &D::Node) -> EditorResult<Option<String>> {
        if !self.hydrated {
            log::debug!("Edit before hydration ignored");
            return Ok(None);
        }

        let Some(id) = self.document.owning_region(target) else {
            return Ok(None);
        };

        if self.save_region(&id)? {
            Ok(Some(id))
        } else {
            Ok(None)
        }
    }
}
