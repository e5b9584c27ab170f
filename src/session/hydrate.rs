//! Startup hydration
//!
//! Runs once per page load, before edits are captured. Stored records win;
//! tables without a record get their seed rows, fields keep their authored
//! text.

use super::EditorSession;
use crate::clock::Clock;
use crate::content::FieldContent;
use crate::document::Document;
use crate::error::{EditorError, EditorResult};
use crate::region::SeedPolicy;
use crate::store::KeyValueStore;

/// What hydration did to each region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrationReport {
    /// Regions replaced from a stored record
    pub restored: Vec<String>,
    /// Tables seeded with rows (id, row count)
    pub seeded: Vec<(String, usize)>,
    /// Regions without stored content, left as authored
    pub untouched: Vec<String>,
    /// Registered ids with no element in the page
    pub missing: Vec<String>,
    /// Tables whose stored record could not be decoded
    pub undecodable: Vec<String>,
}

impl<S, D, C> EditorSession<S, D, C>
where
    S: KeyValueStore,
    D: Document,
    C: Clock,
{
    /// Load every registered region from storage or apply its default.
    ///
    /// Stored table records are installed as stored. A record the page cannot
    /// show leaves the authored rows in place and holds the table, so later
    /// edits do not overwrite the record.
    ///
    /// An empty stored string counts as a record: an emptied table stays empty
    /// and an emptied field stays empty. The older page treated `""` like a
    /// missing record and re-applied the seed rows or authored text.
    pub fn hydrate(&mut self) -> EditorResult<HydrationReport> {
        if self.hydrated {
            return Err(EditorError::AlreadyHydrated);
        }

        let mut report = HydrationReport::default();

        let tables: Vec<(String, SeedPolicy)> = self
            .registry
            .tables()
            .map(|(id, seed)| (id.to_string(), seed))
            .collect();
        for (id, seed) in tables {
            self.hydrate_table(&id, seed, &mut report)?;
        }

        let fields: Vec<String> = self.registry.fields().map(str::to_string).collect();
        for id in fields {
            self.hydrate_field(&id, &mut report)?;
        }

        self.hydrated = true;
        log::info!(
            "Hydrated {} regions ({} restored, {} seeded, {} missing)",
            self.registry.len(),
            report.restored.len(),
            report.seeded.len(),
            report.missing.len()
        );
        Ok(report)
    }

    fn hydrate_table(&mut self, id: &str, seed: SeedPolicy, report: &mut HydrationReport) -> EditorResult<()> {
        if !self.document.mark_region(id) {
            log::debug!("Table {} not in page, skipping", id);
            report.missing.push(id.to_string());
            return Ok(());
        }

        match self.store.get(id)? {
            Some(record) => match self.document.restore_table(id, &record) {
                Ok(_) => report.restored.push(id.to_string()),
                Err(e) => {
                    log::warn!("Stored rows for {} are unreadable, keeping page content: {}", id, e);
                    report.undecodable.push(id.to_string());
                    self.held.insert(id.to_string());
                }
            },
            None => {
                let count = seed.row_count();
                for _ in 0..count {
                    self.add_row(id)?;
                }
                if count > 0 {
                    report.seeded.push((id.to_string(), count));
                } else {
                    report.untouched.push(id.to_string());
                }
            }
        }
        Ok(())
    }

    fn hydrate_field(&mut self, id: &str, report: &mut HydrationReport) -> EditorResult<()> {
        if !self.document.mark_region(id) {
            log::debug!("Field {} not in page, skipping", id);
            report.missing.push(id.to_string());
            return Ok(());
        }

        match self.store.get(id)? {
            Some(record) => {
                self.document.replace_field(id, &FieldContent::new(record));
                report.restored.push(id.to_string());
            }
            None => report.untouched.push(id.to_string()),
        }
        Ok(())
    }
}
