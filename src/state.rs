use crate::data::compare::{compare, Comparison, CompareOptions};
use crate::data::loader::Fingerprint;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which of the two input slots a file lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

/// A loaded input file: the parsed dataset plus the identity used for result
/// caching. The fingerprint carries the source path, so nothing else needs to.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub dataset: Dataset,
    pub fingerprint: Fingerprint,
}

/// Key the cached comparison was computed under. Either input changing its
/// fingerprint, or the rounding setting changing, makes the key stale.
#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    first: Fingerprint,
    second: Fingerprint,
    options: CompareOptions,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// First input slot (None until the user opens a file).
    pub first: Option<LoadedFile>,

    /// Second input slot.
    pub second: Option<LoadedFile>,

    /// Rounding tolerance for the next comparison.
    pub options: CompareOptions,

    /// Last computed comparison, kept until its inputs change.
    pub comparison: Option<Comparison>,

    /// Inputs the cached comparison belongs to.
    cache_key: Option<CacheKey>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            first: None,
            second: None,
            options: CompareOptions::default(),
            comparison: None,
            cache_key: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded file into a slot, evicting the cached
    /// comparison if the inputs no longer match what it was computed from.
    pub fn set_file(&mut self, slot: Slot, file: LoadedFile) {
        match slot {
            Slot::First => self.first = Some(file),
            Slot::Second => self.second = Some(file),
        }
        self.evict_if_stale();
        self.status_message = None;
    }

    /// Change the rounding tolerance; a different tolerance invalidates the
    /// cached comparison.
    pub fn set_decimals(&mut self, decimals: u32) {
        if self.options.decimals != decimals {
            self.options.decimals = decimals;
            self.evict_if_stale();
        }
    }

    pub fn ready_to_compare(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    /// Run the comparison for the current pair of inputs. Re-running on an
    /// unchanged pair is a cache hit and leaves the existing result in place.
    pub fn run_compare(&mut self) {
        let (Some(first), Some(second)) = (&self.first, &self.second) else {
            return;
        };

        let key = CacheKey {
            first: first.fingerprint.clone(),
            second: second.fingerprint.clone(),
            options: self.options,
        };

        if self.comparison.is_some() && self.cache_key.as_ref() == Some(&key) {
            return;
        }

        let result = compare(&first.dataset, &second.dataset, self.options);
        log::info!(
            "compared {} ({} rows) against {} ({} rows): {} / {} orphan cells",
            first.dataset.name,
            first.dataset.row_count(),
            second.dataset.name,
            second.dataset.row_count(),
            result.first.flagged_count(),
            result.second.flagged_count(),
        );
        self.comparison = Some(result);
        self.cache_key = Some(key);
    }

    fn evict_if_stale(&mut self) {
        let stale = match (&self.cache_key, &self.first, &self.second) {
            (Some(key), Some(first), Some(second)) => {
                key.first != first.fingerprint
                    || key.second != second.fingerprint
                    || key.options != self.options
            }
            (Some(_), _, _) => true,
            (None, _, _) => false,
        };
        if stale {
            self.comparison = None;
            self.cache_key = None;
        }
    }
}
