use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

use super::storage::KeyValueStorage;
use super::StorageError;
use crate::models::{AnalysisResult, HistoryEntry};

/// Maximum number of analyses kept; older ones are dropped.
pub const MAX_ENTRIES: usize = 10;

/// Storage slot holding the serialized history list.
pub const HISTORY_SLOT: &str = "symptom_history";

const ID_SUFFIX_LEN: usize = 9;

/// CRUD over the bounded analysis history.
///
/// History is a convenience: storage failures are logged and swallowed,
/// never returned. Writers in other processes are not coordinated; the last
/// write wins.
pub struct HistoryStore {
    storage: Box<dyn KeyValueStorage>,
    slot: String,
}

impl HistoryStore {
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self::with_slot(storage, HISTORY_SLOT)
    }

    pub fn with_slot(storage: Box<dyn KeyValueStorage>, slot: &str) -> Self {
        Self {
            storage,
            slot: slot.to_string(),
        }
    }

    /// Record a completed analysis as the newest entry.
    ///
    /// Returns the stored entry, or `None` when storage was unavailable, the
    /// write failed, or the existing payload is corrupt (left untouched).
    pub fn create(&self, symptom_text: &str, result: &AnalysisResult) -> Option<HistoryEntry> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(reason) => {
                tracing::warn!(reason = %reason, "History unreadable, not recording analysis");
                return None;
            }
        };

        let entry = HistoryEntry {
            id: generate_entry_id(),
            timestamp: Utc::now(),
            symptom_text: symptom_text.to_string(),
            result: result.clone(),
        };

        entries.insert(0, entry.clone());
        entries.truncate(MAX_ENTRIES);

        match self.persist(&entries) {
            Ok(()) => {
                tracing::debug!(id = %entry.id, entries = entries.len(), "Analysis recorded");
                Some(entry)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to write history, analysis not recorded");
                None
            }
        }
    }

    /// All entries, newest first. Absent or corrupt history reads as empty.
    pub fn read_all(&self) -> Vec<HistoryEntry> {
        self.load().unwrap_or_else(|reason| {
            tracing::warn!(reason = %reason, "History unreadable, treating as empty");
            Vec::new()
        })
    }

    pub fn read_by_id(&self, id: &str) -> Option<HistoryEntry> {
        self.read_all().into_iter().find(|entry| entry.id == id)
    }

    /// Remove one entry. Returns whether an entry was actually removed; the
    /// slot is not rewritten when nothing matches.
    pub fn delete_by_id(&self, id: &str) -> bool {
        let mut entries = self.read_all();
        let Some(position) = entries.iter().position(|entry| entry.id == id) else {
            return false;
        };
        entries.remove(position);

        match self.persist(&entries) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to write history after delete");
                false
            }
        }
    }

    /// Clear the whole history. Idempotent; never fails.
    pub fn delete_all(&self) {
        if let Err(e) = self.storage.remove(&self.slot) {
            tracing::warn!(error = %e, "Failed to clear history");
        }
    }

    pub fn len(&self) -> usize {
        self.read_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load(&self) -> Result<Vec<HistoryEntry>, LoadFailure> {
        let Some(payload) = self.storage.get(&self.slot).map_err(LoadFailure::Storage)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&payload).map_err(LoadFailure::Corrupt)
    }

    fn persist(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        let payload = serde_json::to_string(entries)
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        self.storage.set(&self.slot, &payload)
    }
}

#[derive(Debug)]
enum LoadFailure {
    Storage(StorageError),
    Corrupt(serde_json::Error),
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage error: {e}"),
            Self::Corrupt(e) => write!(f, "corrupt payload: {e}"),
        }
    }
}

/// Millisecond timestamp plus a random suffix, so two entries created in the
/// same millisecond still get distinct ids.
fn generate_entry_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::storage::failing::{ReadOnlyStorage, UnavailableStorage};
    use crate::history::storage::{FileStorage, MemoryStorage};
    use crate::models::{Condition, Severity};

    fn result(label: &str) -> AnalysisResult {
        AnalysisResult {
            summary: format!("Summary for {label}"),
            conditions: vec![Condition::new(label, "desc").with_probability(50.0)],
            severity: Severity::Mild,
            recommendations: vec!["Rest".into()],
            requires_attention: false,
            disclaimer: "Not medical advice".into(),
        }
    }

    fn memory_store() -> HistoryStore {
        HistoryStore::new(Box::new(MemoryStorage::new()))
    }

    #[test]
    fn empty_store_reads_empty() {
        let store = memory_store();
        assert!(store.read_all().is_empty());
        assert!(store.is_empty());
        assert_eq!(store.read_by_id("missing"), None);
    }

    #[test]
    fn create_then_read_by_id_is_deep_equal() {
        let store = memory_store();
        let created = store.create("headache", &result("Migraine")).unwrap();
        let read = store.read_by_id(&created.id).unwrap();
        assert_eq!(read, created);
        assert_eq!(read.symptom_text, "headache");
        assert_eq!(read.result, result("Migraine"));
    }

    #[test]
    fn scaled_provider_probabilities_survive_storage() {
        use crate::pipeline::analysis::{normalize_provider_analysis, parse_provider_reply};

        let store = memory_store();
        for raw in ["0.011", "0.014", "0.037", "0.074", "0.097", "0.101", "0.333"] {
            let reply = format!(
                r#"{{"possibleConditions": [{{"name": "Tension headache", "probability": {raw}, "description": "d"}}],
                  "urgencyLevel": "low", "recommendations": [], "requiresAttention": false, "disclaimer": ""}}"#
            );
            let analysis = normalize_provider_analysis(parse_provider_reply(&reply).unwrap());
            let created = store.create("headache", &analysis).unwrap();
            let read = store.read_by_id(&created.id).unwrap();
            assert_eq!(read, created, "probability {raw} changed in storage");
        }
    }

    #[test]
    fn eleven_creates_keep_ten_newest_first() {
        let store = memory_store();
        let mut ids = Vec::new();
        for i in 1..=11 {
            let entry = store
                .create(&format!("symptoms {i}"), &result(&format!("C{i}")))
                .unwrap();
            ids.push(entry.id);
        }

        let all = store.read_all();
        assert_eq!(all.len(), MAX_ENTRIES);
        assert_eq!(all[0].id, ids[10]);
        assert_eq!(all[0].symptom_text, "symptoms 11");
        assert_eq!(all[9].symptom_text, "symptoms 2");
        assert!(all.iter().all(|e| e.id != ids[0]));
    }

    #[test]
    fn ordering_is_newest_first() {
        let store = memory_store();
        store.create("first", &result("A")).unwrap();
        store.create("second", &result("B")).unwrap();
        store.create("third", &result("C")).unwrap();
        let texts: Vec<String> = store.read_all().into_iter().map(|e| e.symptom_text).collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
    }

    #[test]
    fn ids_are_unique_in_tight_loop() {
        let store = memory_store();
        let mut ids: Vec<String> = (0..MAX_ENTRIES)
            .map(|_| store.create("same", &result("Same")).unwrap().id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), MAX_ENTRIES);
    }

    #[test]
    fn generated_id_has_timestamp_and_suffix() {
        let id = generate_entry_id();
        let (millis, suffix) = id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
    }

    #[test]
    fn delete_nonexistent_leaves_slot_unchanged() {
        let store = memory_store();
        store.create("a", &result("A")).unwrap();
        store.create("b", &result("B")).unwrap();
        let entries_before = store.read_all();
        let raw_before = store.storage.get(HISTORY_SLOT).unwrap();

        assert!(!store.delete_by_id("no-such-id"));
        assert_eq!(store.read_all(), entries_before);
        assert_eq!(store.storage.get(HISTORY_SLOT).unwrap(), raw_before);
    }

    #[test]
    fn delete_existing_removes_only_that_entry() {
        let store = memory_store();
        let a = store.create("a", &result("A")).unwrap();
        let b = store.create("b", &result("B")).unwrap();
        let c = store.create("c", &result("C")).unwrap();

        assert!(store.delete_by_id(&b.id));
        let ids: Vec<String> = store.read_all().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![c.id, a.id]);
        assert!(!store.delete_by_id(&b.id));
    }

    #[test]
    fn delete_all_twice_never_fails() {
        let store = memory_store();
        store.create("a", &result("A")).unwrap();
        store.delete_all();
        assert!(store.read_all().is_empty());
        store.delete_all();
        assert!(store.read_all().is_empty());
    }

    #[test]
    fn corrupt_payload_reads_as_empty() {
        let store = HistoryStore::new(Box::new(ReadOnlyStorage::with_payload(
            HISTORY_SLOT,
            "{not json",
        )));
        assert!(store.read_all().is_empty());
        assert_eq!(store.read_by_id("anything"), None);
    }

    #[test]
    fn create_over_corrupt_payload_is_noop() {
        let storage = MemoryStorage::new();
        storage.set(HISTORY_SLOT, "[{\"broken\":").unwrap();
        let store = HistoryStore::new(Box::new(storage));

        assert!(store.create("headache", &result("A")).is_none());
        assert_eq!(
            store.storage.get(HISTORY_SLOT).unwrap().as_deref(),
            Some("[{\"broken\":")
        );
    }

    #[test]
    fn write_failure_is_swallowed() {
        let store = HistoryStore::new(Box::new(ReadOnlyStorage::empty()));
        assert!(store.create("headache", &result("A")).is_none());
        assert!(store.read_all().is_empty());
        store.delete_all();
    }

    #[test]
    fn unavailable_storage_degrades_everywhere() {
        let store = HistoryStore::new(Box::new(UnavailableStorage));
        assert!(store.create("headache", &result("A")).is_none());
        assert!(store.read_all().is_empty());
        assert_eq!(store.read_by_id("x"), None);
        assert!(!store.delete_by_id("x"));
        store.delete_all();
    }

    #[test]
    fn file_backed_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let created = {
            let store = HistoryStore::new(Box::new(FileStorage::new(dir.path())));
            store.create("cough and fever", &result("Bronchitis")).unwrap()
        };

        let reopened = HistoryStore::new(Box::new(FileStorage::new(dir.path())));
        assert_eq!(reopened.read_all(), vec![created]);
    }

    #[test]
    fn persisted_payload_uses_camel_case() {
        let storage = MemoryStorage::new();
        let store = HistoryStore::new(Box::new(storage));
        store.create("fever", &result("Flu")).unwrap();
        let raw = store.storage.get(HISTORY_SLOT).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json[0].get("symptomText").is_some());
        assert!(json[0]["result"].get("requiresAttention").is_some());
        assert!(json[0]["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn separate_slots_do_not_interfere() {
        let dir = tempfile::tempdir().unwrap();
        let first = HistoryStore::with_slot(Box::new(FileStorage::new(dir.path())), "profile_a");
        let second = HistoryStore::with_slot(Box::new(FileStorage::new(dir.path())), "profile_b");
        first.create("a", &result("A")).unwrap();
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }
}
