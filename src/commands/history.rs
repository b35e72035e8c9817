use std::fmt::Write;

use super::analyze::render_result;
use crate::history::HistoryStore;
use crate::models::HistoryEntry;

/// Longest symptom preview shown in the history list.
const PREVIEW_CHARS: usize = 60;

pub fn list_history(store: &HistoryStore) -> Vec<HistoryEntry> {
    store.read_all()
}

pub fn get_history_entry(store: &HistoryStore, id: &str) -> Result<HistoryEntry, String> {
    store
        .read_by_id(id)
        .ok_or_else(|| format!("No analysis with id {id} in history"))
}

pub fn delete_history_entry(store: &HistoryStore, id: &str) -> Result<(), String> {
    if store.delete_by_id(id) {
        tracing::info!(id = %id, "History entry deleted");
        Ok(())
    } else {
        Err(format!("No analysis with id {id} in history"))
    }
}

pub fn clear_history(store: &HistoryStore) {
    store.delete_all();
    tracing::info!("History cleared");
}

/// One line per entry, newest first.
pub fn render_history_list(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No past analyses.\n".into();
    }

    let mut out = String::new();
    for entry in entries {
        let top = entry
            .result
            .top_condition()
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        let _ = writeln!(
            out,
            "{}  {}  severity {}  {}  \"{}\"",
            entry.id,
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.result.severity.level(),
            top,
            preview(&entry.symptom_text)
        );
    }
    out
}

pub fn render_history_entry(entry: &HistoryEntry) -> String {
    format!(
        "Analysis {} ({})\nSymptoms: {}\n\n{}",
        entry.id,
        entry.timestamp.to_rfc3339(),
        entry.symptom_text,
        render_result(&entry.result)
    )
}

fn preview(text: &str) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= PREVIEW_CHARS {
        single_line
    } else {
        let cut: String = single_line.chars().take(PREVIEW_CHARS - 1).collect();
        format!("{cut}…")
    }
}
