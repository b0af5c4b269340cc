use super::Session;
use crate::filter::{FilterInput, FilterKind, FilterSnapshot};

/// Apply or update a filter.
/// Returns Ok with success message or Err with error message.
pub async fn apply_filter(session: &mut Session, kind: FilterKind, input: FilterInput) -> Result<String, String> {
    let was_active = session.registry().is_active(kind);
    match session.apply(kind, input).await {
        Ok(view) => {
            let verb = if was_active { "updated" } else { "applied" };
            Ok(format!("Filter {} {} ({} records visible)", kind, verb, view.visible))
        }
        Err(e) => Err(format!("{}: {}", kind, e)),
    }
}

/// Remove an active filter. Removing an inactive filter is reported, not recomputed.
pub async fn remove_filter(session: &mut Session, kind: FilterKind) -> Result<String, String> {
    match session.remove(kind).await {
        Ok(Some(view)) => Ok(format!("Filter {} removed ({} records visible)", kind, view.visible)),
        Ok(None) => Err(format!("Filter {} is not active", kind)),
        Err(e) => Err(format!("Failed to remove {}: {}", kind, e)),
    }
}

/// Remove a single thread ID from the ThreadId filter
pub async fn remove_tid(session: &mut Session, tid: u64) -> Result<String, String> {
    match session.remove_thread_id(tid).await {
        Ok(view) => {
            let remaining = session.registry().filter(FilterKind::ThreadId).thread_ids();
            if remaining.is_empty() {
                Ok(format!("TID {} removed, ThreadId filter cleared ({} records visible)", tid, view.visible))
            } else {
                Ok(format!("TID {} removed ({} records visible)", tid, view.visible))
            }
        }
        Err(e) => Err(e.to_string()),
    }
}

/// Clear all filters. Returns the number of filters that were active.
pub async fn clear_filters(session: &mut Session) -> Result<usize, String> {
    let count = session.snapshot().active_count();
    match session.clear_all().await {
        Ok(_) => Ok(count),
        Err(e) => Err(format!("Failed to clear filters: {}", e)),
    }
}

/// Format the list of active filters for display.
/// Returns None if there are no active filters, otherwise returns a formatted string.
pub fn list_filters(snapshot: &FilterSnapshot) -> Option<String> {
    let parts: Vec<String> = snapshot
        .filters
        .iter()
        .filter_map(|status| status.criteria().map(|c| format!("{}: {}", status.kind, c)))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(format!("Filters: {}", parts.join(", ")))
    }
}

/// Hover text for one filter
pub fn tooltip(snapshot: &FilterSnapshot, kind: FilterKind) -> String {
    snapshot
        .status(kind)
        .map(|status| status.tooltip())
        .unwrap_or_else(|| "This filter is inactive".to_string())
}

/// Field names and choices for a filter, one line per field
pub fn describe_fields(session: &Session, kind: FilterKind) -> Vec<String> {
    let filter = session.registry().filter(kind);
    filter
        .value_options()
        .iter()
        .map(|opt| {
            let current = filter.selection(&opt.name).map(|c| format!(" (current: {})", c)).unwrap_or_default();
            if opt.is_free_form() {
                format!("{}: <integer>{}", opt.name, current)
            } else {
                format!("{}: {}{}", opt.name, opt.choices.join(" | "), current)
            }
        })
        .collect()
}
