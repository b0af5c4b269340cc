use super::Session;
use crate::log::{ClusterCoord, LogRecord};

/// One display line for a record
pub fn format_record(record: &LogRecord) -> String {
    let io = record.io.map(|io| io.as_str()).unwrap_or("-");
    format!(
        "{:>10} tid={:<5} {} {}/{} {:<3} {}",
        record.timestamp, record.tid, record.cluster, record.area, record.unit, io, record.packet
    )
    .trim_end()
    .to_string()
}

/// The last `limit` visible records
pub async fn tail_logs(session: &Session, limit: usize) -> Vec<String> {
    let dataset = session.worker().dataset();
    let dataset = dataset.lock().await;
    dataset.visible_tail(limit).into_iter().map(format_record).collect()
}

/// Visible records of one cluster, for its log window
pub async fn component_logs(session: &Session, coord: &ClusterCoord) -> Vec<String> {
    let dataset = session.worker().dataset();
    let dataset = dataset.lock().await;
    let records = dataset.component_logs(coord);
    if records.is_empty() {
        return vec![format!("{} Logs: Empty", coord)];
    }
    let mut lines = vec![format!("{} Logs ({} records)", coord, records.len())];
    lines.extend(records.into_iter().map(format_record));
    lines
}

/// Thread IDs that can still be picked under the current non-ThreadId filters
pub async fn selectable_tids(session: &Session) -> String {
    let dataset = session.worker().dataset();
    let dataset = dataset.lock().await;
    let tids: Vec<String> = dataset.selectable_thread_ids().iter().map(|t| t.to_string()).collect();
    if tids.is_empty() {
        "No selectable thread IDs".to_string()
    } else {
        format!("Selectable TIDs: {}", tids.join(", "))
    }
}
