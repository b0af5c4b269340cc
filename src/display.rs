use chrono::Local;

use crate::filter::FilterSnapshot;
use crate::log::FilteredView;
use crate::session::Presenter;

/// Kind of status message shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    Success,
    Error,
    Info,
}

impl StatusType {
    fn prefix(self) -> &'static str {
        match self {
            StatusType::Success => "ok",
            StatusType::Error => "error",
            StatusType::Info => "info",
        }
    }
}

/// Line-oriented presenter: buffers output for the front end to flush
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    /// Print the snapshot as JSON after each refresh
    pub json: bool,
    /// Status message to show to the user (message, type)
    pub status_message: Option<(String, StatusType)>,
    /// Number of refreshes so far
    pub refresh_count: usize,
    pub last_snapshot: Option<FilterSnapshot>,
    pub last_view: Option<FilteredView>,
    output: Vec<String>,
}

impl ConsoleDisplay {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            ..Self::default()
        }
    }

    pub fn set_status_success(&mut self, message: String) {
        self.status_message = Some((message, StatusType::Success));
    }

    pub fn set_status_error(&mut self, message: String) {
        self.status_message = Some((message, StatusType::Error));
    }

    pub fn set_status_info(&mut self, message: String) {
        self.status_message = Some((message, StatusType::Info));
    }

    pub fn print(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    /// Drain buffered lines, with the pending status message last
    pub fn take_output(&mut self) -> Vec<String> {
        let mut lines = std::mem::take(&mut self.output);
        if let Some((message, status)) = self.status_message.take() {
            lines.push(format!("[{}] {}", status.prefix(), message));
        }
        lines
    }
}

impl Presenter for ConsoleDisplay {
    fn refresh_display(&mut self, snapshot: &FilterSnapshot, view: &FilteredView) {
        self.refresh_count += 1;

        let active: Vec<String> = snapshot.active_kinds().iter().map(|k| k.to_string()).collect();
        let filters = if active.is_empty() {
            "none".to_string()
        } else {
            active.join(", ")
        };
        self.print(format!(
            "[{}] {}/{} records visible | filters: {}",
            Local::now().format("%H:%M:%S"),
            view.visible,
            view.total,
            filters
        ));

        if self.json {
            match serde_json::to_string(snapshot) {
                Ok(json) => self.print(json),
                Err(e) => self.set_status_error(format!("Failed to encode snapshot: {}", e)),
            }
        }

        self.last_snapshot = Some(snapshot.clone());
        self.last_view = Some(view.clone());
    }
}
