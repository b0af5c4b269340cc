pub mod filter;
pub mod logs;

use crate::display::ConsoleDisplay;
use crate::log::InMemoryDataset;
use crate::session::FilterSession;

/// The session the command front end drives
pub type Session = FilterSession<InMemoryDataset, ConsoleDisplay>;
