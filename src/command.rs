use anyhow::Result;

use crate::filter::{FilterInput, FilterKind};
use crate::log::ClusterCoord;
use crate::operations::{Session, filter, logs};

const DEFAULT_LOG_LIMIT: usize = 20;

/// Command parsed from user input
#[derive(Debug, PartialEq)]
pub enum Command {
    Quit,
    Help,
    /// Apply or update a filter with `field=value` arguments
    /// (a bare value is allowed for single-field filters)
    Filter(FilterKind, Vec<String>),
    AddTid(String),
    RemoveTid(u64),
    Remove(FilterKind),
    FilterClear,
    FilterList,
    Menu,
    Tooltip(FilterKind),
    Fields(FilterKind),
    Tids,
    Logs(usize),
    Component(ClusterCoord),
    Unknown(String),
}

/// Parse a command from user input (a leading ':' is ignored)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let input = input.strip_prefix(':').unwrap_or(input);

    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.is_empty() {
        return Command::Unknown("Empty command".to_string());
    }

    match parts[0] {
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" | "?" => Command::Help,
        "f" | "filter" => {
            if parts.len() < 3 {
                return Command::Unknown("Usage: :f <filter> <field=value>...".to_string());
            }
            match parts[1].parse::<FilterKind>() {
                Ok(FilterKind::ThreadId) if parts.len() > 3 => {
                    Command::Unknown("Usage: :f tid <thread_id> (one ID at a time)".to_string())
                }
                Ok(FilterKind::ThreadId) => Command::AddTid(parts[2].to_string()),
                Ok(kind) => Command::Filter(kind, parts[2..].iter().map(|s| s.to_string()).collect()),
                Err(e) => Command::Unknown(e.to_string()),
            }
        }
        "tid" => {
            if parts.len() != 2 {
                Command::Unknown("Usage: :tid <thread_id>".to_string())
            } else {
                Command::AddTid(parts[1].to_string())
            }
        }
        "untid" => {
            if parts.len() != 2 {
                return Command::Unknown("Usage: :untid <thread_id>".to_string());
            }
            match parts[1].parse::<u64>() {
                Ok(tid) => Command::RemoveTid(tid),
                Err(_) => Command::Unknown("Thread ID must be a valid number".to_string()),
            }
        }
        "rm" => parse_kind_arg(&parts, "rm", Command::Remove),
        "tip" => parse_kind_arg(&parts, "tip", Command::Tooltip),
        "fields" => parse_kind_arg(&parts, "fields", Command::Fields),
        "fc" => Command::FilterClear,
        "fl" => Command::FilterList,
        "menu" => Command::Menu,
        "tids" => Command::Tids,
        "logs" => {
            if parts.len() < 2 {
                return Command::Logs(DEFAULT_LOG_LIMIT);
            }
            match parts[1].parse::<usize>() {
                Ok(n) if n > 0 => Command::Logs(n),
                Ok(_) => Command::Unknown("Log count must be positive".to_string()),
                Err(_) => Command::Unknown("Log count must be a valid number".to_string()),
            }
        }
        "cluster" => {
            if parts.len() < 2 {
                return Command::Unknown("Usage: :cluster chip:die:quad:row:col".to_string());
            }
            match parts[1].parse::<ClusterCoord>() {
                Ok(coord) => Command::Component(coord),
                Err(e) => Command::Unknown(e.to_string()),
            }
        }
        _ => Command::Unknown(format!("Unknown command: {}", parts[0])),
    }
}

fn parse_kind_arg(parts: &[&str], name: &str, make: fn(FilterKind) -> Command) -> Command {
    if parts.len() < 2 {
        return Command::Unknown(format!("Usage: :{} <filter>", name));
    }
    match parts[1].parse::<FilterKind>() {
        Ok(kind) => make(kind),
        Err(e) => Command::Unknown(e.to_string()),
    }
}

/// Turn `field=value` arguments into a selection.
/// A lone bare value is accepted when the filter has exactly one field.
pub fn selection_from_args(field_names: &[String], args: &[String]) -> Result<FilterInput, String> {
    if let [value] = args {
        if !value.contains('=') {
            return match field_names {
                [field] => Ok(FilterInput::selection([(field.clone(), value.clone())])),
                _ => Err(format!("Expected field=value pairs for: {}", field_names.join(", "))),
            };
        }
    }

    let mut pairs = Vec::with_capacity(args.len());
    for arg in args {
        match arg.split_once('=') {
            Some((field, value)) if !field.is_empty() => pairs.push((field.to_string(), value.to_string())),
            _ => return Err(format!("Expected field=value, got '{}'", arg)),
        }
    }
    Ok(FilterInput::Selection(pairs))
}

pub const HELP_TEXT: &str = "\
Commands:
  f <filter> <field=value>...   apply or update a filter (bare value for IO/Area/Unit)
  tid <n>                       add a thread ID to the ThreadId filter
  untid <n>                     remove one thread ID
  rm <filter>                   remove a filter
  fc                            clear all filters
  fl                            list active filters
  menu                          show the filter menu
  tip <filter>                  describe what a filter is doing
  fields <filter>               show a filter's fields and choices
  tids                          thread IDs selectable under the current filters
  logs [n]                      show the last n visible records
  cluster chip:die:quad:row:col show one cluster's logs
  q                             quit";

/// Command executor that handles command execution
pub struct CommandExecutor<'a> {
    session: &'a mut Session,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Run one command. Returns true when the user asked to quit.
    pub async fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Quit => return Ok(true),
            Command::Help => self.print_lines(HELP_TEXT.lines().map(str::to_string).collect()),
            Command::Filter(kind, args) => self.execute_filter(kind, args).await,
            Command::AddTid(text) => {
                let result = filter::apply_filter(self.session, FilterKind::ThreadId, FilterInput::tid(text)).await;
                self.set_status(result);
            }
            Command::RemoveTid(tid) => {
                let result = filter::remove_tid(self.session, tid).await;
                self.set_status(result);
            }
            Command::Remove(kind) => {
                let result = filter::remove_filter(self.session, kind).await;
                self.set_status(result);
            }
            Command::FilterClear => match filter::clear_filters(self.session).await {
                Ok(count) => self
                    .display()
                    .set_status_success(format!("Cleared {} filter(s)", count)),
                Err(msg) => self.display().set_status_error(msg),
            },
            Command::FilterList => {
                let message = filter::list_filters(&self.session.snapshot())
                    .unwrap_or_else(|| "No active filters".to_string());
                self.display().set_status_info(message);
            }
            Command::Menu => {
                let menu = self.session.snapshot().render_menu();
                self.print_lines(menu.lines().map(str::to_string).collect());
            }
            Command::Tooltip(kind) => {
                let text = filter::tooltip(&self.session.snapshot(), kind);
                self.display().set_status_info(text);
            }
            Command::Fields(kind) => {
                let lines = filter::describe_fields(self.session, kind);
                self.print_lines(lines);
            }
            Command::Tids => {
                let text = logs::selectable_tids(self.session).await;
                self.display().set_status_info(text);
            }
            Command::Logs(limit) => {
                let lines = logs::tail_logs(self.session, limit).await;
                if lines.is_empty() {
                    self.display().set_status_info("No visible records".to_string());
                }
                self.print_lines(lines);
            }
            Command::Component(coord) => {
                let lines = logs::component_logs(self.session, &coord).await;
                self.print_lines(lines);
            }
            Command::Unknown(msg) => {
                self.display().set_status_error(format!("Error: {}", msg));
            }
        }
        Ok(false)
    }

    async fn execute_filter(&mut self, kind: FilterKind, args: Vec<String>) {
        let field_names: Vec<String> = self
            .session
            .registry()
            .filter(kind)
            .value_options()
            .iter()
            .map(|opt| opt.name.clone())
            .collect();
        let result = match selection_from_args(&field_names, &args) {
            Ok(input) => filter::apply_filter(self.session, kind, input).await,
            Err(msg) => Err(msg),
        };
        self.set_status(result);
    }

    fn set_status(&mut self, result: Result<String, String>) {
        match result {
            Ok(msg) => self.display().set_status_success(msg),
            Err(msg) => self.display().set_status_error(msg),
        }
    }

    fn print_lines(&mut self, lines: Vec<String>) {
        let display = self.display();
        for line in lines {
            display.print(line);
        }
    }

    fn display(&mut self) -> &mut crate::display::ConsoleDisplay {
        self.session.presenter_mut()
    }
}
