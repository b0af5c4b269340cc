use std::collections::{BTreeSet, HashSet};

use super::error::FilterError;
use super::kind::FilterKind;
use super::value::{Field, FieldOptions, FieldValue, FilterInput, ReadyValues};

/// Fields whose value is the index of the selected option
const INDEX_FIELDS: [&str; 3] = ["chip", "die", "quad"];
/// Fields whose value is parsed from text as an integer
const NUMERIC_FIELDS: [&str; 2] = ["row", "column"];

/// Die index on which the quad layout is rotated 180 degrees
const MIRRORED_DIE: i64 = 1;

/// Raw values as the user chose them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValues {
    /// field name -> chosen option text, in schema order
    Selection(Vec<(String, String)>),
    ThreadIds(BTreeSet<u64>),
}

impl FilterValues {
    fn empty_for(kind: FilterKind) -> Self {
        if kind.is_thread_id() {
            FilterValues::ThreadIds(BTreeSet::new())
        } else {
            FilterValues::Selection(Vec::new())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FilterValues::Selection(pairs) => pairs.is_empty(),
            FilterValues::ThreadIds(tids) => tids.is_empty(),
        }
    }
}

/// One filterable dimension: its field schema, chosen values and activation state
#[derive(Debug, Clone)]
pub struct Filter {
    kind: FilterKind,
    value_options: Vec<FieldOptions>,
    values: FilterValues,
    /// Candidate values waiting for `commit()`
    staged: Option<FilterValues>,
    ready: Option<ReadyValues>,
    is_active: bool,
}

impl Filter {
    /// Create an inert filter with a fixed field schema
    pub fn configure(kind: FilterKind, value_options: Vec<FieldOptions>) -> Result<Self, FilterError> {
        if value_options.is_empty() {
            return Err(FilterError::configuration(format!("{} has no fields", kind)));
        }

        let mut seen = HashSet::new();
        for opt in &value_options {
            if !seen.insert(opt.name.as_str()) {
                return Err(FilterError::configuration(format!(
                    "{} has duplicate field '{}'",
                    kind, opt.name
                )));
            }
            // Free-form input is reserved for thread IDs
            if kind.is_thread_id() != opt.is_free_form() {
                return Err(FilterError::configuration(format!(
                    "{} field '{}' {}",
                    kind,
                    opt.name,
                    if kind.is_thread_id() { "must be free-form" } else { "has no choices" }
                )));
            }
            // Choice positions are the coerced values, so they must be unique
            let mut choices = HashSet::new();
            if let Some(dup) = opt.choices.iter().find(|c| !choices.insert(c.as_str())) {
                return Err(FilterError::configuration(format!(
                    "{} field '{}' lists choice '{}' twice",
                    kind, opt.name, dup
                )));
            }
        }
        if kind.is_thread_id() && value_options.len() != 1 {
            return Err(FilterError::configuration("ThreadId takes exactly one field"));
        }

        Ok(Self {
            kind,
            value_options,
            values: FilterValues::empty_for(kind),
            staged: None,
            ready: None,
            is_active: false,
        })
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn value_options(&self) -> &[FieldOptions] {
        &self.value_options
    }

    pub fn values(&self) -> &FilterValues {
        &self.values
    }

    pub fn ready_for_filter(&self) -> Option<&ReadyValues> {
        self.ready.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Active thread IDs, sorted. Empty for every other kind.
    pub fn thread_ids(&self) -> Vec<u64> {
        match &self.values {
            FilterValues::ThreadIds(tids) => tids.iter().copied().collect(),
            FilterValues::Selection(_) => Vec::new(),
        }
    }

    /// The option currently chosen for `field`, used to prefill an edit form
    pub fn selection(&self, field: &str) -> Option<&str> {
        match &self.values {
            FilterValues::Selection(pairs) => pairs
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, value)| value.as_str()),
            FilterValues::ThreadIds(_) => None,
        }
    }

    /// Record candidate values without activating the filter.
    /// For ThreadId this adds one parsed ID to a copy of the active set.
    pub fn stage(&mut self, input: FilterInput) -> Result<(), FilterError> {
        let staged = match (self.kind, input) {
            (FilterKind::ThreadId, FilterInput::ThreadId(text)) => {
                let tid = parse_tid(&text)?;
                let mut tids = match &self.values {
                    FilterValues::ThreadIds(tids) => tids.clone(),
                    FilterValues::Selection(_) => BTreeSet::new(),
                };
                if !tids.insert(tid) {
                    return Err(FilterError::validation(format!("TID {} is already in the list", tid)));
                }
                FilterValues::ThreadIds(tids)
            }
            (FilterKind::ThreadId, FilterInput::Selection(_)) => {
                return Err(FilterError::validation("ThreadId expects a thread ID"));
            }
            (kind, FilterInput::ThreadId(_)) => {
                return Err(FilterError::validation(format!("{} expects a field selection", kind)));
            }
            (_, FilterInput::Selection(pairs)) => FilterValues::Selection(pairs),
        };
        self.staged = Some(staged);
        Ok(())
    }

    /// Coerce the staged values and activate the filter.
    /// On failure the staged values are dropped and the committed state is untouched.
    pub fn commit(&mut self) -> Result<(), FilterError> {
        let staged = self
            .staged
            .take()
            .ok_or_else(|| FilterError::validation(format!("No values provided for {}", self.kind)))?;

        let (values, ready) = match staged {
            FilterValues::ThreadIds(tids) => {
                if tids.is_empty() {
                    return Err(FilterError::validation("No thread IDs provided"));
                }
                let ready = ReadyValues::ThreadIds(tids.iter().copied().collect());
                (FilterValues::ThreadIds(tids), ready)
            }
            FilterValues::Selection(pairs) => {
                let (ordered, fields) = self.coerce(&pairs)?;
                (FilterValues::Selection(ordered), ReadyValues::Fields(fields))
            }
        };

        self.values = values;
        self.ready = Some(ready);
        self.is_active = true;
        Ok(())
    }

    /// Remove one thread ID; the filter goes inert once the set is empty
    pub fn deactivate_one(&mut self, tid: u64) -> Result<(), FilterError> {
        let FilterValues::ThreadIds(tids) = &mut self.values else {
            return Err(FilterError::validation(format!("{} has no thread IDs", self.kind)));
        };
        if !tids.remove(&tid) {
            return Err(FilterError::validation(format!("TID {} not found in the list", tid)));
        }
        if tids.is_empty() {
            self.reset();
        } else {
            self.ready = Some(ReadyValues::ThreadIds(tids.iter().copied().collect()));
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.values = FilterValues::empty_for(self.kind);
        self.staged = None;
        self.ready = None;
        self.is_active = false;
    }

    fn coerce(&self, pairs: &[(String, String)]) -> Result<(Vec<(String, String)>, Vec<Field>), FilterError> {
        for (name, _) in pairs {
            if !self.value_options.iter().any(|opt| &opt.name == name) {
                return Err(FilterError::validation(format!("{} has no field '{}'", self.kind, name)));
            }
        }

        let chosen = |name: &str| -> Result<&str, FilterError> {
            pairs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
                .ok_or_else(|| FilterError::validation(format!("Missing value for '{}'", name)))
        };

        // The quad rule depends on the die, whatever order the fields come in
        let die = match self.value_options.iter().find(|opt| opt.name == "die") {
            Some(opt) => Some(choice_index(opt, chosen("die")?)?),
            None => None,
        };

        let mut ordered = Vec::with_capacity(self.value_options.len());
        let mut fields = Vec::with_capacity(self.value_options.len());
        for opt in &self.value_options {
            let raw = chosen(&opt.name)?;
            let name = opt.name.as_str();
            let value = if INDEX_FIELDS.contains(&name) {
                let index = choice_index(opt, raw)?;
                if name == "quad" && die == Some(MIRRORED_DIE) {
                    FieldValue::Int(3 - index)
                } else {
                    FieldValue::Int(index)
                }
            } else if NUMERIC_FIELDS.contains(&name) {
                FieldValue::Int(parse_numeric(opt, raw)?)
            } else {
                if opt.position(raw).is_none() {
                    return Err(unknown_choice(opt, raw));
                }
                FieldValue::Text(raw.to_string())
            };
            ordered.push((opt.name.clone(), raw.to_string()));
            fields.push(Field {
                name: opt.name.clone(),
                value,
            });
        }
        Ok((ordered, fields))
    }
}

fn choice_index(opt: &FieldOptions, raw: &str) -> Result<i64, FilterError> {
    opt.position(raw)
        .map(|i| i as i64)
        .ok_or_else(|| unknown_choice(opt, raw))
}

fn parse_numeric(opt: &FieldOptions, raw: &str) -> Result<i64, FilterError> {
    let text = raw.trim();
    let n = text.parse::<i64>().map_err(|_| {
        FilterError::validation(format!("{} must be an integer, got '{}'", opt.name, raw))
    })?;
    if !opt.is_free_form() && !opt.choices.iter().any(|c| c.parse::<i64>().ok() == Some(n)) {
        return Err(unknown_choice(opt, raw));
    }
    Ok(n)
}

fn parse_tid(text: &str) -> Result<u64, FilterError> {
    text.trim()
        .parse::<u64>()
        .map_err(|_| FilterError::validation(format!("Please enter a valid number, got '{}'", text.trim())))
}

fn unknown_choice(opt: &FieldOptions, raw: &str) -> FilterError {
    FilterError::validation(format!(
        "'{}' is not a valid {} (expected one of: {})",
        raw,
        opt.name,
        opt.choices.join(", ")
    ))
}
