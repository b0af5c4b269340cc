use std::fmt;

use serde::{Deserialize, Serialize};

use super::kind::FilterKind;

/// A single coerced field value handed to the dataset predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Int(_) => None,
            FieldValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// One field of a filter's schema.
/// Empty `choices` means the field takes free-form integer input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    pub name: String,
    pub choices: Vec<String>,
}

impl FieldOptions {
    pub fn new(name: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            name: name.into(),
            choices,
        }
    }

    pub fn free_form(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn is_free_form(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn position(&self, choice: &str) -> Option<usize> {
        self.choices.iter().position(|c| c == choice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The committed, coerced values of a filter (its "ready for filter" form)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadyValues {
    /// Field mapping in schema order
    Fields(Vec<Field>),
    /// Sorted thread IDs
    ThreadIds(Vec<u64>),
}

impl ReadyValues {
    pub fn is_empty(&self) -> bool {
        match self {
            ReadyValues::Fields(fields) => fields.is_empty(),
            ReadyValues::ThreadIds(tids) => tids.is_empty(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        match self {
            ReadyValues::Fields(fields) => fields.iter().find(|f| f.name == name).map(|f| &f.value),
            ReadyValues::ThreadIds(_) => None,
        }
    }
}

/// The argument shape the dataset predicate receives for one filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Criteria {
    /// Single-criterion filters are unwrapped to their bare value
    Value(FieldValue),
    Fields(Vec<Field>),
    ThreadIds(Vec<u64>),
}

impl Criteria {
    /// Build the predicate argument from committed values, unwrapping one-entry mappings
    pub fn from_ready(ready: &ReadyValues) -> Self {
        match ready {
            ReadyValues::Fields(fields) if fields.len() == 1 => Criteria::Value(fields[0].value.clone()),
            ReadyValues::Fields(fields) => Criteria::Fields(fields.clone()),
            ReadyValues::ThreadIds(tids) => Criteria::ThreadIds(tids.clone()),
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::Value(v) => write!(f, "{}", v),
            Criteria::Fields(fields) => {
                let parts: Vec<String> = fields.iter().map(|f| format!("{}={}", f.name, f.value)).collect();
                write!(f, "{}", parts.join(" "))
            }
            Criteria::ThreadIds(tids) => {
                let parts: Vec<String> = tids.iter().map(|t| t.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Criteria tagged with the filter it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCriteria {
    pub kind: FilterKind,
    pub criteria: Criteria,
}

/// Raw user input for a filter, before coercion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterInput {
    /// field name -> chosen option text
    Selection(Vec<(String, String)>),
    /// Free text for one thread ID
    ThreadId(String),
}

impl FilterInput {
    pub fn selection<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        FilterInput::Selection(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn tid(text: impl Into<String>) -> Self {
        FilterInput::ThreadId(text.into())
    }
}
