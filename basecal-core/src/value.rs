//! Property identifiers and typed property values.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value as YamlValue;

use crate::datetime::{format_datetime_for_frontmatter, parse_datetime};
use crate::error::BaseCalError;

/// Where a property's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// A frontmatter key of the note itself.
    Note,
    /// A computed value defined by the query.
    Formula,
    /// File metadata (name, path, timestamps).
    File,
}

impl PropertyKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            PropertyKind::Note => "note",
            PropertyKind::Formula => "formula",
            PropertyKind::File => "file",
        }
    }
}

/// Typed reference to a record field, written `note.start`, `formula.due`,
/// `file.mtime`. A bare name means a note property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyId {
    pub kind: PropertyKind,
    pub name: String,
}

impl PropertyId {
    pub fn note(name: &str) -> Self {
        PropertyId {
            kind: PropertyKind::Note,
            name: name.to_string(),
        }
    }

    pub fn formula(name: &str) -> Self {
        PropertyId {
            kind: PropertyKind::Formula,
            name: name.to_string(),
        }
    }

    pub fn file(name: &str) -> Self {
        PropertyId {
            kind: PropertyKind::File,
            name: name.to_string(),
        }
    }

    /// Only native note properties can be written back to frontmatter.
    pub fn is_writable(&self) -> bool {
        self.kind == PropertyKind::Note
    }

    /// The frontmatter key this property writes to, if it is writable.
    pub fn frontmatter_key(&self) -> Option<&str> {
        self.is_writable().then_some(self.name.as_str())
    }
}

impl FromStr for PropertyId {
    type Err = BaseCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || BaseCalError::InvalidProperty(s.to_string());

        let (kind, name) = match s.split_once('.') {
            Some(("note", name)) => (PropertyKind::Note, name),
            Some(("formula", name)) => (PropertyKind::Formula, name),
            Some(("file", name)) => (PropertyKind::File, name),
            _ => (PropertyKind::Note, s),
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(invalid());
        }

        Ok(PropertyId {
            kind,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.kind.prefix(), self.name)
    }
}

impl Serialize for PropertyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PropertyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A date value; `has_time` is false for plain `YYYY-MM-DD` dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateValue {
    pub datetime: NaiveDateTime,
    pub has_time: bool,
}

/// Tagged property value as exposed by the vault's typed value system.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Date(DateValue),
    String(String),
    Number(f64),
    Boolean(bool),
    List(Vec<Value>),
}

impl Value {
    /// Convert raw frontmatter YAML into a typed value. Strings that look like
    /// dates become [`Value::Date`].
    pub fn from_yaml(value: &YamlValue) -> Value {
        match value {
            YamlValue::Null => Value::Null,
            YamlValue::Bool(b) => Value::Boolean(*b),
            YamlValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            YamlValue::String(s) => match parse_datetime(s) {
                Some((datetime, has_time)) => Value::Date(DateValue { datetime, has_time }),
                None => Value::String(s.clone()),
            },
            YamlValue::Sequence(items) => Value::List(items.iter().map(Value::from_yaml).collect()),
            YamlValue::Mapping(_) => Value::String(
                serde_yaml::to_string(value)
                    .unwrap_or_default()
                    .trim_end()
                    .to_string(),
            ),
            YamlValue::Tagged(tagged) => Value::from_yaml(&tagged.value),
        }
    }

    pub fn as_date(&self) -> Option<&DateValue> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Date(_) => "date",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::List(_) => "list",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Display text, or `None` for null and empty values.
    pub fn display_string(&self) -> Option<String> {
        let text = match self {
            Value::Null => return None,
            Value::Date(d) if d.has_time => format_datetime_for_frontmatter(&d.datetime),
            Value::Date(d) => d.datetime.format("%Y-%m-%d").to_string(),
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Value::Number(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::List(items) => items
                .iter()
                .filter_map(Value::display_string)
                .collect::<Vec<_>>()
                .join(", "),
        };

        (!text.is_empty()).then_some(text)
    }
}
