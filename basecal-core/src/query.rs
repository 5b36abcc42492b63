//! `.base` query files and their result sets.
//!
//! A base file selects notes from the vault and carries one or more views,
//! each with its own free-form configuration mapping:
//!
//! ```yaml
//! filters:
//!   folder: Meetings
//!   tags: [meeting]
//! formulas:
//!   due: note.deadline
//! views:
//!   - type: calendar
//!     name: Week
//!     startDate: note.start
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_yaml::{Mapping, Value as YamlValue};

use crate::error::{BaseCalError, BaseCalResult};
use crate::frontmatter;
use crate::value::{DateValue, PropertyId, PropertyKind, Value};
use crate::vault::{Note, Vault};

/// View type handled by this crate.
pub const CALENDAR_VIEW_TYPE: &str = "calendar";

const MAX_FORMULA_DEPTH: usize = 8;

/// A record exposed to views: typed property access plus file identity.
pub trait Record {
    /// Vault-relative path; unique per record.
    fn path(&self) -> &str;

    /// Human-readable name (file name without extension).
    fn display_name(&self) -> &str;

    /// Typed lookup. Missing properties are `Value::Null`; failures are errors.
    fn get_value(&self, property: &PropertyId) -> BaseCalResult<Value>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filters {
    /// Only notes inside this folder (recursively).
    #[serde(default)]
    pub folder: Option<String>,
    /// Notes carrying any of these tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Notes that have all of these frontmatter keys.
    #[serde(default)]
    pub has: Vec<String>,
}

impl Filters {
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(folder) = self.folder.as_deref().map(|f| f.trim_matches('/'))
            && !folder.is_empty()
            && !note.path.starts_with(&format!("{}/", folder))
        {
            return false;
        }

        if !self.tags.is_empty() {
            let tags = note_tags(note);
            let wanted = self.tags.iter().map(|t| normalize_tag(t));
            if !wanted.into_iter().any(|t| tags.contains(&t)) {
                return false;
            }
        }

        self.has
            .iter()
            .all(|key| frontmatter::get(&note.frontmatter, key).is_some_and(|v| !v.is_null()))
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').to_lowercase()
}

fn note_tags(note: &Note) -> Vec<String> {
    match frontmatter::get(&note.frontmatter, "tags") {
        Some(YamlValue::Sequence(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(normalize_tag)
            .collect(),
        Some(YamlValue::String(s)) => s
            .split([',', ' '])
            .filter(|t| !t.trim().is_empty())
            .map(normalize_tag)
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone)]
pub struct ViewSpec {
    pub view_type: String,
    pub name: String,
    /// Every key of the view entry, including `type` and `name`.
    pub config: Mapping,
}

#[derive(Debug, Clone, Default)]
pub struct BaseFile {
    pub filters: Filters,
    pub formulas: BTreeMap<String, String>,
    pub views: Vec<ViewSpec>,
}

#[derive(Deserialize)]
struct RawBaseFile {
    #[serde(default)]
    filters: Filters,
    #[serde(default)]
    formulas: BTreeMap<String, String>,
    #[serde(default)]
    views: Vec<Mapping>,
}

impl BaseFile {
    pub fn parse(content: &str) -> BaseCalResult<Self> {
        if content.trim().is_empty() {
            return Ok(BaseFile::default());
        }

        let raw: RawBaseFile =
            serde_yaml::from_str(content).map_err(|e| BaseCalError::Query(e.to_string()))?;

        let views = raw
            .views
            .into_iter()
            .enumerate()
            .map(|(i, config)| {
                let view_type = frontmatter::get(&config, "type")
                    .and_then(|v| v.as_str())
                    .unwrap_or(CALENDAR_VIEW_TYPE)
                    .to_string();
                let name = frontmatter::get(&config, "name")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("View {}", i + 1));
                ViewSpec {
                    view_type,
                    name,
                    config,
                }
            })
            .collect();

        Ok(BaseFile {
            filters: raw.filters,
            formulas: raw.formulas,
            views,
        })
    }
}

/// A loaded `.base` file plus the view being displayed.
#[derive(Debug, Clone)]
pub struct Query {
    pub base_path: String,
    pub base: BaseFile,
    pub view_name: Option<String>,
}

impl Query {
    pub async fn load(vault: &Vault, base_path: &str, view_name: Option<&str>) -> BaseCalResult<Self> {
        let content = vault.read(base_path).await?;
        let base = BaseFile::parse(&content)?;

        if let Some(name) = view_name
            && !base.views.iter().any(|v| v.name == name)
        {
            return Err(BaseCalError::Query(format!(
                "View '{}' not found in {}",
                name, base_path
            )));
        }

        Ok(Query {
            base_path: base_path.to_string(),
            base,
            view_name: view_name.map(str::to_string),
        })
    }

    /// Re-read the base file, keeping the selected view.
    pub async fn reload(&mut self, vault: &Vault) -> BaseCalResult<()> {
        let content = vault.read(&self.base_path).await?;
        self.base = BaseFile::parse(&content)?;
        Ok(())
    }

    /// The named view, else the first calendar view, else the first view.
    pub fn view(&self) -> Option<&ViewSpec> {
        let views = &self.base.views;
        match &self.view_name {
            Some(name) => views.iter().find(|v| &v.name == name),
            None => views
                .iter()
                .find(|v| v.view_type == CALENDAR_VIEW_TYPE)
                .or_else(|| views.first()),
        }
    }

    /// Stable key for per-view local state.
    pub fn identity(&self) -> String {
        let view = self.view().map(|v| v.name.as_str()).unwrap_or("");
        format!("{}#{}", self.base_path, view)
    }

    /// Evaluate the query against the vault's current contents.
    pub async fn run(&self, vault: &Vault) -> BaseCalResult<QueryResult> {
        let formulas = Arc::new(self.base.formulas.clone());
        let mut entries = Vec::new();

        for path in vault.list_markdown().await? {
            let note = match vault.load_note(&path).await {
                Ok(note) => note,
                Err(e) => {
                    log::warn!("Skipping {}: {}", path, e);
                    continue;
                }
            };

            if self.base.filters.matches(&note) {
                entries.push(QueryEntry {
                    note,
                    formulas: Arc::clone(&formulas),
                });
            }
        }

        Ok(QueryResult {
            identity: self.identity(),
            view_config: self.view().map(|v| v.config.clone()).unwrap_or_default(),
            entries,
        })
    }
}

/// The current result set of a query.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub identity: String,
    pub view_config: Mapping,
    pub entries: Vec<QueryEntry>,
}

/// A note matched by a query.
#[derive(Debug, Clone)]
pub struct QueryEntry {
    pub note: Note,
    formulas: Arc<BTreeMap<String, String>>,
}

impl QueryEntry {
    pub fn new(note: Note, formulas: BTreeMap<String, String>) -> Self {
        QueryEntry {
            note,
            formulas: Arc::new(formulas),
        }
    }

    fn lookup(&self, property: &PropertyId, depth: usize) -> BaseCalResult<Value> {
        match property.kind {
            PropertyKind::Note => Ok(frontmatter::get(&self.note.frontmatter, &property.name)
                .map(Value::from_yaml)
                .unwrap_or(Value::Null)),
            PropertyKind::File => self.file_value(property),
            PropertyKind::Formula => {
                if depth >= MAX_FORMULA_DEPTH {
                    return Err(access_error(property, "formula references form a cycle"));
                }
                let expr = self
                    .formulas
                    .get(&property.name)
                    .ok_or_else(|| access_error(property, "unknown formula"))?;
                let target: PropertyId = expr
                    .parse()
                    .map_err(|_| access_error(property, &format!("cannot evaluate '{}'", expr)))?;
                self.lookup(&target, depth + 1)
            }
        }
    }

    fn file_value(&self, property: &PropertyId) -> BaseCalResult<Value> {
        let note = &self.note;
        let text = |s: &str| Ok(Value::String(s.to_string()));
        let date = |dt: Option<chrono::DateTime<chrono::Local>>| {
            Ok(dt
                .map(|d| {
                    Value::Date(DateValue {
                        datetime: d.naive_local(),
                        has_time: true,
                    })
                })
                .unwrap_or(Value::Null))
        };

        match property.name.as_str() {
            "name" => text(note.name()),
            "basename" => text(note.basename()),
            "path" => text(&note.path),
            "folder" => text(note.folder()),
            "ext" => text(note.extension()),
            "mtime" => date(note.modified),
            "ctime" => date(note.created),
            _ => Err(access_error(property, "unknown file field")),
        }
    }
}

fn access_error(property: &PropertyId, message: &str) -> BaseCalError {
    BaseCalError::PropertyAccess {
        property: property.to_string(),
        message: message.to_string(),
    }
}

impl Record for QueryEntry {
    fn path(&self) -> &str {
        &self.note.path
    }

    fn display_name(&self) -> &str {
        self.note.basename()
    }

    fn get_value(&self, property: &PropertyId) -> BaseCalResult<Value> {
        self.lookup(property, 0)
    }
}
