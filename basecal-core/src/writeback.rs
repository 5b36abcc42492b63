//! Writing moved, resized and re-flagged events back into note frontmatter.

use std::future::Future;

use chrono::NaiveDateTime;
use serde_yaml::Value as YamlValue;

use crate::datetime::{default_end, format_datetime_for_frontmatter, start_of_day, whole_minutes};
use crate::error::{BaseCalError, BaseCalResult};
use crate::frontmatter;
use crate::value::PropertyId;
use crate::vault::Vault;
use crate::view_config::ViewConfiguration;

/// Frontmatter key holding the event length in whole minutes.
pub const DURATION_KEY: &str = "duration";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Event dragged to a new slot.
    Drop,
    /// Event end dragged.
    Resize,
}

/// New state of an event after a drag or resize.
#[derive(Debug, Clone, PartialEq)]
pub struct EventChange {
    /// Vault-relative path of the note.
    pub path: String,
    pub kind: ChangeKind,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
    /// Whether the all-day flag differs from the event's previous state.
    pub all_day_changed: bool,
}

/// Frontmatter keys a change is written into.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteBindings {
    pub start: PropertyId,
    pub end: Option<PropertyId>,
    pub all_day: Option<PropertyId>,
}

impl WriteBindings {
    /// `None` when the view has no start binding.
    pub fn from_config(config: &ViewConfiguration) -> Option<Self> {
        Some(WriteBindings {
            start: config.start_property.clone()?,
            end: config.end_property.clone(),
            all_day: config.all_day_property.clone(),
        })
    }
}

fn writable_key(property: &PropertyId) -> BaseCalResult<&str> {
    property
        .frontmatter_key()
        .ok_or_else(|| BaseCalError::NotWritable(property.to_string()))
}

/// Endpoints an event is written with.
///
/// All-day spans snap both endpoints to midnight and a missing end becomes
/// the start. A timed span without an end gets the default length.
pub fn normalize_span(
    start: &NaiveDateTime,
    end: Option<&NaiveDateTime>,
    all_day: bool,
) -> (NaiveDateTime, NaiveDateTime) {
    if all_day {
        let start = start_of_day(start);
        let end = end.map(start_of_day).unwrap_or(start);
        (start, end)
    } else {
        (*start, end.copied().unwrap_or_else(|| default_end(start)))
    }
}

/// Length written as `duration`, only for a positive span.
pub fn span_minutes(start: &NaiveDateTime, end: &NaiveDateTime) -> Option<i64> {
    Some(whole_minutes(start, end)).filter(|m| *m > 0)
}

/// Compute the frontmatter fields a change writes, in write order.
///
/// Both endpoints go through [`normalize_span`]. `duration` is only written
/// for a positive span.
pub fn build_frontmatter_updates(
    change: &EventChange,
    bindings: &WriteBindings,
) -> BaseCalResult<Vec<(String, YamlValue)>> {
    if change.kind == ChangeKind::Resize && change.end.is_none() {
        return Err(BaseCalError::WriteBack(format!(
            "{}: resize requires an end date",
            change.path
        )));
    }

    let start_key = writable_key(&bindings.start)?;
    let end_key = bindings.end.as_ref().map(writable_key).transpose()?;
    let (start, end) = normalize_span(&change.start, change.end.as_ref(), change.all_day);

    let mut updates = vec![(
        start_key.to_string(),
        YamlValue::from(format_datetime_for_frontmatter(&start)),
    )];

    if let Some(key) = end_key {
        updates.push((
            key.to_string(),
            YamlValue::from(format_datetime_for_frontmatter(&end)),
        ));
    }

    if let Some(minutes) = span_minutes(&start, &end) {
        updates.push((DURATION_KEY.to_string(), YamlValue::from(minutes)));
    }

    if change.all_day_changed
        && let Some(prop) = &bindings.all_day
    {
        updates.push((writable_key(prop)?.to_string(), YamlValue::from(change.all_day)));
    }

    Ok(updates)
}

/// Persists event changes.
pub trait EventWriter {
    fn write_change(&self, change: &EventChange) -> impl Future<Output = BaseCalResult<()>>;
}

/// Writes changes into the vault, one frontmatter transaction per change.
pub struct FrontmatterWriter<'a> {
    vault: &'a Vault,
    bindings: WriteBindings,
}

impl<'a> FrontmatterWriter<'a> {
    pub fn new(vault: &'a Vault, bindings: WriteBindings) -> Self {
        FrontmatterWriter { vault, bindings }
    }
}

impl EventWriter for FrontmatterWriter<'_> {
    async fn write_change(&self, change: &EventChange) -> BaseCalResult<()> {
        let updates = build_frontmatter_updates(change, &self.bindings)?;
        log::debug!("Writing {} field(s) to {}", updates.len(), change.path);

        self.vault
            .process_frontmatter(&change.path, move |fm| {
                for (key, value) in updates {
                    frontmatter::set(fm, &key, value);
                }
            })
            .await
    }
}
