//! Creating event notes from a calendar selection.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde_yaml::{Mapping, Value as YamlValue};

use crate::datetime::format_datetime_for_frontmatter;
use crate::error::{BaseCalError, BaseCalResult};
use crate::frontmatter::{self, parse_note, render_note, split_frontmatter};
use crate::host::Prompt;
use crate::value::PropertyId;
use crate::vault::{Note, Vault};
use crate::view_config::ViewConfiguration;
use crate::writeback::{DURATION_KEY, normalize_span, span_minutes};

/// Frontmatter key receiving the event title.
pub const TITLE_KEY: &str = "title";

const TITLE_PLACEHOLDER: &str = "Event title";
const UNTITLED: &str = "Untitled";

/// Characters that cannot appear in a note file name.
const FORBIDDEN_FILENAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|', '#', '^', '[', ']'];

/// Time range of a new event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewEvent {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
}

pub struct EventCreator<'a> {
    vault: &'a Vault,
    prompt: &'a dyn Prompt,
    config: &'a ViewConfiguration,
}

impl<'a> EventCreator<'a> {
    pub fn new(vault: &'a Vault, prompt: &'a dyn Prompt, config: &'a ViewConfiguration) -> Self {
        EventCreator {
            vault,
            prompt,
            config,
        }
    }

    /// Ask for a title and create the note. `None` if the user cancelled.
    pub async fn create_event(&self, event: &NewEvent) -> BaseCalResult<Option<Note>> {
        let title = self
            .prompt
            .prompt_title(TITLE_PLACEHOLDER)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let Some(title) = title else {
            log::debug!("Event creation cancelled");
            return Ok(None);
        };

        self.create_titled(&title, event).await.map(Some)
    }

    /// Create the note without prompting.
    pub async fn create_titled(&self, title: &str, event: &NewEvent) -> BaseCalResult<Note> {
        let folder = self.destination_folder();
        let template = self.load_template().await;
        let fields = self.computed_fields(title, event);
        let content = build_note_content(&template, &fields)?;
        let today = Local::now().date_naive();

        loop {
            let path = unique_note_path(self.vault, &folder, title, today).await;
            match self.vault.create(&path, &content).await {
                Ok(()) => {
                    log::info!("Created {}", path);
                    return self.vault.load_note(&path).await;
                }
                // Someone else took the name between the check and the create.
                Err(BaseCalError::NoteExists(_)) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Configured folder, or the vault root.
    fn destination_folder(&self) -> String {
        self.config
            .new_event_folder
            .as_deref()
            .map(|f| f.trim().trim_matches('/').to_string())
            .unwrap_or_default()
    }

    /// Template text, or empty when none is configured or it can't be read.
    async fn load_template(&self) -> String {
        let Some(path) = self.config.new_event_template.as_deref().map(str::trim) else {
            return String::new();
        };
        if path.is_empty() {
            return String::new();
        }

        let path = if path.ends_with(".md") {
            path.to_string()
        } else {
            format!("{}.md", path)
        };

        match self.vault.read(&path).await {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Could not load template {}: {}", path, e);
                String::new()
            }
        }
    }

    fn computed_fields(&self, title: &str, event: &NewEvent) -> Mapping {
        let mut fields = Mapping::new();
        frontmatter::set(&mut fields, TITLE_KEY, YamlValue::from(title));

        let mut write = |prop: Option<&PropertyId>, value: YamlValue| {
            let Some(prop) = prop else { return };
            match prop.frontmatter_key() {
                Some(key) => frontmatter::set(&mut fields, key, value),
                None => log::warn!("Not writing {} to a new event: not a note property", prop),
            }
        };

        let (start, end) = normalize_span(&event.start, event.end.as_ref(), event.all_day);
        write(
            self.config.start_property.as_ref(),
            YamlValue::from(format_datetime_for_frontmatter(&start)),
        );
        write(
            self.config.end_property.as_ref(),
            YamlValue::from(format_datetime_for_frontmatter(&end)),
        );
        write(self.config.all_day_property.as_ref(), YamlValue::from(event.all_day));
        if let Some(minutes) = span_minutes(&start, &end) {
            frontmatter::set(&mut fields, DURATION_KEY, YamlValue::from(minutes));
        }

        fields
    }
}

/// Merge `fields` into the template's frontmatter, or put a new frontmatter
/// block in front of a template that has none.
pub fn build_note_content(template: &str, fields: &Mapping) -> BaseCalResult<String> {
    if split_frontmatter(template).is_some() {
        match parse_note("template", template) {
            Ok((mut existing, body)) => {
                for (key, value) in fields {
                    existing.insert(key.clone(), value.clone());
                }
                return render_note(&existing, &body);
            }
            Err(e) => log::warn!("Template frontmatter ignored: {}", e),
        }
    }

    render_note(fields, template)
}

/// File name stem for a title: forbidden characters removed, whitespace
/// collapsed.
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !FORBIDDEN_FILENAME_CHARS.contains(c) && !c.is_control())
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches('.').trim();

    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// First free path among `Title.md`, `Title YYYY-MM-DD.md`,
/// `Title YYYY-MM-DD 1.md`, `Title YYYY-MM-DD 2.md`, ...
pub async fn unique_note_path(vault: &Vault, folder: &str, title: &str, today: NaiveDate) -> String {
    let stem = sanitize_title(title);
    let join = |name: String| {
        if folder.is_empty() {
            name
        } else {
            format!("{}/{}", folder, name)
        }
    };

    let plain = join(format!("{}.md", stem));
    if !vault.exists(&plain).await {
        return plain;
    }

    let dated_stem = format!("{} {}", stem, today.format("%Y-%m-%d"));
    let dated = join(format!("{}.md", dated_stem));
    if !vault.exists(&dated).await {
        return dated;
    }

    let mut n = 1u32;
    loop {
        let candidate = join(format!("{} {}.md", dated_stem, n));
        if !vault.exists(&candidate).await {
            return candidate;
        }
        n += 1;
    }
}
