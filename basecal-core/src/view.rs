//! The calendar view: glue between a query's results and the renderer.
//!
//! The host calls [`CalendarView::on_data_updated`] whenever the query has new
//! results or the view configuration changed. Each call re-reads the
//! configuration, re-extracts every entry and issues exactly one render.

use chrono::{NaiveDate, NaiveDateTime};

use crate::create::{EventCreator, NewEvent};
use crate::error::{BaseCalError, BaseCalResult};
use crate::extract::{extract_entries, EntryBindings};
use crate::host::HostContext;
use crate::local_cache::LocalCache;
use crate::menu::{CapabilityRegistry, Menu, MenuAction, MenuItem};
use crate::query::QueryResult;
use crate::render::{
    CalendarEvent, CalendarRenderer, EphemeralState, EventDrop, EventResize, EventStyles, Frame,
    RenderContent, RenderProps,
};
use crate::style::CondenseLevel;
use crate::vault::{Note, Vault};
use crate::view_config::ViewConfiguration;
use crate::writeback::{FrontmatterWriter, WriteBindings};

/// Shown instead of the calendar until a start property is chosen.
pub const NO_START_PROPERTY_MESSAGE: &str =
    "Choose a start date property in the view options to place notes on the calendar.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Uninitialized,
    NoStartProperty,
    Ready,
}

pub struct CalendarView<'h> {
    vault: Vault,
    host: HostContext<'h>,
    capabilities: &'h CapabilityRegistry,
    styles: EventStyles,
    cache: LocalCache,
    result: QueryResult,
    config: ViewConfiguration,
    state: ViewState,
    renderer: CalendarRenderer,
}

impl<'h> CalendarView<'h> {
    /// Create the view and mount its renderer.
    pub fn new(
        vault: Vault,
        host: HostContext<'h>,
        capabilities: &'h CapabilityRegistry,
        styles: EventStyles,
        cache: LocalCache,
        today: NaiveDate,
    ) -> Self {
        let mut renderer = CalendarRenderer::new(today);
        renderer.mount();

        CalendarView {
            vault,
            host,
            capabilities,
            styles,
            cache,
            result: QueryResult::default(),
            config: ViewConfiguration::default(),
            state: ViewState::Uninitialized,
            renderer,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn config(&self) -> &ViewConfiguration {
        &self.config
    }

    pub fn identity(&self) -> &str {
        &self.result.identity
    }

    pub fn renderer(&self) -> &CalendarRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut CalendarRenderer {
        &mut self.renderer
    }

    /// New results (or configuration) from the query.
    pub fn on_data_updated(&mut self, result: QueryResult) {
        self.result = result;
        self.refresh();
    }

    /// Style maps changed in the settings.
    pub fn set_styles(&mut self, styles: EventStyles) {
        self.styles = styles;
        if self.state != ViewState::Uninitialized {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        if !self.renderer.is_mounted() {
            log::debug!("Skipping refresh of closed view");
            return;
        }

        self.config = ViewConfiguration::from_map(&self.result.view_config);

        let Some(start) = self.config.start_property.clone() else {
            self.state = ViewState::NoStartProperty;
            self.renderer
                .render(RenderContent::Empty(NO_START_PROPERTY_MESSAGE.to_string()));
            return;
        };

        let bindings = EntryBindings {
            start: &start,
            end: self.config.end_property.as_ref(),
            title: self.config.title_property.as_ref(),
        };
        let entries = extract_entries(&self.result.entries, bindings);
        let events: Vec<CalendarEvent> = entries
            .iter()
            .map(|entry| CalendarEvent::from_entry(entry, &self.config, &self.styles))
            .collect();

        log::debug!(
            "{}: {} of {} records on the calendar",
            self.result.identity,
            events.len(),
            self.result.entries.len()
        );

        let condense = CondenseLevel::resolve(
            self.config.condense_level,
            self.cache.condense_level(&self.result.identity),
        );
        self.renderer
            .render(RenderContent::Calendar(RenderProps::new(&self.config, events, condense)));
        self.state = ViewState::Ready;
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    pub fn ephemeral_state(&self) -> EphemeralState {
        self.renderer.ephemeral_state()
    }

    pub fn set_ephemeral_state(&mut self, state: &EphemeralState) {
        self.renderer.restore_ephemeral_state(state);
    }

    /// Whether there is a calendar to take keyboard focus.
    pub fn focus(&self) -> bool {
        self.renderer.is_mounted() && self.state == ViewState::Ready
    }

    /// User-driven zoom. The level is clamped, applied and cached for this query.
    pub async fn on_zoom(&mut self, level: i64) -> CondenseLevel {
        let level = CondenseLevel::new(level);
        self.renderer.set_condense_level(level);

        self.cache
            .set_condense_level(&self.result.identity, level.value());
        if let Err(e) = self.cache.save().await {
            log::warn!("Could not save condense level: {}", e);
        }
        level
    }

    pub async fn on_event_drop(&mut self, drop: EventDrop) -> bool {
        let Some(bindings) = WriteBindings::from_config(&self.config) else {
            return false;
        };
        let writer = FrontmatterWriter::new(&self.vault, bindings);
        self.renderer.handle_event_drop(&writer, drop).await
    }

    pub async fn on_event_resize(&mut self, resize: EventResize) -> bool {
        let Some(bindings) = WriteBindings::from_config(&self.config) else {
            return false;
        };
        let writer = FrontmatterWriter::new(&self.vault, bindings);
        self.renderer.handle_event_resize(&writer, resize).await
    }

    /// Grid selection: prompt for a title and create an event note.
    pub async fn on_select(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        all_day: bool,
    ) -> BaseCalResult<Option<Note>> {
        if self.state != ViewState::Ready {
            return Ok(None);
        }
        let Some(selection) = self.renderer.handle_select(start, end, all_day) else {
            return Ok(None);
        };
        if !self.config.is_editable() {
            log::warn!("Cannot create events: start date is not a note property");
            return Ok(None);
        }

        let event = NewEvent {
            start: selection.start,
            end: Some(selection.end),
            all_day: selection.all_day,
        };
        EventCreator::new(&self.vault, self.host.prompt, &self.config)
            .create_event(&event)
            .await
    }

    pub fn on_event_click(&self, id: &str) {
        if self.renderer.is_mounted() && self.renderer.event(id).is_some() {
            self.host.workspace.open_link(id);
        }
    }

    pub fn on_event_hover(&self, id: &str) {
        if self.renderer.is_mounted() && self.renderer.event(id).is_some() {
            self.host.workspace.hover_preview(id);
        }
    }

    /// Context menu for an event, `None` if there is no such event.
    pub fn context_menu(&self, id: &str) -> Option<Menu> {
        if !self.renderer.is_mounted() {
            return None;
        }
        self.renderer.event(id)?;
        Some(self.capabilities.context_menu(id))
    }

    pub async fn run_menu_item(&self, id: &str, menu: &Menu, item: &MenuItem) -> BaseCalResult<()> {
        match &item.action {
            MenuAction::Open => {
                self.host.workspace.open_link(id);
                Ok(())
            }
            MenuAction::Delete => {
                if !self.host.prompt.confirm(&format!("Delete \"{}\"?", id)) {
                    return Ok(());
                }
                let trashed = self.vault.trash(id).await?;
                self.host
                    .notifier
                    .notice(&format!("Moved {} to {}", id, trashed));
                Ok(())
            }
            MenuAction::Custom(action_id) => {
                let source = menu.source.as_deref().ok_or_else(|| BaseCalError::Capability {
                    name: action_id.clone(),
                    message: "menu has no owning capability".to_string(),
                })?;
                self.capabilities.run_custom_action(source, id, action_id)
            }
        }
    }

    pub fn frame(&self) -> BaseCalResult<Frame> {
        self.renderer.frame()
    }

    /// Tear down: unmount the renderer. Later callbacks are ignored.
    pub fn close(&mut self) {
        self.renderer.unmount();
        self.state = ViewState::Uninitialized;
    }
}

impl Drop for CalendarView<'_> {
    fn drop(&mut self) {
        if self.renderer.is_mounted() {
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter;
    use crate::host::testing::RecordingHost;
    use crate::query::Query;
    use crate::render::Frame;

    const BASE: &str = "\
views:
  - type: calendar
    name: Week
    startDate: note.start
    endDate: note.end
    titleProperty: note.title
    newEventFolder: Events
";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    async fn vault_with(base: &str) -> (tempfile::TempDir, Vault) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Calendar.base"), base).unwrap();
        std::fs::write(
            dir.path().join("Standup.md"),
            "---\ntitle: Standup\nstart: 2024-03-04 09:00\nend: 2024-03-04 09:30\n---\nNotes\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("Loose.md"), "No frontmatter\n").unwrap();
        let vault = Vault::open(dir.path()).unwrap();
        (dir, vault)
    }

    async fn load(vault: &Vault) -> QueryResult {
        Query::load(vault, "Calendar.base", None)
            .await
            .unwrap()
            .run(vault)
            .await
            .unwrap()
    }

    async fn view<'h>(vault: &Vault, host: &'h RecordingHost, caps: &'h CapabilityRegistry) -> CalendarView<'h> {
        CalendarView::new(
            vault.clone(),
            host.ctx(),
            caps,
            EventStyles::default(),
            LocalCache::load(vault).await,
            today(),
        )
    }

    #[tokio::test]
    async fn places_dated_notes_on_the_calendar() {
        let (_dir, vault) = vault_with(BASE).await;
        let host = RecordingHost::default();
        let caps = CapabilityRegistry::new();
        let mut view = view(&vault, &host, &caps).await;
        assert_eq!(view.state(), ViewState::Uninitialized);

        view.on_data_updated(load(&vault).await);
        assert_eq!(view.state(), ViewState::Ready);
        assert_eq!(view.identity(), "Calendar.base#Week");

        let Frame::Calendar(frame) = view.frame().unwrap() else {
            panic!("expected a calendar frame");
        };
        assert_eq!(frame.events.len(), 1);
        assert_eq!(frame.events[0].id, "Standup.md");
        assert_eq!(frame.events[0].title, "Standup");
        assert_eq!(frame.events[0].start, at(4, 9, 0));
    }

    #[tokio::test]
    async fn asks_for_a_start_property() {
        let (_dir, vault) = vault_with("views:\n  - type: calendar\n    name: Empty\n").await;
        let host = RecordingHost::default();
        let caps = CapabilityRegistry::new();
        let mut view = view(&vault, &host, &caps).await;

        view.on_data_updated(load(&vault).await);
        assert_eq!(view.state(), ViewState::NoStartProperty);
        assert!(matches!(
            view.frame().unwrap(),
            Frame::Empty { message } if message == NO_START_PROPERTY_MESSAGE
        ));
        assert!(!view.focus());
    }

    #[tokio::test]
    async fn drop_writes_frontmatter() {
        let (_dir, vault) = vault_with(BASE).await;
        let host = RecordingHost::default();
        let caps = CapabilityRegistry::new();
        let mut view = view(&vault, &host, &caps).await;
        view.on_data_updated(load(&vault).await);

        let saved = view
            .on_event_drop(EventDrop {
                id: "Standup.md".to_string(),
                start: at(5, 14, 0),
                end: Some(at(5, 15, 30)),
                all_day: false,
            })
            .await;
        assert!(saved);
        assert_eq!(view.renderer().event("Standup.md").unwrap().start, at(5, 14, 0));

        let note = vault.load_note("Standup.md").await.unwrap();
        let fm = &note.frontmatter;
        assert_eq!(frontmatter::get(fm, "start").and_then(|v| v.as_str()), Some("2024-03-05 14:00"));
        assert_eq!(frontmatter::get(fm, "end").and_then(|v| v.as_str()), Some("2024-03-05 15:30"));
        assert_eq!(frontmatter::get(fm, "duration").and_then(|v| v.as_i64()), Some(90));
        assert_eq!(note.body.trim(), "Notes");
    }

    #[tokio::test]
    async fn failed_write_reverts_the_event() {
        let (dir, vault) = vault_with(BASE).await;
        let host = RecordingHost::default();
        let caps = CapabilityRegistry::new();
        let mut view = view(&vault, &host, &caps).await;
        view.on_data_updated(load(&vault).await);

        std::fs::remove_file(dir.path().join("Standup.md")).unwrap();
        let saved = view
            .on_event_resize(EventResize {
                id: "Standup.md".to_string(),
                start: at(4, 9, 0),
                end: Some(at(4, 11, 0)),
            })
            .await;
        assert!(!saved);
        assert_eq!(view.renderer().event("Standup.md").unwrap().end, at(4, 9, 30));
    }

    #[tokio::test]
    async fn zoom_is_cached_per_query() {
        let (_dir, vault) = vault_with(BASE).await;
        let host = RecordingHost::default();
        let caps = CapabilityRegistry::new();
        let mut view = view(&vault, &host, &caps).await;
        view.on_data_updated(load(&vault).await);

        assert_eq!(view.on_zoom(500).await.value(), crate::style::MAX_CONDENSE_LEVEL);

        let cache = LocalCache::load(&vault).await;
        assert_eq!(cache.condense_level("Calendar.base#Week"), Some(crate::style::MAX_CONDENSE_LEVEL));
    }

    #[tokio::test]
    async fn selection_creates_notes_without_clobbering() {
        let (_dir, vault) = vault_with(BASE).await;
        let host = RecordingHost::with_titles(&[Some("Review"), Some("Review"), None]);
        let caps = CapabilityRegistry::new();
        let mut view = view(&vault, &host, &caps).await;
        view.on_data_updated(load(&vault).await);

        let first = view.on_select(at(4, 13, 0), at(4, 14, 0), false).await.unwrap().unwrap();
        assert_eq!(first.path, "Events/Review.md");
        assert_eq!(
            frontmatter::get(&first.frontmatter, "start").and_then(|v| v.as_str()),
            Some("2024-03-04 13:00")
        );

        let second = view.on_select(at(4, 15, 0), at(4, 16, 0), false).await.unwrap().unwrap();
        assert_ne!(second.path, first.path);
        assert!(second.path.starts_with("Events/Review "));

        assert!(view.on_select(at(4, 15, 0), at(4, 16, 0), false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_menu_item_confirms_and_trashes() {
        let (dir, vault) = vault_with(BASE).await;
        let host = RecordingHost {
            confirm_answer: true,
            ..Default::default()
        };
        let caps = CapabilityRegistry::new();
        let mut view = view(&vault, &host, &caps).await;
        view.on_data_updated(load(&vault).await);

        assert!(view.context_menu("Missing.md").is_none());
        let menu = view.context_menu("Standup.md").unwrap();
        let delete = menu.find("Delete").unwrap().clone();
        view.run_menu_item("Standup.md", &menu, &delete).await.unwrap();

        assert!(!dir.path().join("Standup.md").exists());
        assert_eq!(host.notices.borrow().len(), 1);
    }

    #[tokio::test]
    async fn closed_view_ignores_callbacks() {
        let (_dir, vault) = vault_with(BASE).await;
        let host = RecordingHost::default();
        let caps = CapabilityRegistry::new();
        let mut view = view(&vault, &host, &caps).await;
        view.on_data_updated(load(&vault).await);

        view.close();
        view.on_event_click("Standup.md");
        view.on_data_updated(load(&vault).await);

        assert!(host.opened.borrow().is_empty());
        assert!(matches!(view.frame(), Err(BaseCalError::Unmounted)));
    }
}
