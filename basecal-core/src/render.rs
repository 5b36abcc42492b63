//! Calendar rendering model.
//!
//! [`CalendarRenderer`] is the mounted calendar widget: it holds the widget's
//! event list and presentation state (view mode, date anchor, zoom, scroll),
//! turns interaction callbacks into write-backs, and produces a serialisable
//! [`Frame`] per rendering pass.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::datetime::{default_end, is_midnight};
use crate::error::{BaseCalError, BaseCalResult};
use crate::extract::CalendarEntry;
use crate::style::{
    priority_color_map, resolve_priority_color, resolve_status_styles, slot_height_css,
    status_style_map, CondenseLevel, StyleMap, DEFAULT_PRIORITY, DEFAULT_STATUS,
};
use crate::value::PropertyId;
use crate::view_config::{ViewConfiguration, ViewMode};
use crate::writeback::{ChangeKind, EventChange, EventWriter};

/// Property read for priority when none is configured.
pub const PRIORITY_FALLBACK_PROPERTY: &str = "priority";
/// Property read for status when none is configured.
pub const STATUS_FALLBACK_PROPERTY: &str = "status";

/// Days shown by the work-week preset.
const WORK_WEEK_DAYS: i64 = 5;

/// Merged style maps used to decorate events.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStyles {
    pub priority_colors: StyleMap,
    pub status_styles: StyleMap,
}

impl Default for EventStyles {
    fn default() -> Self {
        EventStyles {
            priority_colors: priority_color_map(&StyleMap::new()),
            status_styles: status_style_map(&StyleMap::new()),
        }
    }
}

/// An event in the widget's own model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Vault-relative path of the source note.
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
    pub priority: String,
    pub status: String,
    pub color: String,
    pub text_styles: Vec<String>,
}

impl CalendarEvent {
    /// Map an entry onto the widget model.
    pub fn from_entry(entry: &CalendarEntry<'_>, config: &ViewConfiguration, styles: &EventStyles) -> Self {
        let record = entry.record;
        let end = entry.end.unwrap_or_else(|| default_end(&entry.start));

        let title = entry
            .title
            .clone()
            .or_else(|| {
                config
                    .display_properties
                    .iter()
                    .find_map(|prop| record.get_value(prop).ok()?.display_string())
            })
            .unwrap_or_else(|| record.display_name().to_string());

        let read_key = |bound: Option<&PropertyId>, fallback: &str, default: &str| {
            let prop = bound.cloned().unwrap_or_else(|| PropertyId::note(fallback));
            record
                .get_value(&prop)
                .ok()
                .and_then(|v| v.display_string())
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| default.to_string())
        };
        let priority = read_key(
            config.priority_property.as_ref(),
            PRIORITY_FALLBACK_PROPERTY,
            DEFAULT_PRIORITY,
        );
        let status = read_key(
            config.status_property.as_ref(),
            STATUS_FALLBACK_PROPERTY,
            DEFAULT_STATUS,
        );

        CalendarEvent {
            id: record.path().to_string(),
            title,
            start: entry.start,
            end,
            all_day: is_midnight(&entry.start) && is_midnight(&end),
            color: resolve_priority_color(&styles.priority_colors, &priority),
            text_styles: resolve_status_styles(&styles.status_styles, &status),
            priority,
            status,
        }
    }

    fn overlaps(&self, from: NaiveDateTime, to: NaiveDateTime) -> bool {
        self.start < to && (self.end > from || (self.end == self.start && self.start >= from))
    }
}

/// Presentation options handed to the widget on each render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProps {
    pub events: Vec<CalendarEvent>,
    pub view_mode: ViewMode,
    pub week_start_day: u8,
    pub day_count: u32,
    pub nav_step: u32,
    pub min_time: String,
    pub max_time: String,
    pub condense_level: CondenseLevel,
    pub editable: bool,
}

impl RenderProps {
    pub fn new(config: &ViewConfiguration, events: Vec<CalendarEvent>, condense_level: CondenseLevel) -> Self {
        RenderProps {
            events,
            view_mode: config.view_mode,
            week_start_day: config.week_start_day,
            day_count: config.day_count,
            nav_step: config.nav_step,
            min_time: config.min_time.clone(),
            max_time: config.max_time.clone(),
            condense_level,
            editable: config.is_editable(),
        }
    }
}

/// What the widget is asked to display.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderContent {
    /// Explanatory message instead of a calendar.
    Empty(String),
    Calendar(RenderProps),
}

/// One rendering pass.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Frame {
    Empty { message: String },
    Calendar(RenderFrame),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    pub view_mode: ViewMode,
    pub widget_view: String,
    pub anchor: NaiveDate,
    pub range_start: NaiveDate,
    /// Exclusive.
    pub range_end: NaiveDate,
    pub min_time: String,
    pub max_time: String,
    pub week_start_day: u8,
    pub editable: bool,
    pub condense_level: i64,
    pub slot_height_css: String,
    pub scroll_top: f64,
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Event moved to a new slot.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDrop {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
}

/// Event end (or start) dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct EventResize {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
}

/// A time range selected on an empty part of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
}

/// Presentation state that survives refreshes but is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EphemeralState {
    pub scroll_top: f64,
    pub anchor: Option<NaiveDate>,
    pub view_mode: Option<ViewMode>,
}

#[derive(Debug)]
pub struct CalendarRenderer {
    mounted: bool,
    content: RenderContent,
    view_mode: ViewMode,
    /// View mode last seen in the configuration.
    configured_mode: Option<ViewMode>,
    anchor: NaiveDate,
    scroll_top: f64,
    viewport: (u32, u32),
}

impl CalendarRenderer {
    pub fn new(today: NaiveDate) -> Self {
        CalendarRenderer {
            mounted: false,
            content: RenderContent::Empty(String::new()),
            view_mode: ViewMode::default(),
            configured_mode: None,
            anchor: today,
            scroll_top: 0.0,
            viewport: (0, 0),
        }
    }

    pub fn mount(&mut self) {
        self.mounted = true;
    }

    /// After unmounting, interaction callbacks are ignored.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.content = RenderContent::Empty(String::new());
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Replace the widget's content. Scroll position and the user's view
    /// mode choice are kept unless the configured view mode changed.
    pub fn render(&mut self, content: RenderContent) {
        if !self.mounted {
            log::debug!("Ignoring render on unmounted calendar");
            return;
        }

        if let RenderContent::Calendar(props) = &content
            && self.configured_mode != Some(props.view_mode)
        {
            self.configured_mode = Some(props.view_mode);
            self.view_mode = props.view_mode;
            self.anchor = anchor_for(self.view_mode, self.anchor, props.week_start_day);
        }

        self.content = content;
    }

    pub fn content(&self) -> &RenderContent {
        &self.content
    }

    fn props(&self) -> Option<&RenderProps> {
        match &self.content {
            RenderContent::Calendar(props) => Some(props),
            RenderContent::Empty(_) => None,
        }
    }

    fn props_mut(&mut self) -> Option<&mut RenderProps> {
        match &mut self.content {
            RenderContent::Calendar(props) => Some(props),
            RenderContent::Empty(_) => None,
        }
    }

    pub fn events(&self) -> &[CalendarEvent] {
        self.props().map(|p| p.events.as_slice()).unwrap_or(&[])
    }

    pub fn event(&self, id: &str) -> Option<&CalendarEvent> {
        self.events().iter().find(|e| e.id == id)
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    fn week_start_day(&self) -> u8 {
        self.props()
            .map(|p| p.week_start_day)
            .unwrap_or(crate::view_config::DEFAULT_WEEK_START_DAY)
    }

    pub fn switch_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.anchor = anchor_for(mode, self.anchor, self.week_start_day());
    }

    /// Jump to the window containing `date`.
    pub fn go_to_date(&mut self, date: NaiveDate) {
        self.anchor = anchor_for(self.view_mode, date, self.week_start_day());
    }

    /// Move by `navStep` windows.
    pub fn navigate(&mut self, direction: Direction) {
        let (day_count, nav_step) = self
            .props()
            .map(|p| (p.day_count, p.nav_step))
            .unwrap_or((crate::view_config::DEFAULT_DAY_COUNT, 1));

        let anchor = match self.view_mode {
            ViewMode::Month => {
                let months = Months::new(nav_step);
                match direction {
                    Direction::Next => self.anchor.checked_add_months(months),
                    Direction::Previous => self.anchor.checked_sub_months(months),
                }
            }
            mode => {
                let window = match mode {
                    ViewMode::FiveDay => 7,
                    _ => day_count as i64,
                };
                let days = Duration::days(window * nav_step as i64);
                match direction {
                    Direction::Next => self.anchor.checked_add_signed(days),
                    Direction::Previous => self.anchor.checked_sub_signed(days),
                }
            }
        };

        match anchor {
            Some(anchor) => self.anchor = anchor,
            None => log::warn!("Navigation out of range from {}", self.anchor),
        }
    }

    /// First visible day and the day after the last visible one.
    pub fn visible_range(&self) -> (NaiveDate, NaiveDate) {
        let start = self.anchor;
        let end = match self.view_mode {
            ViewMode::ThreeDay => {
                let days = self
                    .props()
                    .map(|p| p.day_count)
                    .unwrap_or(crate::view_config::DEFAULT_DAY_COUNT);
                start.checked_add_signed(Duration::days(days as i64))
            }
            ViewMode::FiveDay => start.checked_add_signed(Duration::days(WORK_WEEK_DAYS)),
            ViewMode::Month => start.checked_add_months(Months::new(1)),
        };
        (start, end.unwrap_or(start))
    }

    pub fn set_condense_level(&mut self, level: CondenseLevel) {
        if let Some(props) = self.props_mut() {
            props.condense_level = level;
        }
    }

    pub fn condense_level(&self) -> Option<CondenseLevel> {
        self.props().map(|p| p.condense_level)
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        self.scroll_top = scroll_top.max(0.0);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn ephemeral_state(&self) -> EphemeralState {
        EphemeralState {
            scroll_top: self.scroll_top,
            anchor: Some(self.anchor),
            view_mode: Some(self.view_mode),
        }
    }

    pub fn restore_ephemeral_state(&mut self, state: &EphemeralState) {
        self.set_scroll_top(state.scroll_top);
        if let Some(mode) = state.view_mode {
            self.view_mode = mode;
        }
        if let Some(anchor) = state.anchor {
            self.anchor = anchor;
        }
    }

    /// The current rendering pass.
    pub fn frame(&self) -> BaseCalResult<Frame> {
        if !self.mounted {
            return Err(BaseCalError::Unmounted);
        }

        let props = match &self.content {
            RenderContent::Empty(message) => {
                return Ok(Frame::Empty {
                    message: message.clone(),
                });
            }
            RenderContent::Calendar(props) => props,
        };

        let (range_start, range_end) = self.visible_range();
        let from = range_start.and_time(NaiveTime::MIN);
        let to = range_end.and_time(NaiveTime::MIN);

        let mut events: Vec<_> = props
            .events
            .iter()
            .filter(|e| e.overlaps(from, to))
            .cloned()
            .collect();
        events.sort_by(|a, b| (a.start, &a.title).cmp(&(b.start, &b.title)));

        Ok(Frame::Calendar(RenderFrame {
            view_mode: self.view_mode,
            widget_view: self.view_mode.widget_view().to_string(),
            anchor: self.anchor,
            range_start,
            range_end,
            min_time: props.min_time.clone(),
            max_time: props.max_time.clone(),
            week_start_day: props.week_start_day,
            editable: props.editable,
            condense_level: props.condense_level.value(),
            slot_height_css: slot_height_css(props.condense_level),
            scroll_top: self.scroll_top,
            events,
        }))
    }

    /// Position of an event that may be changed right now.
    fn editable_index(&self, id: &str) -> Option<usize> {
        if !self.mounted {
            log::debug!("Ignoring interaction on unmounted calendar");
            return None;
        }
        let props = self.props()?;
        if !props.editable {
            log::warn!("Calendar is read-only; ignoring change to {}", id);
            return None;
        }
        let index = props.events.iter().position(|e| e.id == id);
        if index.is_none() {
            log::warn!("No event with id {}", id);
        }
        index
    }

    /// Apply a drop optimistically, write it back, and revert on failure.
    /// Returns whether the change was persisted.
    pub async fn handle_event_drop<W: EventWriter>(&mut self, writer: &W, drop: EventDrop) -> bool {
        let Some(index) = self.editable_index(&drop.id) else {
            return false;
        };

        let previous = self.events()[index].clone();
        let change = EventChange {
            path: drop.id.clone(),
            kind: ChangeKind::Drop,
            start: drop.start,
            end: drop.end,
            all_day: drop.all_day,
            all_day_changed: drop.all_day != previous.all_day,
        };

        self.apply_change(index, &change);
        self.persist(writer, change, previous).await
    }

    /// Like [`Self::handle_event_drop`]; a resize without an end is refused.
    pub async fn handle_event_resize<W: EventWriter>(&mut self, writer: &W, resize: EventResize) -> bool {
        if resize.end.is_none() {
            log::warn!("Resize of {} has no end date; not saved", resize.id);
            return false;
        }

        let Some(index) = self.editable_index(&resize.id) else {
            return false;
        };

        let previous = self.events()[index].clone();
        let change = EventChange {
            path: resize.id.clone(),
            kind: ChangeKind::Resize,
            start: resize.start,
            end: resize.end,
            all_day: previous.all_day,
            all_day_changed: false,
        };

        self.apply_change(index, &change);
        self.persist(writer, change, previous).await
    }

    fn apply_change(&mut self, index: usize, change: &EventChange) {
        let Some(event) = self.props_mut().and_then(|p| p.events.get_mut(index)) else {
            return;
        };
        event.start = change.start;
        event.end = change.end.unwrap_or_else(|| default_end(&change.start));
        event.all_day = change.all_day;
    }

    async fn persist<W: EventWriter>(&mut self, writer: &W, change: EventChange, previous: CalendarEvent) -> bool {
        match writer.write_change(&change).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Could not save {}: {}", change.path, e);
                if let Some(event) = self
                    .props_mut()
                    .and_then(|p| p.events.iter_mut().find(|e| e.id == previous.id))
                {
                    *event = previous;
                }
                false
            }
        }
    }

    /// Validate a grid selection; `None` when the calendar can't take one.
    pub fn handle_select(&self, start: NaiveDateTime, end: NaiveDateTime, all_day: bool) -> Option<Selection> {
        if !self.mounted || self.props().is_none() {
            return None;
        }
        let end = if end > start { end } else { default_end(&start) };
        Some(Selection { start, end, all_day })
    }
}

/// First day shown for `date` in `mode`.
pub fn anchor_for(mode: ViewMode, date: NaiveDate, week_start_day: u8) -> NaiveDate {
    match mode {
        ViewMode::ThreeDay => date,
        ViewMode::FiveDay => {
            let offset = (date.weekday().num_days_from_sunday() + 7 - week_start_day as u32 % 7) % 7;
            date - Duration::days(offset as i64)
        }
        ViewMode::Month => date.with_day(1).unwrap_or(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BaseCalResult;
    use crate::extract::{extract_entries, EntryBindings};
    use crate::query::QueryEntry;
    use crate::vault::Note;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
        date(2024, 3, d).and_hms_opt(h, m, 0).unwrap()
    }

    fn entry(path: &str, yaml: &str) -> QueryEntry {
        let (frontmatter, body) =
            crate::frontmatter::parse_note(path, &format!("---\n{}---\n", yaml)).unwrap();
        QueryEntry::new(
            Note {
                path: path.to_string(),
                frontmatter,
                body,
                modified: None,
                created: None,
            },
            BTreeMap::new(),
        )
    }

    fn config(yaml: &str) -> ViewConfiguration {
        ViewConfiguration::from_map(&serde_yaml::from_str(yaml).unwrap())
    }

    fn events(records: &[QueryEntry], cfg: &ViewConfiguration) -> Vec<CalendarEvent> {
        let start = cfg.start_property.clone().unwrap();
        let bindings = EntryBindings {
            start: &start,
            end: cfg.end_property.as_ref(),
            title: cfg.title_property.as_ref(),
        };
        extract_entries(records, bindings)
            .iter()
            .map(|e| CalendarEvent::from_entry(e, cfg, &EventStyles::default()))
            .collect()
    }

    #[test]
    fn event_mapping_defaults() {
        let cfg = config("startDate: note.start\n");
        let records = vec![entry("Meetings/Standup.md", "start: 2024-03-01 09:00\n")];
        let event = &events(&records, &cfg)[0];

        assert_eq!(event.id, "Meetings/Standup.md");
        assert_eq!(event.title, "Standup");
        assert_eq!(event.end, dt(1, 10, 0));
        assert!(!event.all_day);
        assert_eq!(event.priority, "normal");
        assert_eq!(event.status, "open");
        assert_eq!(event.color, "#3788d8");
        assert!(event.text_styles.is_empty());
    }

    #[test]
    fn event_mapping_reads_priority_status_and_display_title() {
        let cfg = config("startDate: note.start\nendDate: note.end\norder: [note.summary]\nstatusProperty: note.state\n");
        let records = vec![entry(
            "a.md",
            "start: 2024-03-01\nend: 2024-03-02\nsummary: Offsite\npriority: HIGH\nstate: Done\n",
        )];
        let event = &events(&records, &cfg)[0];

        assert_eq!(event.title, "Offsite");
        assert!(event.all_day);
        assert_eq!(event.priority, "high");
        assert_eq!(event.color, "#f97316");
        assert_eq!(event.status, "done");
        assert_eq!(event.text_styles, vec!["strikethrough", "dimmed"]);
    }

    #[test]
    fn all_day_needs_both_ends_at_midnight() {
        let cfg = config("startDate: note.start\nendDate: note.end\n");
        let records = vec![
            entry("a.md", "start: 2024-03-01\n"),
            entry("b.md", "start: 2024-03-01\nend: 2024-03-01 12:00\n"),
        ];
        let evs = events(&records, &cfg);
        assert!(!evs[0].all_day, "default end is one hour after midnight");
        assert!(!evs[1].all_day);
    }

    #[test]
    fn anchors_per_view_mode() {
        // 2024-03-06 is a Wednesday.
        let wed = date(2024, 3, 6);
        assert_eq!(anchor_for(ViewMode::ThreeDay, wed, 1), wed);
        assert_eq!(anchor_for(ViewMode::FiveDay, wed, 1), date(2024, 3, 4));
        assert_eq!(anchor_for(ViewMode::FiveDay, wed, 0), date(2024, 3, 3));
        assert_eq!(anchor_for(ViewMode::Month, wed, 1), date(2024, 3, 1));
    }

    fn mounted(cfg: &ViewConfiguration, evs: Vec<CalendarEvent>) -> CalendarRenderer {
        let mut renderer = CalendarRenderer::new(date(2024, 3, 1));
        renderer.mount();
        renderer.render(RenderContent::Calendar(RenderProps::new(cfg, evs, CondenseLevel::default())));
        renderer
    }

    #[test]
    fn navigation_moves_by_windows() {
        let cfg = config("startDate: note.start\nnavStep: 2\n");
        let mut r = mounted(&cfg, Vec::new());

        r.navigate(Direction::Next);
        assert_eq!(r.anchor(), date(2024, 3, 7));

        r.switch_view_mode(ViewMode::Month);
        assert_eq!(r.anchor(), date(2024, 3, 1));
        r.navigate(Direction::Previous);
        assert_eq!(r.anchor(), date(2024, 1, 1));
        assert_eq!(r.visible_range(), (date(2024, 1, 1), date(2024, 2, 1)));
    }

    #[test]
    fn refresh_keeps_scroll_and_user_view_mode() {
        let cfg = config("startDate: note.start\n");
        let mut r = mounted(&cfg, Vec::new());
        r.set_scroll_top(420.0);
        r.switch_view_mode(ViewMode::Month);

        r.render(RenderContent::Calendar(RenderProps::new(&cfg, Vec::new(), CondenseLevel::default())));
        assert_eq!(r.scroll_top(), 420.0);
        assert_eq!(r.view_mode(), ViewMode::Month);

        let changed = config("startDate: note.start\nviewMode: 5day\n");
        r.render(RenderContent::Calendar(RenderProps::new(&changed, Vec::new(), CondenseLevel::default())));
        assert_eq!(r.view_mode(), ViewMode::FiveDay);
    }

    #[test]
    fn frame_lists_only_visible_events() {
        let cfg = config("startDate: note.start\n");
        let records = vec![
            entry("in.md", "start: 2024-03-02 09:00\n"),
            entry("out.md", "start: 2024-03-09 09:00\n"),
        ];
        let r = mounted(&cfg, events(&records, &cfg));

        let Frame::Calendar(frame) = r.frame().unwrap() else {
            panic!("expected calendar frame");
        };
        assert_eq!(frame.events.len(), 1);
        assert_eq!(frame.events[0].id, "in.md");
        assert_eq!(frame.slot_height_css, "--basecal-slot-height: 32.58px");
    }

    #[test]
    fn unmounted_renderer_has_no_frame() {
        let mut r = CalendarRenderer::new(date(2024, 3, 1));
        assert!(matches!(r.frame(), Err(BaseCalError::Unmounted)));
        r.mount();
        r.render(RenderContent::Empty("Choose a start date property".into()));
        assert!(matches!(r.frame(), Ok(Frame::Empty { .. })));
    }

    struct FakeWriter {
        fail: bool,
        seen: RefCell<Vec<EventChange>>,
    }

    impl EventWriter for FakeWriter {
        async fn write_change(&self, change: &EventChange) -> BaseCalResult<()> {
            self.seen.borrow_mut().push(change.clone());
            if self.fail {
                Err(BaseCalError::WriteBack("disk full".into()))
            } else {
                Ok(())
            }
        }
    }

    fn writer(fail: bool) -> FakeWriter {
        FakeWriter {
            fail,
            seen: RefCell::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn drop_updates_optimistically_and_persists() {
        let cfg = config("startDate: note.start\nendDate: note.end\n");
        let records = vec![entry("a.md", "start: 2024-03-01 09:00\nend: 2024-03-01 10:00\n")];
        let mut r = mounted(&cfg, events(&records, &cfg));
        let w = writer(false);

        let saved = r
            .handle_event_drop(&w, EventDrop { id: "a.md".into(), start: dt(2, 0, 0), end: None, all_day: true })
            .await;

        assert!(saved);
        assert_eq!(r.event("a.md").unwrap().start, dt(2, 0, 0));
        assert!(r.event("a.md").unwrap().all_day);
        let seen = w.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].all_day_changed);
    }

    #[tokio::test]
    async fn failed_write_reverts() {
        let cfg = config("startDate: note.start\nendDate: note.end\n");
        let records = vec![entry("a.md", "start: 2024-03-01 09:00\nend: 2024-03-01 10:00\n")];
        let mut r = mounted(&cfg, events(&records, &cfg));
        let before = r.event("a.md").cloned();

        let saved = r
            .handle_event_resize(&writer(true), EventResize { id: "a.md".into(), start: dt(1, 9, 0), end: Some(dt(1, 12, 0)) })
            .await;

        assert!(!saved);
        assert_eq!(r.event("a.md").cloned(), before);
    }

    #[tokio::test]
    async fn read_only_and_endless_changes_are_refused() {
        let cfg = config("startDate: formula.when\n");
        let mut r = mounted(&cfg, Vec::new());
        let w = writer(false);
        assert!(!r.handle_event_drop(&w, EventDrop { id: "a.md".into(), start: dt(1, 9, 0), end: None, all_day: false }).await);

        let cfg = config("startDate: note.start\n");
        let records = vec![entry("a.md", "start: 2024-03-01 09:00\n")];
        let mut r = mounted(&cfg, events(&records, &cfg));
        assert!(!r.handle_event_resize(&w, EventResize { id: "a.md".into(), start: dt(1, 9, 0), end: None }).await);
        assert!(w.seen.borrow().is_empty());
    }
}
