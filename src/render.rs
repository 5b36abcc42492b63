//! TUI rendering traits for basecal types.

use basecal_core::menu::Menu;
use basecal_core::render::{CalendarEvent, Frame, RenderFrame};
use basecal_core::settings::PluginSettings;
use basecal_core::style::{format_style_map, parse_hex_color};
use chrono::{Duration, NaiveDate};
use owo_colors::{OwoColorize, Style};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Terminal style for an event: its priority color plus its status styles.
fn event_style(event: &CalendarEvent) -> Style {
    let mut style = Style::new();
    if let Some((r, g, b)) = parse_hex_color(&event.color) {
        style = style.truecolor(r, g, b);
    }
    for text_style in &event.text_styles {
        style = match text_style.as_str() {
            "bold" => style.bold(),
            "italic" => style.italic(),
            "dimmed" => style.dimmed(),
            "underline" => style.underline(),
            "strikethrough" => style.strikethrough(),
            _ => style,
        };
    }
    style
}

impl Render for CalendarEvent {
    fn render(&self) -> String {
        let time = if self.all_day {
            "all day".to_string()
        } else {
            format!("{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
        };
        format!(
            "{:>11}  {} {}",
            time.dimmed(),
            self.title.style(event_style(self)),
            format!("({})", self.id).dimmed()
        )
    }
}

impl Render for RenderFrame {
    fn render(&self) -> String {
        let last_day = self.range_end - Duration::days(1);
        let mut lines = vec![format!(
            "📅 {} {} {}",
            self.view_mode.label().bold(),
            format!("{} → {}", self.range_start, last_day).dimmed(),
            if self.editable { "" } else { "(read-only)" }
        )
        .trim_end()
        .to_string()];

        if self.events.is_empty() {
            lines.push("   No events".dimmed().to_string());
            return lines.join("\n");
        }

        let mut current: Option<NaiveDate> = None;
        for event in &self.events {
            let day = event.start.date().max(self.range_start);
            if current != Some(day) {
                lines.push(String::new());
                lines.push(format!("   {}", day.format("%a %Y-%m-%d").to_string().bold()));
                current = Some(day);
            }
            lines.push(format!("   {}", event.render()));
        }

        lines.join("\n")
    }
}

impl Render for Frame {
    fn render(&self) -> String {
        match self {
            Frame::Empty { message } => format!("   {}", message.yellow()),
            Frame::Calendar(frame) => frame.render(),
        }
    }
}

impl Render for Menu {
    fn render(&self) -> String {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("   {} {}", format!("{}.", i + 1).dimmed(), item.title))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Render for PluginSettings {
    fn render(&self) -> String {
        let sidebar = self.sidebar_base().unwrap_or("(none)");
        [
            format!("{}  {}", "Priority colors:".dimmed(), format_style_map(&self.priority_colors)),
            format!("{}    {}", "Status styles:".dimmed(), format_style_map(&self.status_styles)),
            format!("{}     {}", "Sidebar base:".dimmed(), sidebar),
        ]
        .join("\n")
    }
}
