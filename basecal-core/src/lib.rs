//! Calendar views over the date properties of Markdown notes.
//!
//! This crate provides everything the `basecal` CLI drives:
//! - the vault model (`vault`, `frontmatter`, `value`, `query`)
//! - entry extraction, the rendering model and frontmatter write-back
//! - event creation, context menus and the plugin shell with its settings

pub mod app_config;
pub mod create;
pub mod datetime;
pub mod debounce;
pub mod error;
pub mod extract;
pub mod frontmatter;
pub mod host;
pub mod local_cache;
pub mod menu;
pub mod plugin;
pub mod query;
pub mod render;
pub mod schema;
pub mod settings;
pub mod style;
pub mod value;
pub mod vault;
pub mod view;
pub mod view_config;
pub mod watch;
pub mod writeback;

pub use error::{BaseCalError, BaseCalResult};
