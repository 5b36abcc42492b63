mod commands;
mod host;
mod render;
mod when;

use std::path::PathBuf;

use anyhow::{Context, Result};
use basecal_core::app_config::AppConfig;
use basecal_core::plugin::CalendarPlugin;
use basecal_core::vault::Vault;
use basecal_core::view_config::ViewMode;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};

use commands::config::ConfigChange;
use commands::new::NewOptions;
use commands::reschedule::MoveOptions;
use commands::settings::SettingsChange;
use commands::show::ShowOptions;
use host::TerminalHost;

#[derive(Parser)]
#[command(name = "basecal")]
#[command(about = "Calendar views over the date properties of your Markdown notes")]
struct Cli {
    /// Vault directory (defaults to `vault` from config.toml)
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a calendar view of a base file
    Show {
        base: String,

        /// View to show (defaults to the first calendar view)
        #[arg(long)]
        view: Option<String>,

        /// Layout: 3day, 5day or month
        #[arg(short, long)]
        mode: Option<ViewMode>,

        /// Date to show (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Move this many windows forward (negative goes back)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        page: i32,

        /// Print the render frame as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a calendar and re-render it when notes change
    Watch {
        base: String,

        #[arg(long)]
        view: Option<String>,

        #[arg(short, long)]
        mode: Option<ViewMode>,
    },
    /// Move an event to a new time
    Move {
        base: String,
        note: String,

        /// New start (e.g. "tomorrow 3pm" or "2025-03-20 15:00")
        #[arg(short, long)]
        start: String,

        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        /// Duration (e.g. "30m", "1h 30m")
        #[arg(short, long, conflicts_with = "end")]
        duration: Option<String>,

        #[arg(long)]
        all_day: bool,
    },
    /// Change when an event ends
    Resize {
        base: String,
        note: String,

        #[arg(short, long)]
        end: String,
    },
    /// Create an event note
    New {
        base: String,

        #[arg(short, long)]
        start: String,

        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        #[arg(short, long, conflicts_with = "end")]
        duration: Option<String>,

        #[arg(long)]
        all_day: bool,

        /// Event title (prompted for when missing)
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Set a view's condense level (0-220)
    Zoom { base: String, level: i64 },
    /// Show an event's context menu
    Menu {
        base: String,
        note: String,

        /// Run this item without asking
        #[arg(long)]
        item: Option<String>,
    },
    /// Open the default calendar
    Sidebar,
    /// Show or change plugin settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Show or change the global config file
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Print the view configuration schema as JSON
    Schema,
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    /// Vault directory opened when --vault is not given
    Vault { path: String },
    /// Layout for views that don't set one: 3day, 5day, month or none
    DefaultMode { mode: String },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    /// Priority colors, e.g. "high:#ff0000; low:#00ff00"
    PriorityColors { map: String },
    /// Status styles, e.g. "done:strikethrough|dimmed"
    StatusStyles { map: String },
    /// Base file opened by `sidebar` (empty to unset)
    SidebarBase { path: String },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("basecal")
        .build();
    if let Err(e) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Could not initialise logging: {}", e);
    }
}

fn run_config(app_config: &AppConfig, action: Option<ConfigAction>) -> Result<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => commands::config::show(app_config),
        ConfigAction::Vault { path } => commands::config::update(ConfigChange::Vault(path)),
        ConfigAction::DefaultMode { mode } => commands::config::update(ConfigChange::DefaultMode(mode)),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Schema = cli.command {
        return commands::schema::run();
    }

    let app_config = AppConfig::load()?;
    // Runs without a vault so a wrong vault path can be fixed.
    if let Commands::Config { action } = cli.command {
        return run_config(&app_config, action);
    }
    let vault_root = cli.vault.unwrap_or_else(|| app_config.vault_path());
    let vault = Vault::open(&vault_root)
        .with_context(|| format!("Could not open vault at {}", vault_root.display()))?;
    let mut plugin = CalendarPlugin::load(vault).await;
    let host = TerminalHost::new(vault_root);

    match cli.command {
        Commands::Show {
            base,
            view,
            mode,
            date,
            page,
            json,
        } => {
            let options = ShowOptions {
                view,
                mode,
                date,
                page,
                json,
            };
            commands::show::run(&plugin, &host, &base, options, app_config.default_view_mode).await
        }
        Commands::Watch { base, view, mode } => {
            let mode = mode.or(app_config.default_view_mode);
            commands::watch::run(&plugin, &host, &base, view.as_deref(), mode).await
        }
        Commands::Move {
            base,
            note,
            start,
            end,
            duration,
            all_day,
        } => {
            let options = MoveOptions {
                start,
                end,
                duration,
                all_day,
            };
            commands::reschedule::run_move(&plugin, &host, &base, &note, options).await
        }
        Commands::Resize { base, note, end } => {
            commands::reschedule::run_resize(&plugin, &host, &base, &note, &end).await
        }
        Commands::New {
            base,
            start,
            end,
            duration,
            all_day,
            title,
        } => {
            let host = host.with_title(title);
            let options = NewOptions {
                start,
                end,
                duration,
                all_day,
            };
            commands::new::run(&plugin, &host, &base, options).await
        }
        Commands::Zoom { base, level } => commands::zoom::run(&plugin, &host, &base, level).await,
        Commands::Menu { base, note, item } => {
            commands::menu::run(&plugin, &host, &base, &note, item.as_deref()).await
        }
        Commands::Sidebar => commands::sidebar::run(&plugin, &host).await,
        Commands::Settings { action } => match action.unwrap_or(SettingsAction::Show) {
            SettingsAction::Show => commands::settings::show(&plugin),
            SettingsAction::PriorityColors { map } => {
                commands::settings::update(&mut plugin, SettingsChange::PriorityColors(map)).await
            }
            SettingsAction::StatusStyles { map } => {
                commands::settings::update(&mut plugin, SettingsChange::StatusStyles(map)).await
            }
            SettingsAction::SidebarBase { path } => {
                commands::settings::update(&mut plugin, SettingsChange::SidebarBase(path)).await
            }
        },
        Commands::Config { action } => run_config(&app_config, action),
        Commands::Schema => commands::schema::run(),
    }
}
