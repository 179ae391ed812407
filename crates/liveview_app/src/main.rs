//! Terminal client for the live-update dashboard and chat pages.

mod platform;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use liveview_core::PageKind;

use platform::LogDestination;

/// Live view terminal client.
#[derive(Parser, Debug)]
#[command(name = "liveview_app", about = "Live-updating dashboard and chat client")]
struct Cli {
    /// Page to mount.
    page: PageArg,

    /// Path to the RON config file.
    #[arg(long, default_value = platform::CONFIG_FILENAME)]
    config: PathBuf,

    /// Overrides the configured user id.
    #[arg(long)]
    user_id: Option<u64>,

    /// Where log output goes (overrides the config file).
    #[arg(long, value_enum)]
    log: Option<LogDestination>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PageArg {
    Dashboard,
    Chat,
}

impl From<PageArg> for PageKind {
    fn from(page: PageArg) -> Self {
        match page {
            PageArg::Dashboard => PageKind::Dashboard,
            PageArg::Chat => PageKind::Chat,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = platform::load_config(&cli.config);
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    if let Some(user_id) = cli.user_id {
        config.user_id = user_id;
    }
    if let Some(log) = cli.log {
        config.log = log;
    }

    platform::initialize_logging(config.log);
    platform::run_app(cli.page.into(), config)
}
