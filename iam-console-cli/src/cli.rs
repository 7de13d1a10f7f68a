//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use iam_console_core::screens::AnnouncementStatus;

#[derive(Debug, Parser)]
#[command(name = "iam-console", version, about = "IAM administration console")]
pub struct Cli {
    /// Config file (defaults to `<config_dir>/iam-console/config.toml`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Work against built-in sample data instead of the backend
    #[arg(long, global = true)]
    pub offline: bool,

    /// Rows per page (overrides the config file)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// System announcements
    #[command(subcommand)]
    Announcements(AnnouncementCommand),
    /// Mail templates
    #[command(subcommand)]
    MailTemplates(MailTemplateCommand),
    /// Projects of the current user in one organization
    Projects {
        /// Organization id (defaults to the configured organization scope)
        #[arg(long)]
        org: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum AnnouncementCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        /// Only show these statuses (repeatable)
        #[arg(long = "status")]
        statuses: Vec<AnnouncementStatus>,
    },
    /// Schedule a new announcement
    Create {
        /// HTML content
        #[arg(long)]
        content: String,
        /// Send time, `YYYY-MM-DD HH:MM:SS`
        #[arg(long, conflicts_with = "in_minutes")]
        send_time: Option<String>,
        /// Send this many minutes from now
        #[arg(long)]
        in_minutes: Option<i64>,
    },
    Delete {
        task_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum MailTemplateCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        /// Free-text search terms (repeatable)
        #[arg(long = "search")]
        terms: Vec<String>,
    },
    /// Full detail of one template
    Show {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Clone, Copy, Args)]
pub struct PageArgs {
    /// 1-based page number
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}
