//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mailglass_content::ContentKind;
use mailglass_core::Category;

#[derive(Debug, Parser)]
#[command(
    name = "mailglass",
    about = "Read a Gmail inbox in the terminal, with HTML and Markdown bodies rendered safely",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Settings file (default: <config dir>/mailglass/settings.json)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch one page of the inbox and list it, most recent first
    Inbox(InboxArgs),
    /// Normalize a saved Gmail message and print its record and body
    Show(ShowArgs),
    /// Classify and render a message body
    Render(RenderArgs),
}

#[derive(Debug, Args)]
pub struct InboxArgs {
    /// Inbox tab to list (default from settings)
    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,

    /// Extra Gmail search terms, e.g. "is:unread from:alice"
    #[arg(long)]
    pub search: Option<String>,

    /// Messages per page (default from settings)
    #[arg(long)]
    pub max: Option<u32>,

    /// Continue from a previous page
    #[arg(long)]
    pub page_token: Option<String>,

    /// Print the page as JSON
    #[arg(long)]
    pub json: bool,

    /// Bearer token for the Gmail API
    #[arg(long, env = "MAILGLASS_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Refresh token; needs `client_id` in settings
    #[arg(long, env = "MAILGLASS_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// JSON file holding a message resource, or an array of them
    pub file: PathBuf,

    /// Print records as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Body file; `-` reads standard input
    pub file: PathBuf,

    /// Treat the body as this kind instead of detecting it
    #[arg(long = "as", value_enum)]
    pub kind: Option<KindArg>,

    /// Print the HTML produced for HTML and Markdown bodies
    #[arg(long)]
    pub html: bool,
}

/// Content kind as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Text,
    Html,
    Markdown,
}

impl From<KindArg> for ContentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Text => Self::Text,
            KindArg::Html => Self::Html,
            KindArg::Markdown => Self::Markdown,
        }
    }
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::ALL
        .into_iter()
        .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| {
            let names: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
            format!("unknown category '{s}', expected one of: {}", names.join(", "))
        })
}
