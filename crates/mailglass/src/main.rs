//! `mailglass` - Gmail inbox in the terminal
//!
//! Lists inbox pages through the Gmail REST API and renders message bodies
//! after classification and sanitization.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod output;
mod settings;

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailglass_content::{ContentKind, classify, is_content_safe, render};
use mailglass_core::{RawMessage, normalize_batch};
use mailglass_gmail::{
    GmailClient, InboxQuery, RefreshingToken, StaticToken, Token, TokenSource,
};

use cli::{Cli, Command, InboxArgs, RenderArgs, ShowArgs};
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailglass=info,mailglass_gmail=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings_path = cli.settings.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path).await?;

    match cli.command {
        Command::Inbox(args) => inbox(args, &settings).await,
        Command::Show(args) => show(&args).await,
        Command::Render(args) => render_file(&args).await,
    }
}

async fn inbox(args: InboxArgs, settings: &Settings) -> Result<()> {
    let mut query = InboxQuery::new()
        .with_category(args.category.unwrap_or(settings.category))
        .with_max_results(args.max.unwrap_or(settings.page_size));
    if let Some(search) = args.search {
        query = query.with_search(search);
    }
    if let Some(token) = args.page_token {
        query = query.with_page_token(token);
    }

    match (args.refresh_token, settings.client_id.as_deref()) {
        (Some(refresh), Some(client_id)) => {
            let token = match args.access_token {
                Some(access) => Token::bearer(access),
                // Expired on arrival so the first request refreshes it
                None => Token::bearer("").with_expires_at(Utc::now()),
            }
            .with_refresh_token(refresh);

            let mut source = RefreshingToken::new(client_id, token);
            if let Some(secret) = &settings.client_secret {
                source = source.with_client_secret(secret);
            }
            list_inbox(client(source, settings)?, &query, args.json).await
        }
        (refresh, _) => {
            if refresh.is_some() {
                tracing::warn!("Refresh token given but no client_id in settings, ignoring it");
            }
            let Some(access) = args.access_token else {
                bail!(
                    "No credentials: set MAILGLASS_ACCESS_TOKEN, or MAILGLASS_REFRESH_TOKEN with client_id in {}",
                    Settings::default_path().display()
                );
            };
            list_inbox(client(StaticToken::new(access), settings)?, &query, args.json).await
        }
    }
}

fn client<T: TokenSource>(tokens: T, settings: &Settings) -> Result<GmailClient<T>> {
    let client = GmailClient::new(tokens);
    match &settings.api_base {
        Some(base) => client
            .with_base_url(base)
            .with_context(|| format!("Invalid api_base '{base}'")),
        None => Ok(client),
    }
}

async fn list_inbox<T: TokenSource>(
    client: GmailClient<T>,
    query: &InboxQuery,
    json: bool,
) -> Result<()> {
    info!(q = %query.search_query(), "Fetching inbox");
    let page = client
        .fetch_inbox(query)
        .await
        .context("Failed to fetch inbox")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    for record in &page.messages {
        println!("{}", output::record_line(record));
    }
    println!(
        "\n{} shown, about {} in total",
        page.messages.len(),
        page.result_size_estimate
    );
    if let Some(token) = &page.next_page_token {
        println!("Next page: --page-token {token}");
    }
    Ok(())
}

async fn show(args: &ShowArgs) -> Result<()> {
    let json = read_input(&args.file).await?;
    let raws = if json.trim_start().starts_with('[') {
        RawMessage::from_json_list(&json)
    } else {
        RawMessage::from_json(&json).map(|raw| vec![raw])
    }
    .with_context(|| format!("{} is not a Gmail message resource", args.file.display()))?;

    let records = normalize_batch(&raws);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            println!("\n{}\n", "-".repeat(72));
        }
        println!("{}\n", output::record_details(record));
        println!("{}", output::record_body(record, false));
    }
    Ok(())
}

async fn render_file(args: &RenderArgs) -> Result<()> {
    let body = read_input(&args.file).await?;
    let hint = args.kind.map(ContentKind::from);

    let classification = classify(&body);
    info!(
        detected = classification.kind().as_str(),
        confidence = classification.confidence(),
        "Classified body"
    );
    if !body.trim().is_empty() && !is_content_safe(&body) {
        tracing::warn!("Body contains active content; it is removed from the output");
    }

    let rendered = render(&body, hint);
    println!("{}", output::body_text(&body, &rendered, args.html));
    Ok(())
}

async fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        tokio::io::stdin()
            .read_to_string(&mut input)
            .await
            .context("Failed to read standard input")?;
        return Ok(input);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
