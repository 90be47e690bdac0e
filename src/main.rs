//! websearx command line: search, scrape, or serve the JSON tool API

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};
use websearx::{
    config,
    query::{normalize_time_range, parse_max_results, parse_url_list},
    web::{create_router, AppState},
    BatchResult, SearchResult, WebSearch,
};

const SUBCOMMANDS: &[&str] = &["search", "scrape", "serve", "help"];

/// Resilient web search and content retrieval
#[derive(Parser)]
#[command(name = "websearx", version, about)]
struct Cli {
    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Search the web
    Search {
        /// Query words
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Restrict to the last day, month or year
        #[arg(short, long)]
        time: Option<String>,

        /// Maximum number of results
        #[arg(short, long, allow_hyphen_values = true)]
        limit: Option<String>,

        /// Fetch the full text of every result
        #[arg(short, long)]
        scrape: bool,

        /// Print JSON instead of text
        #[arg(short, long)]
        json: bool,
    },

    /// Retrieve the text of one or more URLs
    Scrape {
        #[arg(required = true, num_args = 1..)]
        urls: Vec<String>,

        /// Print JSON instead of text
        #[arg(short, long)]
        json: bool,
    },

    /// Run the JSON tool server
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = with_implicit_search(std::env::args().collect());
    if args.len() < 2 {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }
    let cli = Cli::parse_from(args);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };
    let serving = matches!(command, Command::Serve { .. });
    let log_filter = init_logging(cli.verbose, serving);
    let mut settings = config::load()?;
    if settings.general.debug && !cli.verbose && std::env::var_os("RUST_LOG").is_none() {
        log_filter.reload(EnvFilter::new(default_directive(true, serving)))?;
    }

    match command {
        Command::Search {
            query,
            time,
            limit,
            scrape,
            json,
        } => {
            let service = WebSearch::from_settings(&settings)?;
            let max_results =
                parse_max_results(limit.as_deref(), settings.search.default_max_results);
            let results = service
                .search(
                    &query.join(" "),
                    normalize_time_range(time.as_deref()),
                    scrape,
                    Some(max_results),
                )
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&results);
            }
        }
        Command::Scrape { urls, json } => {
            let service = WebSearch::from_settings(&settings)?;
            let urls: Vec<String> = urls.iter().flat_map(|u| parse_url_list(u)).collect();
            let content = service.get_url_content(&urls).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&content)?);
            } else {
                print_content(&urls, &content);
            }
        }
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);
            let state = AppState::new(settings)?;
            let app = create_router(state);

            info!("Starting websearx v{} on http://{}", websearx::VERSION, addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

/// Treat an unrecognized first argument as the start of a search query
fn with_implicit_search(mut args: Vec<String>) -> Vec<String> {
    if let Some(first) = args.get(1) {
        if !first.starts_with('-') && !SUBCOMMANDS.contains(&first.as_str()) {
            args.insert(1, "search".to_string());
        }
    }
    args
}

fn default_directive(verbose: bool, serving: bool) -> &'static str {
    match (verbose, serving) {
        (true, _) => "websearx=debug",
        (false, true) => "websearx=info",
        (false, false) => "websearx=warn",
    }
}

/// Logs go to stderr so stdout stays machine readable
///
/// The filter stays reloadable so the `debug` setting can raise the level
/// once settings are loaded.
fn init_logging(verbose: bool, serving: bool) -> reload::Handle<EnvFilter, Registry> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, serving)));
    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
    handle
}

fn print_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }
    for (i, result) in results.iter().enumerate() {
        println!("{}. {}", i + 1, result.title);
        println!("   {}", result.url);
        if let Some(ref snippet) = result.snippet {
            println!("   {}", snippet);
        }
        if let Some(ref content) = result.full_content {
            println!();
            println!("{}", content);
        }
        println!();
    }
}

fn print_content(urls: &[String], content: &BatchResult) {
    match content {
        BatchResult::Single(text) => println!("{}", text),
        BatchResult::Positional(map) => {
            for (position, text) in map {
                let url = urls.get(*position).map(String::as_str).unwrap_or_default();
                println!("[{}] {}", position, url);
                println!("{}", text);
                println!();
            }
        }
    }
}
