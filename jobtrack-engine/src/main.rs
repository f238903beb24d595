//! jobtrack - terminal order tracker
//!
//! Fetches every registered source once, joins linked production reports
//! onto the order headers and prints the filtered, sorted result. With
//! `--interactive` the query can be refined line by line on stdin.

use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, warn};

use jobtrack_common::config::{ConfigOrigin, ConfigResolver};
use jobtrack_common::dates::today;
use jobtrack_engine::console::{
    parse_category, parse_field_search, parse_line, ConsoleCommand, HELP,
};
use jobtrack_engine::render::{render_json_lines, HighlightStyle, TextRenderer};
use jobtrack_engine::{
    load_catalog, FilterState, HttpSourceFetcher, PresenceFilter, SearchScope, Session,
    SessionView, SortOrder, SourceRegistry, ViewCommand,
};

/// Order tracking across the order header and production report sources
#[derive(Debug, Parser)]
#[command(name = "jobtrack", version, about)]
struct Cli {
    /// Configuration file (overrides JOBTRACK_CONFIG and the user config)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Global search text
    #[arg(long, default_value = "")]
    search: String,

    /// Fields covered by the global search
    #[arg(long, default_value = "linked")]
    scope: SearchScope,

    /// Job number search text
    #[arg(long, default_value = "")]
    job: String,

    /// Job series prefix (H, J, ...) or ALL
    #[arg(long)]
    series: Option<String>,

    /// Exact field match, repeatable
    #[arg(long = "category", value_name = "KEY=VALUE")]
    categories: Vec<String>,

    /// Case-insensitive substring match on one field, repeatable
    #[arg(long = "contains", value_name = "KEY=TEXT")]
    field_searches: Vec<String>,

    /// U46 code presence: all, with or without
    #[arg(long, default_value = "all")]
    u46: PresenceFilter,

    /// Image presence: all, with or without
    #[arg(long, default_value = "all")]
    image: PresenceFilter,

    /// Delivery date direction: asc or desc
    #[arg(long, default_value = "asc")]
    sort: SortOrder,

    /// Number of window steps to show
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,

    /// Print one JSON object per record instead of text cards
    #[arg(long)]
    json: bool,

    /// Read further commands from stdin
    #[arg(long)]
    interactive: bool,
}

impl Cli {
    fn filter_state(&self) -> Result<FilterState> {
        let mut filter = FilterState {
            search: self.search.clone(),
            job_search: self.job.clone(),
            u46: self.u46,
            image: self.image,
            search_scope: self.scope,
            ..Default::default()
        };
        if let Some(series) = &self.series {
            filter.series = series.parse()?;
        }
        for entry in &self.categories {
            let (key, choice) = parse_category(entry)?;
            filter = filter.with_category(key, choice);
        }
        for entry in &self.field_searches {
            let (key, text) = parse_field_search(entry)?;
            filter = filter.with_field_search(key, text);
        }
        Ok(filter)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, origin) = ConfigResolver::new(cli.config.clone()).resolve()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting jobtrack v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    // Resolution ran before the subscriber existed; report it here
    match &origin {
        ConfigOrigin::CompiledDefaults => warn!("No config file found, using compiled defaults"),
        other => info!(origin = ?other, sources = config.sources.len(), "Configuration loaded"),
    }

    let registry = SourceRegistry::from_config(&config.sources)?;
    let fetcher = HttpSourceFetcher::new(&config.http)?;

    let mut session = Session::new(config.window);
    session.apply(ViewCommand::ReplaceFilter(cli.filter_state()?));
    session.apply(ViewCommand::ReplaceSort(cli.sort));

    session.finish_load(load_catalog(&fetcher, &registry).await);
    if let SessionView::Failed(message) = session.view() {
        bail!("{}", message);
    }
    for _ in 1..cli.pages {
        session.apply(ViewCommand::Grow);
    }

    let style = if std::io::stdout().is_terminal() {
        HighlightStyle::Ansi
    } else {
        HighlightStyle::Brackets
    };
    let renderer = TextRenderer::new(style, today());
    print_view(&session, &renderer, cli.json)?;

    if cli.interactive {
        run_console(&mut session, &renderer, cli.json)?;
    }

    Ok(())
}

fn print_view(session: &Session, renderer: &TextRenderer, json: bool) -> Result<()> {
    let view = session.view();
    let text = match (&view, json) {
        (SessionView::Ready(result), true) => render_json_lines(result)?,
        _ => renderer.render(&view),
    };
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn run_console(session: &mut Session, renderer: &TextRenderer, json: bool) -> Result<()> {
    let stdin = std::io::stdin();
    eprint!("> ");
    for line in stdin.lock().lines() {
        let line = line?;
        match parse_line(&line, session.filter()) {
            Ok(ConsoleCommand::Quit) => break,
            Ok(ConsoleCommand::Help) => eprintln!("{}", HELP),
            Ok(ConsoleCommand::View(command)) => {
                session.apply(command);
                print_view(session, renderer, json)?;
            }
            Err(e) => eprintln!("{}", e),
        }
        eprint!("> ");
    }
    Ok(())
}
