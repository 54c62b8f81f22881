use crate::render::{TerminalRenderer, format_metadata};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use netgraph_core::config::resolve_worker;
use netgraph_core::{ConfigFile, GraphConfig};
use netgraph_pipeline::{
    DataSource, DataUpdatePipeline, GraphState, JsonSourceParser, MetadataPanel,
    NavigationHistory, PendingFetch, SearchSyncController, build_client,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use url::Url;

/// Build the graph configuration from an optional config file plus CLI flags.
///
/// Flags win over the file: `--metadata` turns counters on, `--worker`
/// replaces whatever worker the file names.
pub fn load_config(
    config_path: Option<&PathBuf>,
    metadata: bool,
    worker: Option<&str>,
) -> Result<GraphConfig, String> {
    let file = match config_path {
        Some(path) => ConfigFile::load(path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => ConfigFile::default(),
    };

    let mut config = file.into_config().map_err(|e| e.to_string())?;
    if metadata {
        config.metadata = true;
    }
    if let Some(name) = worker {
        config.worker = Some(resolve_worker(name).map_err(|e| e.to_string())?);
    }
    Ok(config)
}

/// A graph instance wired to the terminal.
pub struct Session {
    pub pipeline: Arc<DataUpdatePipeline>,
    pub renderer: Arc<TerminalRenderer>,
    pub panel: Arc<MetadataPanel>,
    pub client: reqwest::Client,
}

impl Session {
    pub fn new(config: GraphConfig, max_nodes: usize) -> Result<Self, String> {
        let client = build_client().map_err(|e| e.to_string())?;
        let renderer = Arc::new(TerminalRenderer::new(max_nodes));
        let panel = Arc::new(MetadataPanel::new());
        let state = GraphState::new(config, renderer.clone(), panel.clone());
        let normalizer = Arc::new(JsonSourceParser::new(client.clone()));
        let pipeline = Arc::new(DataUpdatePipeline::new(Arc::new(state), normalizer));

        Ok(Self {
            pipeline,
            renderer,
            panel,
            client,
        })
    }

    /// Run one update and wait for it to publish, offloaded or not.
    pub async fn load(&self, source: DataSource) -> bool {
        self.pipeline.update(source).await.settled().await.is_some()
    }

    /// Print the latest frame and counters, if something rendered since the
    /// last call.
    pub fn flush(&self) {
        let Some(frame) = self.renderer.take_frame() else {
            return;
        };
        print!("{}", frame);
        let metadata = format_metadata(&self.panel.view());
        if !metadata.is_empty() {
            println!("{}", metadata);
        }
    }
}

/// One line of input in the search session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Search(String),
    Back,
    Forward,
    Quit,
}

pub fn parse_repl_line(line: &str) -> ReplCommand {
    match line.trim() {
        ":q" | ":quit" | ":exit" => ReplCommand::Quit,
        ":b" | ":back" => ReplCommand::Back,
        ":f" | ":forward" => ReplCommand::Forward,
        _ => ReplCommand::Search(line.to_string()),
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "✗".red().bold(), message);
    std::process::exit(1);
}

fn config_from_args(args: &ArgMatches) -> GraphConfig {
    let config_path = args.get_one::<PathBuf>("config");
    let metadata = args.get_flag("metadata");
    let worker = args.get_one::<String>("worker").map(String::as_str);
    let config = load_config(config_path, metadata, worker).unwrap_or_else(|e| fail(e));
    debug!("Graph config: {:?}", config);
    config
}

pub async fn handle_load(args: &ArgMatches) {
    let source = args.get_one::<String>("SOURCE").unwrap();
    let max_nodes = *args.get_one::<usize>("max-nodes").unwrap_or(&20);
    let session = Session::new(config_from_args(args), max_nodes).unwrap_or_else(|e| fail(e));

    let pb = spinner(format!("Loading {}", source));
    let published = session.load(DataSource::Url(source.clone())).await;
    pb.finish_and_clear();

    if !published {
        fail(format!("Failed to load {}", source));
    }
    session.flush();
}

pub async fn handle_search(args: &ArgMatches) {
    let base_url = args.get_one::<Url>("base-url").unwrap();
    let max_nodes = *args.get_one::<usize>("max-nodes").unwrap_or(&20);
    let session = Session::new(config_from_args(args), max_nodes).unwrap_or_else(|e| fail(e));

    if let Some(initial) = args.get_one::<String>("initial") {
        let pb = spinner(format!("Loading {}", initial));
        let published = session.load(DataSource::Url(initial.clone())).await;
        pb.finish_and_clear();
        if !published {
            fail(format!("Failed to load {}", initial));
        }
        session.flush();
    }

    let controller = SearchSyncController::new(
        base_url.as_str(),
        session.client.clone(),
        session.pipeline.clone(),
        Arc::new(NavigationHistory::new()),
    );

    println!(
        "{} Searching {} ({} / {} / {})",
        "→".blue(),
        base_url.as_str().bright_white(),
        ":back".cyan(),
        ":forward".cyan(),
        ":quit".cyan()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", "search>".bright_cyan().bold());
        let _ = io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => fail(format!("Failed to read input: {}", e)),
        };

        let fetch = match parse_repl_line(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Back => match controller.history().back() {
                Some(traversal) => traversal.fetch,
                None => {
                    println!("{} Already at the oldest search", "ℹ".blue());
                    continue;
                }
            },
            ReplCommand::Forward => match controller.history().forward() {
                Some(traversal) => traversal.fetch,
                None => {
                    println!("{} Already at the newest search", "ℹ".blue());
                    continue;
                }
            },
            ReplCommand::Search(key) => match controller.search(&key) {
                Some(fetch) => Some(fetch),
                None => {
                    println!("{} Unchanged search, nothing to do", "ℹ".blue());
                    continue;
                }
            },
        };

        if let Some(fetch) = fetch {
            run_fetch(&session, fetch).await;
        }
    }
}

async fn run_fetch(session: &Session, fetch: PendingFetch) {
    let pb = spinner(format!("Searching {:?}", fetch.search_value()));
    let result = match fetch.finished().await {
        Ok(outcome) => Ok(outcome.settled().await),
        Err(e) => Err(e),
    };
    pb.finish_and_clear();

    match result {
        Ok(Some(_)) => session.flush(),
        Ok(None) => eprintln!("{} Update rejected, keeping the current graph", "⚠".yellow()),
        Err(e) => eprintln!("{} Search failed: {}", "✗".red().bold(), e),
    }
}
