//! Command-line bridge for the rivers agent.
//!
//! - `rivers choose <file>` - one decision for a snapshot, move JSON on stdout
//! - `rivers serve` - JSON-lines session on stdin/stdout
//! - `rivers demo` - start position and each side's first decision

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rivers_core::engine::config::{EngineConfig, EvalWeights};
use rivers_core::engine::policy::Agent;
use rivers_core::logic::board::{Board, Player, DEFAULT_COLS, DEFAULT_ROWS};
use rivers_core::logic::opening::OpeningBook;
use rivers_core::protocol::{Response, Session, Snapshot};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Rivers and stones: a game-playing agent
#[derive(Parser)]
#[command(name = "rivers")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Side the agent plays
    #[arg(long, value_enum, default_value_t = PlayerArg::Circle, global = true)]
    player: PlayerArg,

    /// Engine configuration (JSON, missing fields take defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-feature multipliers for the evaluator weights (JSON)
    #[arg(long, global = true)]
    scales: Option<PathBuf>,

    /// Search depth in plies
    #[arg(long, global = true)]
    depth: Option<u8>,

    /// Seed for tie-breaking; random when absent
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Open with the river-rush script
    #[arg(long, global = true)]
    book: bool,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose one move for the snapshot in FILE ("-" reads stdin)
    Choose { file: PathBuf },
    /// Answer one JSON request per line of stdin
    Serve,
    /// Print the start position and each side's first move
    Demo,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlayerArg {
    Circle,
    Square,
}

impl From<PlayerArg> for Player {
    fn from(arg: PlayerArg) -> Self {
        match arg {
            PlayerArg::Circle => Self::Circle,
            PlayerArg::Square => Self::Square,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Arc::new(load_config(&cli)?);
    let player = Player::from(cli.player);
    debug!(depth = config.depth, seed = ?config.seed, "engine configured");

    match cli.command {
        Some(Commands::Choose { file }) => choose(&file, player, config),
        Some(Commands::Serve) => serve(player, config),
        Some(Commands::Demo) | None => {
            demo(&config);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = cli
        .config
        .as_deref()
        .map(|path| {
            EngineConfig::load_from_json(&read_file(path)?)
                .with_context(|| format!("invalid config {}", path.display()))
        })
        .transpose()?
        .unwrap_or_default();

    if let Some(path) = cli.scales.as_deref() {
        config.eval = EvalWeights::load_scales_from_json(&read_file(path)?)
            .with_context(|| format!("invalid weight scales {}", path.display()))?;
    }
    if let Some(depth) = cli.depth {
        config.depth = depth;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.book {
        config.opening_book = OpeningBook::river_rush();
    }
    if config.depth == 0 {
        bail!("search depth must be at least 1");
    }
    Ok(config)
}

fn choose(file: &Path, player: Player, config: Arc<EngineConfig>) -> Result<()> {
    let text = if file == Path::new("-") {
        io::read_to_string(io::stdin()).context("failed to read snapshot from stdin")?
    } else {
        read_file(file)?
    };
    let snapshot = Snapshot::from_json(&text).context("invalid snapshot")?;

    let mut session = Session::new(player, config);
    match session.choose(&snapshot) {
        Response::Move { mv, stats } => {
            info!(
                depth = stats.depth,
                nodes = stats.nodes,
                time_ms = stats.time_ms,
                "{player} decided"
            );
            println!("{}", serde_json::to_string(&mv)?);
            Ok(())
        }
        Response::Error { message } => bail!("invalid snapshot: {message}"),
        Response::Reset => Ok(()),
    }
}

fn serve(player: Player, config: Arc<EngineConfig>) -> Result<()> {
    let mut session = Session::new(player, config);
    let mut stdout = io::stdout().lock();
    info!("serving as {player}");

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }
        let response = session.handle_line(&line);
        serde_json::to_writer(&mut stdout, &response)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }
    Ok(())
}

fn demo(config: &Arc<EngineConfig>) {
    let board = Board::standard(DEFAULT_ROWS, DEFAULT_COLS);
    println!("{board}");

    for player in [Player::Circle, Player::Square] {
        let mut agent = Agent::new(player, Arc::clone(config));
        let Some(mv) = agent.choose(&board, None, None, true) else {
            println!("{player}: no legal move");
            continue;
        };
        let stats = agent.last_stats();
        println!(
            "{player}: {mv} (score {:.0}, depth {}, {} nodes, {} ms)",
            stats.score, stats.depth, stats.nodes, stats.time_ms
        );
    }
}
