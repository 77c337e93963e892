//! pgnview - browse, export, store and analyse PGN chess games.
//!
//! Games come from a PGN file (by default the most recent one in the input
//! directory, see [`config`]) or from the SQLite game library by id. Parse
//! problems are printed as warnings and never stop the games that did parse
//! from being shown.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;

/// Top-level CLI arguments.
#[derive(Parser)]
#[command(name = "pgnview", version, about = "Browse, export and analyse PGN chess games")]
struct Cli {
    /// What to do with a game's remaining moves after an unreadable one.
    #[arg(long, value_enum, global = true, default_value_t = PolicyArg::Truncate)]
    policy: PolicyArg,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Game library path (overrides `PGNVIEW_DB_PATH`).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    /// Keep the moves before the bad one and drop the rest.
    Truncate,
    /// Drop only the bad move and keep reading.
    Skip,
}

impl From<PolicyArg> for chess::MoveErrorPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Truncate => Self::Truncate,
            PolicyArg::Skip => Self::SkipAndContinue,
        }
    }
}

/// Where to read games from.
#[derive(Args, Debug, Clone, Default)]
struct GameSource {
    /// PGN file; defaults to the newest `.pgn` in the input directory.
    file: Option<PathBuf>,

    /// Load a game from the library instead of a file.
    #[arg(long, conflicts_with = "file")]
    id: Option<i64>,
}

/// One game out of a source.
#[derive(Args, Debug, Clone)]
struct GameSelection {
    #[command(flatten)]
    source: GameSource,

    /// 1-based game number within the file.
    #[arg(short, long, default_value_t = 1)]
    game: usize,

    /// Ply to show; defaults to the final position.
    #[arg(short, long)]
    ply: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the games in a PGN file.
    List {
        #[command(flatten)]
        source: GameSource,
    },
    /// Show a game's board at a ply, with its move list.
    Show {
        #[command(flatten)]
        selection: GameSelection,

        /// Draw the board from Black's side.
        #[arg(long)]
        flip: bool,
    },
    /// Write games back out as PGN.
    Export {
        #[command(flatten)]
        source: GameSource,

        /// 1-based game numbers to export (all when omitted).
        #[arg(short, long, value_delimiter = ',')]
        games: Vec<usize>,

        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Store every game of a PGN file in the library.
    Import {
        /// PGN file; defaults to the newest `.pgn` in the input directory.
        file: Option<PathBuf>,
    },
    /// Query the library.
    Search {
        #[arg(long)]
        white: Option<String>,
        #[arg(long)]
        black: Option<String>,
        #[arg(long)]
        event: Option<String>,
        #[arg(long)]
        eco: Option<String>,
        #[arg(long)]
        result: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Run a UCI engine on a game position.
    Analyze {
        #[command(flatten)]
        selection: GameSelection,

        /// Engine binary (overrides `PGNVIEW_ENGINE_PATH` and discovery).
        #[arg(long)]
        engine: Option<PathBuf>,

        /// Search depth (overrides `PGNVIEW_ENGINE_DEPTH`).
        #[arg(long, conflicts_with = "movetime")]
        depth: Option<u32>,

        /// Search time in milliseconds instead of a fixed depth.
        #[arg(long)]
        movetime: Option<u64>,

        /// Number of principal variations.
        #[arg(long, default_value_t = 3)]
        lines: u8,

        #[arg(long)]
        threads: Option<u32>,

        #[arg(long)]
        hash: Option<u32>,
    },
}

/// Error type for CLI operations.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no .pgn files found in {}", .0.display())]
    NoInputFile(PathBuf),

    #[error(transparent)]
    Pgn(#[from] chess::PgnError),

    #[error(transparent)]
    Game(#[from] chess::GameError),

    #[error("game {index} does not exist (source has {count} games)")]
    GameNotFound { index: usize, count: usize },

    #[error("no game with id {0} in the library")]
    StoredGameNotFound(i64),

    #[error("library error: {0}")]
    Persistence(#[from] library::PersistenceError),

    #[error("engine error: {0}")]
    Engine(#[from] engine::EngineError),

    #[error("no engine found in {}; pass --engine or set PGNVIEW_ENGINE_PATH", .0.display())]
    NoEngine(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Install the stderr subscriber, plus a file layer when `PGNVIEW_LOG_PATH`
/// is set. The returned guard flushes the file writer on drop.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let (file_layer, guard) = match config::get_log_path() {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), PathBuf::from);
            let file_name = path
                .file_name()
                .map_or_else(|| "pgnview.log".into(), |n| n.to_os_string());
            std::fs::create_dir_all(&dir).ok();
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing();

    let ctx = commands::Context {
        options: chess::ParseOptions::with_policy(cli.policy.into()),
        json: cli.json,
        db_path: cli.db.unwrap_or_else(config::get_db_path),
    };
    tracing::debug!(policy = ctx.options.policy.as_str(), db = %ctx.db_path.display(), "starting");

    match cli.command {
        Commands::List { source } => commands::list(&ctx, &source).await?,
        Commands::Show { selection, flip } => commands::show(&ctx, &selection, flip).await?,
        Commands::Export {
            source,
            games,
            output,
        } => commands::export(&ctx, &source, &games, output.as_deref()).await?,
        Commands::Import { file } => commands::import(&ctx, file).await?,
        Commands::Search {
            white,
            black,
            event,
            eco,
            result,
            date,
            limit,
            offset,
        } => {
            let filter = library::GameFilter {
                white,
                black,
                event,
                eco,
                result,
                date,
            };
            commands::search(&ctx, &filter, limit, offset).await?
        }
        Commands::Analyze {
            selection,
            engine: engine_path,
            depth,
            movetime,
            lines,
            threads,
            hash,
        } => {
            let limit = match movetime {
                Some(ms) => chess::SearchLimit::MoveTime(ms),
                None => chess::SearchLimit::Depth(depth.unwrap_or_else(config::get_engine_depth)),
            };
            let options = engine::EngineOptions {
                threads,
                hash_mb: hash,
                ..engine::EngineOptions::default()
            };
            commands::analyze(&ctx, &selection, engine_path, limit, lines, options).await?
        }
    }

    Ok(())
}
