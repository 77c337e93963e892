//! Subcommand handlers.

use std::io::Write;
use std::path::{Path, PathBuf};

use chess::{
    AnalysisProvider, AnalysisRequest, DisplayBoard, Game, GameBrowser, GameRecord,
    ParseDiagnostic, ParseOptions, SearchLimit,
};
use engine::{EngineOptions, UciEngine};
use library::{Database, GameFilter, GameRepository, SqliteGameRepository};
use serde::Serialize;

use crate::{config, CliError, GameSelection, GameSource};

/// Settings shared by every subcommand.
pub struct Context {
    pub options: ParseOptions,
    pub json: bool,
    pub db_path: PathBuf,
}

impl Context {
    async fn repository(&self) -> Result<SqliteGameRepository, CliError> {
        let db = Database::open(&self.db_path).await?;
        Ok(SqliteGameRepository::new(db.pool().clone()))
    }
}

#[derive(Serialize)]
struct GameListing {
    index: usize,
    plies: usize,
    #[serde(flatten)]
    record: GameRecord,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    games: Vec<GameListing>,
    diagnostics: &'a [ParseDiagnostic],
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    summary: String,
    ply: usize,
    plies: usize,
    fen: String,
    side_to_move: &'static str,
    moves: Vec<&'a str>,
    move_list: String,
}

fn resolve_pgn_path(file: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match file {
        Some(path) => Ok(path),
        None => {
            let dir = config::get_input_dir();
            let path = config::most_recent_pgn(&dir).ok_or(CliError::NoInputFile(dir))?;
            tracing::info!("Opening most recent PGN file {}", path.display());
            Ok(path)
        }
    }
}

/// Print diagnostics as warnings. They never fail the command.
fn report(diagnostics: &[ParseDiagnostic]) {
    for diag in diagnostics {
        tracing::warn!("{}", diag);
    }
}

/// Games from a file or from the library, plus whatever went wrong
/// building them.
async fn load_games(
    ctx: &Context,
    source: &GameSource,
) -> Result<(Vec<Game>, Vec<ParseDiagnostic>), CliError> {
    if let Some(id) = source.id {
        let repo = ctx.repository().await?;
        let stored = repo
            .get_game(id)
            .await?
            .ok_or(CliError::StoredGameNotFound(id))?;
        let built = stored
            .record
            .to_game(&ctx.options)
            .ok_or(CliError::StoredGameNotFound(id))?;
        return Ok((vec![built.game], built.diagnostics));
    }

    let path = resolve_pgn_path(source.file.clone())?;
    let parsed = chess::read_pgn_file(&path, &ctx.options)?;
    Ok((parsed.games, parsed.diagnostics))
}

/// A browser positioned on the selected game and ply.
async fn browse(ctx: &Context, selection: &GameSelection) -> Result<GameBrowser, CliError> {
    let (games, diagnostics) = load_games(ctx, &selection.source).await?;
    report(&diagnostics);

    let count = games.len();
    let mut browser = GameBrowser::new(games);
    if selection.game == 0 || !browser.select(selection.game - 1) {
        return Err(CliError::GameNotFound {
            index: selection.game,
            count,
        });
    }

    match selection.ply {
        Some(ply) => browser.cursor_mut().goto(ply)?,
        None => browser.cursor_mut().last(),
    }
    Ok(browser)
}

pub async fn list(ctx: &Context, source: &GameSource) -> Result<(), CliError> {
    let (games, diagnostics) = load_games(ctx, source).await?;

    if ctx.json {
        let output = ListOutput {
            games: games
                .iter()
                .enumerate()
                .map(|(i, game)| GameListing {
                    index: i + 1,
                    plies: game.len(),
                    record: GameRecord::from_game(game),
                })
                .collect(),
            diagnostics: &diagnostics,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    report(&diagnostics);
    for (i, game) in games.iter().enumerate() {
        println!("{}. {}", i + 1, game.summary());
    }
    Ok(())
}

pub async fn show(ctx: &Context, selection: &GameSelection, flip: bool) -> Result<(), CliError> {
    let browser = browse(ctx, selection).await?;
    let (Some(game), Some(position)) = (browser.selected(), browser.position()) else {
        return Err(CliError::GameNotFound {
            index: selection.game,
            count: browser.len(),
        });
    };
    let position = position?;
    let cursor = browser.cursor();

    if ctx.json {
        let output = ShowOutput {
            summary: game.summary(),
            ply: cursor.ply(),
            plies: cursor.len(),
            fen: position.fen(),
            side_to_move: position.side_to_move().as_str(),
            moves: game.san_moves(),
            move_list: game.move_list(Some(cursor.ply())),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", game.summary());
    println!();
    print!("{}", DisplayBoard::from_position(&position).flipped(flip));
    println!();
    println!("FEN: {}", position.fen());
    println!("Ply {}/{}", cursor.ply(), cursor.len());
    println!("{}", game.move_list(Some(cursor.ply())));
    Ok(())
}

pub async fn export(
    ctx: &Context,
    source: &GameSource,
    numbers: &[usize],
    output: Option<&Path>,
) -> Result<(), CliError> {
    let (games, diagnostics) = load_games(ctx, source).await?;
    report(&diagnostics);

    let selected: Vec<&Game> = if numbers.is_empty() {
        games.iter().collect()
    } else {
        numbers
            .iter()
            .map(|&n| {
                n.checked_sub(1)
                    .and_then(|i| games.get(i))
                    .ok_or(CliError::GameNotFound {
                        index: n,
                        count: games.len(),
                    })
            })
            .collect::<Result<_, _>>()?
    };

    let text = chess::to_pgn_collection(selected.iter().copied());
    match output {
        Some(path) => {
            std::fs::write(path, &text)?;
            tracing::info!("Exported {} games to {}", selected.len(), path.display());
        }
        None => std::io::stdout().write_all(text.as_bytes())?,
    }
    Ok(())
}

pub async fn import(ctx: &Context, file: Option<PathBuf>) -> Result<(), CliError> {
    let path = resolve_pgn_path(file)?;
    let parsed = chess::read_pgn_file(&path, &ctx.options)?;
    report(&parsed.diagnostics);

    let repo = ctx.repository().await?;
    let mut ids = Vec::with_capacity(parsed.games.len());
    for game in &parsed.games {
        ids.push(repo.add_game(&GameRecord::from_game(game)).await?);
    }
    tracing::info!("Imported {} games from {}", ids.len(), path.display());

    if ctx.json {
        println!("{}", serde_json::to_string(&ids)?);
    } else {
        println!(
            "Imported {} games ({} warnings) into {}",
            ids.len(),
            parsed.diagnostics.len(),
            ctx.db_path.display()
        );
    }
    Ok(())
}

pub async fn search(
    ctx: &Context,
    filter: &GameFilter,
    limit: Option<u32>,
    offset: Option<u32>,
) -> Result<(), CliError> {
    let repo = ctx.repository().await?;
    let games = repo.get_games(filter, limit, offset).await?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&games)?);
        return Ok(());
    }

    for stored in &games {
        let r = &stored.record;
        println!(
            "#{} {} {} - {} [{}] {} ({})",
            stored.id, r.date, r.white, r.black, r.result, r.event, r.eco
        );
    }
    let total = repo.count_games(filter).await?;
    println!("{} of {} games", games.len(), total);
    Ok(())
}

/// Engine to run: the flag, then `PGNVIEW_ENGINE_PATH`, then discovery.
fn resolve_engine(flag: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = flag.or_else(config::get_engine_path) {
        return Ok(path);
    }
    let dir = config::get_engine_dir();
    engine::default_engine(&dir).ok_or(CliError::NoEngine(dir))
}

pub async fn analyze(
    ctx: &Context,
    selection: &GameSelection,
    engine_path: Option<PathBuf>,
    limit: SearchLimit,
    lines: u8,
    options: EngineOptions,
) -> Result<(), CliError> {
    let browser = browse(ctx, selection).await?;
    let position = match browser.position() {
        Some(position) => position?,
        None => {
            return Err(CliError::GameNotFound {
                index: selection.game,
                count: browser.len(),
            })
        }
    };

    let path = resolve_engine(engine_path)?;
    let mut uci = UciEngine::spawn(&path, options).await?;
    let request = AnalysisRequest::new(position, limit, lines);
    let result = uci.analyse(&request).await;
    uci.shutdown().await;
    let analysis = result?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("{}", request.position.fen());
    for line in &analysis {
        println!("{}", line.display());
    }
    Ok(())
}
