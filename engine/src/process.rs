use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use chess::analysis::variation_san;
use chess::{AnalysisLine, AnalysisProvider, AnalysisRequest, SearchLimit};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::mpsc;

use crate::uci::{parse_uci_message, UciError, UciMessage};
use crate::EngineInfo;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const QUIT_GRACE: Duration = Duration::from_secs(1);

/// Configuration applied right after the UCI handshake.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
    /// How long to wait for `uciok` and `readyok`.
    pub handshake_timeout: Duration,
    /// Upper bound on one search; the engine is told to `stop` when it passes.
    pub search_timeout: Option<Duration>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: None,
            hash_mb: None,
            handshake_timeout: HANDSHAKE_TIMEOUT,
            search_timeout: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("engine exited unexpectedly")]
    Closed,
    #[error(transparent)]
    Uci(#[from] UciError),
}

/// A running UCI engine process.
///
/// A background task reads stdout and forwards parsed messages over a
/// channel; commands are written straight to stdin.
pub struct UciEngine {
    process: Child,
    stdin: ChildStdin,
    events: mpsc::Receiver<UciMessage>,
    name: Option<String>,
    options: EngineOptions,
}

impl UciEngine {
    /// Start the engine at `path` and complete the `uci`/`uciok` and
    /// `isready`/`readyok` exchanges.
    #[tracing::instrument(level = "info", skip(options))]
    pub async fn spawn(path: &Path, options: EngineOptions) -> Result<Self, EngineError> {
        tracing::info!("Spawning engine (options: {:?})", options);
        let mut process = tokio::process::Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                tracing::error!("Failed to spawn engine: {}", source);
                EngineError::Spawn {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        let stdin = process.stdin.take().ok_or(UciError::NoStdin)?;
        let stdout = process.stdout.take().ok_or(UciError::NoStdout)?;

        let (event_tx, events) = mpsc::channel::<UciMessage>(64);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let trimmed = line.trim();
                        tracing::trace!("UCI << {}", trimmed);
                        match parse_uci_message(trimmed) {
                            Ok(msg) => {
                                if event_tx.send(msg).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::trace!("Ignoring engine output: {}", e),
                        }
                    }
                    Ok(None) => {
                        tracing::debug!("Engine stdout EOF");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("Error reading engine stdout: {}", e);
                        break;
                    }
                }
            }
        });

        let mut engine = Self {
            process,
            stdin,
            events,
            name: None,
            options,
        };

        engine.send("uci").await?;
        let timeout = engine.options.handshake_timeout;
        let name = tokio::time::timeout(timeout, engine.wait_for_uciok())
            .await
            .map_err(|_| {
                tracing::error!("Timeout waiting for uciok");
                EngineError::Timeout("uciok")
            })??;
        engine.name = name;

        if let Some(threads) = engine.options.threads {
            let threads = threads.clamp(1, 16);
            tracing::info!("Setting Threads to {}", threads);
            engine.set_option("Threads", &threads.to_string()).await?;
        }
        if let Some(hash_mb) = engine.options.hash_mb {
            let hash_mb = hash_mb.clamp(1, 2048);
            tracing::info!("Setting Hash to {} MB", hash_mb);
            engine.set_option("Hash", &hash_mb.to_string()).await?;
        }
        engine.ready().await?;

        tracing::info!(
            "Engine {} ready",
            engine.name.as_deref().unwrap_or("(unnamed)")
        );
        Ok(engine)
    }

    /// The name the engine reported in `id name`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn send(&mut self, command: &str) -> Result<(), EngineError> {
        tracing::trace!("UCI >> {}", command);
        self.stdin
            .write_all(format!("{}\n", command).as_bytes())
            .await
            .map_err(UciError::from)?;
        self.stdin.flush().await.map_err(UciError::from)?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<UciMessage, EngineError> {
        self.events.recv().await.ok_or(EngineError::Closed)
    }

    async fn wait_for_uciok(&mut self) -> Result<Option<String>, EngineError> {
        let mut name = None;
        loop {
            match self.recv().await? {
                UciMessage::UciOk => return Ok(name),
                UciMessage::Id { name: key, value } if key == "name" => name = Some(value),
                _ => {}
            }
        }
    }

    async fn set_option(&mut self, name: &str, value: &str) -> Result<(), EngineError> {
        self.send(&format!("setoption name {} value {}", name, value))
            .await
    }

    /// `isready` and wait for `readyok`.
    async fn ready(&mut self) -> Result<(), EngineError> {
        self.send("isready").await?;
        let timeout = self.options.handshake_timeout;
        let wait = async {
            loop {
                if matches!(self.recv().await?, UciMessage::ReadyOk) {
                    return Ok::<(), EngineError>(());
                }
            }
        };
        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| EngineError::Timeout("readyok"))?
    }

    /// Search `request.position` and return one line per principal
    /// variation, best first.
    #[tracing::instrument(level = "debug", skip(self, request), fields(lines = request.lines))]
    pub async fn run_analysis(
        &mut self,
        request: &AnalysisRequest,
    ) -> Result<Vec<AnalysisLine>, EngineError> {
        let lines = request.lines.max(1);
        self.set_option("MultiPV", &lines.to_string()).await?;
        self.ready().await?;

        let fen = request.position.fen();
        tracing::info!("Analysing position: FEN={}", fen);
        self.send(&format!("position fen {}", fen)).await?;

        let go = match request.limit {
            SearchLimit::Depth(depth) => format!("go depth {}", depth),
            SearchLimit::MoveTime(ms) => format!("go movetime {}", ms),
        };
        self.send(&go).await?;

        let mut latest: BTreeMap<u8, EngineInfo> = BTreeMap::new();
        let deadline = self.options.search_timeout.map(|t| tokio::time::Instant::now() + t);
        let mut stopped = false;

        loop {
            let msg = match deadline {
                Some(deadline) if !stopped => {
                    match tokio::time::timeout_at(deadline, self.recv()).await {
                        Ok(msg) => msg?,
                        Err(_) => {
                            tracing::warn!("Search timeout reached, stopping engine");
                            self.send("stop").await?;
                            stopped = true;
                            continue;
                        }
                    }
                }
                _ => self.recv().await?,
            };

            match msg {
                UciMessage::Info(info) if info.score.is_some() && !info.pv.is_empty() => {
                    let index = info.multipv.unwrap_or(1);
                    if index <= lines {
                        latest.insert(index, info);
                    }
                }
                UciMessage::BestMove { mv, .. } => {
                    tracing::debug!("Received bestmove: {:?}", mv);
                    break;
                }
                _ => {}
            }
        }

        let result: Vec<AnalysisLine> = latest
            .into_iter()
            .filter_map(|(multipv, info)| {
                let score = info.score?;
                Some(AnalysisLine {
                    multipv,
                    depth: info.depth.map_or(0, u32::from),
                    score: score.into(),
                    variation: variation_san(&request.position, &info.pv),
                })
            })
            .collect();

        tracing::info!("Analysis finished with {} lines", result.len());
        Ok(result)
    }

    /// Send `quit` and give the process a moment to exit before killing it.
    pub async fn shutdown(mut self) {
        tracing::info!("Sending quit command to engine");
        let _ = self.send("quit").await;
        let _ = tokio::time::timeout(QUIT_GRACE, self.process.wait()).await;
        let _ = self.process.kill().await;
    }
}

impl AnalysisProvider for UciEngine {
    type Error = EngineError;

    fn analyse(
        &mut self,
        request: &AnalysisRequest,
    ) -> impl std::future::Future<Output = Result<Vec<AnalysisLine>, Self::Error>> + Send {
        self.run_analysis(request)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use chess::{AnalysisScore, Position};
    use std::os::unix::fs::PermissionsExt;

    const FAKE_ENGINE: &str = r#"#!/bin/sh
while read -r line; do
  case "$line" in
    uci) echo "id name FakeFish 1.0"; echo "option name Hash type spin"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*)
      echo "info depth 1 multipv 1 score cp 10 pv d2d4"
      echo "info depth 2 multipv 1 score cp 35 pv e2e4 e7e5 g1f3"
      echo "info depth 2 multipv 2 score cp -20 pv a2a3"
      echo "bestmove e2e4 ponder e7e5" ;;
    quit) exit 0 ;;
  esac
done
"#;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_handshake_and_multipv_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(dir.path(), "fakefish", FAKE_ENGINE);

        let mut engine = UciEngine::spawn(&path, EngineOptions::default()).await.unwrap();
        assert_eq!(engine.name(), Some("FakeFish 1.0"));

        let request = AnalysisRequest::new(Position::start(), SearchLimit::Depth(2), 2);
        let lines = engine.analyse(&request).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].multipv, 1);
        assert_eq!(lines[0].depth, 2);
        assert_eq!(lines[0].score, AnalysisScore::Centipawns(35));
        assert_eq!(lines[0].display(), "Line 1: +0.35 1. e4 e5 2. Nf3");
        assert_eq!(lines[1].display(), "Line 2: -0.20 1. a3");

        engine.shutdown().await;
    }

    #[tokio::test]
    async fn test_missing_engine_binary() {
        let err = UciEngine::spawn(Path::new("/no/such/engine"), EngineOptions::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_silent_engine_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(dir.path(), "mute", "#!/bin/sh\nwhile read -r line; do :; done\n");
        let options = EngineOptions {
            handshake_timeout: Duration::from_millis(200),
            ..EngineOptions::default()
        };
        let err = UciEngine::spawn(&path, options).await.err().unwrap();
        assert!(matches!(err, EngineError::Timeout("uciok")));
    }
}
