//! TCP server for game clients
//!
//! Each connection owns one game session. The connection task is the only
//! place with timers: it issues `tickDown` after the interval reported by the
//! last snapshot and drops clients that stopped sending heartbeats.

use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::core::{ClassicSession, EngineError, ExtendedSession, SessionConfig, Snapshot};
use crate::protocol::{encode_message, parse_message, ClientMessage, ServerMessage};
use crate::types::{Command, Variant, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Advertised to clients in the `open` frame
    pub heartbeat_ms: u64,
    /// Clients silent for longer than this are dropped
    pub inactive_ms: u64,
    /// How often liveness is checked
    pub sweep_ms: u64,
    pub board_width: usize,
    pub board_height: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            heartbeat_ms: 5_000,
            inactive_ms: 120_000,
            sweep_ms: 60_000,
            board_width: DEFAULT_BOARD_WIDTH,
            board_height: DEFAULT_BOARD_HEIGHT,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    /// Create from `NEMEIN_*` environment variables, keeping defaults for
    /// anything missing or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("NEMEIN_HOST").unwrap_or(defaults.host),
            port: env_or("NEMEIN_PORT", defaults.port),
            heartbeat_ms: env_or("NEMEIN_HEARTBEAT_MS", defaults.heartbeat_ms),
            inactive_ms: env_or("NEMEIN_INACTIVE_MS", defaults.inactive_ms),
            sweep_ms: env_or("NEMEIN_SWEEP_MS", defaults.sweep_ms),
            board_width: env_or("NEMEIN_BOARD_WIDTH", defaults.board_width),
            board_height: env_or("NEMEIN_BOARD_HEIGHT", defaults.board_height),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }
}

/// Process-wide switches
pub struct ServerState;

impl ServerState {
    /// Check if the server is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("NEMEIN_DISABLED")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false)
    }
}

/// Either rule set behind one driver
#[derive(Debug)]
pub enum GameInstance {
    Classic(ClassicSession),
    Extended(ExtendedSession),
}

impl GameInstance {
    pub fn new(variant: Variant, config: SessionConfig) -> Self {
        match variant {
            Variant::Classic => Self::Classic(ClassicSession::new(config)),
            Variant::Extended => Self::Extended(ExtendedSession::new(config)),
        }
    }

    pub fn apply_command(&mut self, command: Command) -> Result<Snapshot, EngineError> {
        match self {
            Self::Classic(s) => s.apply_command(command),
            Self::Extended(s) => s.apply_command(command),
        }
    }

    pub fn apply_symbol(&mut self, symbol: &str) -> Result<Snapshot, EngineError> {
        match self {
            Self::Classic(s) => s.apply_symbol(symbol),
            Self::Extended(s) => s.apply_symbol(symbol),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        match self {
            Self::Classic(s) => s.snapshot(),
            Self::Extended(s) => s.snapshot(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        match self {
            Self::Classic(s) => s.is_game_over(),
            Self::Extended(s) => s.is_game_over(),
        }
    }
}

/// Last time a client proved it is alive
#[derive(Debug, Clone, Copy)]
pub struct Liveness {
    last_seen: Instant,
    threshold: Duration,
}

impl Liveness {
    pub fn new(now: Instant, threshold: Duration) -> Self {
        Self {
            last_seen: now,
            threshold,
        }
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_seen = now;
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_seen) > self.threshold
    }
}

fn session_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

/// Per-connection game driver state
struct Driver {
    config: ServerConfig,
    game: Option<GameInstance>,
    paused: bool,
    next_tick: Option<Instant>,
}

impl Driver {
    fn new(config: ServerConfig) -> Self {
        Self {
            config,
            game: None,
            paused: false,
            next_tick: None,
        }
    }

    /// Schedule the next automatic tick from a fresh snapshot
    fn schedule(&mut self, snapshot: &Snapshot) {
        let over = self.game.as_ref().map_or(true, GameInstance::is_game_over);
        self.next_tick = if self.paused || over {
            None
        } else {
            let ms = u64::from(snapshot.tick_interval_ms().max(1));
            Some(Instant::now() + Duration::from_millis(ms))
        };
    }

    fn start(&mut self, variant: Variant) -> Result<Snapshot, EngineError> {
        let config = SessionConfig::new(self.config.board_width, self.config.board_height)
            .with_seed(session_seed());
        let mut game = GameInstance::new(variant, config);
        let snapshot = game.apply_command(Command::TickDown)?;
        self.game = Some(game);
        self.schedule(&snapshot);
        Ok(snapshot)
    }
}

async fn send<W: AsyncWrite + Unpin>(writer: &mut W, msg: &ServerMessage) -> anyhow::Result<()> {
    let line = encode_message(msg).context("failed to encode frame")?;
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Run the TCP server until the listener fails
///
/// `ready_tx` receives the bound address once the listener is up.
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    if ServerState::is_disabled() {
        info!("server disabled via NEMEIN_DISABLED");
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let bound = listener.local_addr()?;
    info!("listening on {bound}");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, peer) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!("client {client_id} connected from {peer}");

        let config = config.clone();
        tokio::spawn(async move {
            let (reader, writer) = socket.into_split();
            if let Err(e) = handle_connection(reader, writer, config, client_id).await {
                warn!("client {client_id} error: {e:#}");
            }
            info!("client {client_id} disconnected");
        });
    }
}

/// Drive one client until it disconnects or goes silent
pub async fn handle_connection<R, W>(
    reader: R,
    mut writer: W,
    config: ServerConfig,
    client_id: usize,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut liveness = Liveness::new(Instant::now(), Duration::from_millis(config.inactive_ms));
    let mut sweep = tokio::time::interval(Duration::from_millis(config.sweep_ms.max(1)));
    let mut driver = Driver::new(config);

    send(&mut writer, &ServerMessage::Open(driver.config.heartbeat_ms)).await?;

    loop {
        let tick_at = driver.next_tick;
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                handle_line(trimmed, &mut driver, &mut liveness, &mut writer, client_id).await?;
            }
            _ = tokio::time::sleep_until(tick_at.unwrap_or_else(Instant::now)), if tick_at.is_some() => {
                let Some(game) = driver.game.as_mut() else {
                    driver.next_tick = None;
                    continue;
                };
                let snapshot = game
                    .apply_command(Command::TickDown)
                    .context("tick failed")?;
                driver.schedule(&snapshot);
                if snapshot.game_over() {
                    info!("client {client_id} game over, score {}", snapshot.session().score);
                }
                send(&mut writer, &ServerMessage::States(snapshot)).await?;
            }
            _ = sweep.tick() => {
                if liveness.is_expired(Instant::now()) {
                    warn!("client {client_id} missed heartbeats, dropping");
                    break;
                }
            }
        }
    }
    Ok(())
}

async fn handle_line<W: AsyncWrite + Unpin>(
    line: &str,
    driver: &mut Driver,
    liveness: &mut Liveness,
    writer: &mut W,
    client_id: usize,
) -> anyhow::Result<()> {
    let msg = match parse_message(line) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("client {client_id} sent a malformed frame: {e}");
            let reply = ServerMessage::Error(format!("malformed frame: {e}"));
            return send(writer, &reply).await;
        }
    };

    match msg {
        ClientMessage::Ready(variant) => {
            info!("client {client_id} started a {} game", variant.as_str());
            let snapshot = driver.start(variant).context("failed to start game")?;
            send(writer, &ServerMessage::Ready(variant)).await?;
            send(writer, &ServerMessage::States(snapshot)).await
        }
        ClientMessage::Ping(data) => send(writer, &ServerMessage::Ping(data)).await,
        ClientMessage::Heartbeat(data) => {
            liveness.touch(Instant::now());
            send(writer, &ServerMessage::Heartbeat(data)).await
        }
        ClientMessage::Keydown(symbol) => {
            if driver.paused {
                debug!("client {client_id} key {symbol} ignored while paused");
                return Ok(());
            }
            let Some(game) = driver.game.as_mut() else {
                let reply = ServerMessage::Error("no game running; send ready first".to_string());
                return send(writer, &reply).await;
            };
            let snapshot = game.apply_symbol(&symbol).context("command failed")?;
            if snapshot.game_over() {
                driver.next_tick = None;
            }
            send(writer, &ServerMessage::States(snapshot)).await
        }
        ClientMessage::Toggle(paused) => {
            driver.paused = paused;
            if paused {
                driver.next_tick = None;
            } else if let Some(snapshot) = driver.game.as_ref().map(GameInstance::snapshot) {
                driver.schedule(&snapshot);
            }
            send(writer, &ServerMessage::Toggle(paused)).await
        }
    }
}
