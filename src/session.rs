//! Screen flow and mode rules between the front end and the game core
//!
//! The front end only forwards intents (a menu pick, a board click, a key)
//! and draws what [`Session`] exposes. Turn gating, the AI reply and LAN
//! restrictions all live here, so they can be tested without a window.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use crate::board::{Pos, Stone};
use crate::config::{Config, PlayersConfig};
use crate::engine::{AIEngine, MoveResult};
use crate::error::NetError;
use crate::game::{GameMode, GameState};
use crate::net;
use crate::sync::{Coordinator, LinkState, Role, SyncNotice};

/// Names used when playing the AI
const YOU: &str = "YOU";
const CPU: &str = "CPU";

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Menu,
    /// Pick a color against the AI
    AiConfig,
    /// Scanning for LAN hosts
    LanLobby,
    /// Pick a name before a LAN match
    NameInput,
    Playing,
}

/// Move timer for tracking thinking time
pub struct MoveTimer {
    pub start_time: Option<Instant>,
    pub last_move_duration: Option<Duration>,
    pub ai_thinking_time: Option<Duration>,
}

impl Default for MoveTimer {
    fn default() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_move_duration: None,
            ai_thinking_time: None,
        }
    }
}

impl MoveTimer {
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn stop(&mut self) -> Duration {
        let duration = self.elapsed();
        self.last_move_duration = Some(duration);
        self.start_time = None;
        duration
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.map_or(Duration::ZERO, |t| t.elapsed())
    }

    pub fn set_ai_time(&mut self, duration: Duration) {
        self.ai_thinking_time = Some(duration);
    }
}

/// Everything one window needs: the current screen, the match and its
/// networking.
pub struct Session {
    screen: Screen,
    game: GameState,
    coordinator: Coordinator,
    engine: AIEngine,
    players: PlayersConfig,
    name_index: usize,
    host_ip: Option<IpAddr>,
    scan_started: Option<Instant>,
    last_ai_result: Option<MoveResult>,
    message: Option<String>,
    quit: bool,
    pub move_timer: MoveTimer,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self::with_engine(config, AIEngine::new())
    }

    /// Session with a specific engine, e.g. a seeded one.
    pub fn with_engine(config: &Config, engine: AIEngine) -> Self {
        let mut game = GameState::default();
        game.set_names(config.players.default_names.clone());
        Self {
            screen: Screen::Menu,
            game,
            coordinator: Coordinator::new(config.network.clone()),
            engine,
            players: config.players.clone(),
            name_index: 0,
            host_ip: None,
            scan_started: None,
            last_ai_result: None,
            message: None,
            quit: false,
            move_timer: MoveTimer::default(),
        }
    }

    // Accessors

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn last_ai_result(&self) -> Option<&MoveResult> {
        self.last_ai_result.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn prefilled_names(&self) -> &[String] {
        &self.players.prefilled_names
    }

    pub fn selected_name_index(&self) -> usize {
        self.name_index
    }

    pub fn found_hosts(&self) -> Vec<IpAddr> {
        self.coordinator.found_hosts()
    }

    /// Time since the lobby opened
    pub fn scan_elapsed(&self) -> Duration {
        self.scan_started.map_or(Duration::ZERO, |t| t.elapsed())
    }

    /// A host was found; the lobby offers to join it.
    pub fn can_join(&self) -> bool {
        !self.found_hosts().is_empty()
    }

    /// The scan came up empty; the lobby offers to host.
    pub fn can_host(&self) -> bool {
        !self.can_join() && self.coordinator.scan_exhausted()
    }

    /// Connection line for the side panel in LAN mode.
    pub fn network_info(&self) -> Option<String> {
        if self.game.mode() != GameMode::Lan {
            return None;
        }
        match (self.coordinator.role(), self.coordinator.link_state()) {
            (Some(Role::Host), _) => self.host_ip.map(|ip| format!("IP: {ip}")),
            (Some(Role::Client), LinkState::Connected) => Some("CONNECTED".to_string()),
            (Some(Role::Client), _) => Some("CONNECTING".to_string()),
            (None, _) => None,
        }
    }

    /// One-line game status for the side panel.
    pub fn status_text(&self) -> String {
        if let Some(winner) = self.game.winner() {
            return format!("{} ({}) wins!", self.game.name(winner), winner.name());
        }
        if self.game.board().is_full() {
            return "Draw".to_string();
        }
        let turn = self.game.current_turn();
        match self.game.mode() {
            GameMode::Lan if self.game.is_local_turn() => "Your turn".to_string(),
            GameMode::Lan => format!("Waiting for {}", self.game.name(turn)),
            _ => format!("{} ({}) to move", self.game.name(turn), turn.name()),
        }
    }

    // Menu

    /// Pick a game mode from the main menu.
    pub fn choose_mode(&mut self, mode: GameMode) {
        if self.screen != Screen::Menu {
            return;
        }
        self.game.reset();
        self.game.set_mode(mode);
        self.message = None;

        match mode {
            GameMode::Hotseat => {
                self.game.set_local_color(Stone::Black);
                self.enter_playing();
            }
            GameMode::VersusAi => self.screen = Screen::AiConfig,
            GameMode::Lan => {
                if let Err(e) = self.coordinator.start_scan() {
                    tracing::warn!(error = %e, "discovery listener unavailable");
                    self.message = Some(format!("LAN scan failed: {e}"));
                }
                self.scan_started = Some(Instant::now());
                self.screen = Screen::LanLobby;
            }
        }
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    /// Leave the AI color pick or the LAN lobby.
    pub fn back(&mut self) {
        match self.screen {
            Screen::AiConfig => self.screen = Screen::Menu,
            Screen::LanLobby => {
                self.coordinator.stop_scan();
                self.scan_started = None;
                self.screen = Screen::Menu;
            }
            _ => {}
        }
    }

    // AI setup

    /// Play the AI as `color`. The AI opens if the human took White.
    pub fn pick_ai_color(&mut self, color: Stone) {
        if self.screen != Screen::AiConfig || color == Stone::Empty {
            return;
        }
        self.game.set_local_color(color);
        self.game.set_name(color, YOU);
        self.game.set_name(color.opponent(), CPU);
        self.enter_playing();
        if color == Stone::White {
            self.ai_move();
        }
    }

    // LAN lobby

    /// Connect to the first host found. The joiner plays White.
    pub fn join_game(&mut self) -> Result<(), NetError> {
        let Some(&ip) = self.found_hosts().first() else {
            return Err(NetError::InvalidState {
                action: "join",
                state: "no host found",
            });
        };
        if let Err(e) = self.coordinator.join_host(ip) {
            self.message = Some(format!("Could not join {ip}: {e}"));
            return Err(e);
        }
        self.enter_name_input(Stone::White);
        Ok(())
    }

    /// Host a new game once the scan came up empty. The host plays Black.
    pub fn host_game(&mut self) -> Result<(), NetError> {
        if !self.can_host() {
            return Err(NetError::InvalidState {
                action: "host",
                state: "scanning",
            });
        }
        if let Err(e) = self.coordinator.host() {
            self.message = Some(format!("Could not host: {e}"));
            return Err(e);
        }
        self.host_ip = Some(net::local_ip());
        self.enter_name_input(Stone::Black);
        Ok(())
    }

    // Name input

    pub fn previous_name(&mut self) {
        let len = self.players.prefilled_names.len();
        if len > 0 {
            self.name_index = (self.name_index + len - 1) % len;
        }
    }

    pub fn next_name(&mut self) {
        let len = self.players.prefilled_names.len();
        if len > 0 {
            self.name_index = (self.name_index + 1) % len;
        }
    }

    /// Take the highlighted name and start playing.
    pub fn confirm_name(&mut self) {
        if self.screen != Screen::NameInput {
            return;
        }
        if let Some(name) = self.players.prefilled_names.get(self.name_index).cloned() {
            let color = self.game.local_color();
            if self.game.mode() == GameMode::Lan {
                self.coordinator.send_name(&mut self.game, color, name);
            } else {
                self.game.set_name(color, name);
            }
        }
        self.enter_playing();
    }

    // Playing

    /// Handle a click on a board cell. Returns whether a stone was placed.
    pub fn click_cell(&mut self, pos: Pos) -> bool {
        if self.screen != Screen::Playing || self.game.is_over() || !self.game.is_local_turn() {
            return false;
        }

        let placed = match self.game.mode() {
            GameMode::Lan => self.coordinator.place_local(&mut self.game, pos),
            GameMode::Hotseat | GameMode::VersusAi => self.game.place_stone(pos),
        };
        if !placed {
            return false;
        }

        self.move_timer.stop();
        if self.game.mode() == GameMode::VersusAi && !self.game.is_over() {
            self.ai_move();
        }
        self.move_timer.start();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.game.mode() != GameMode::Lan && self.game.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.game.mode() != GameMode::Lan && self.game.can_redo()
    }

    /// Take back a move (two against the AI). Not available over LAN.
    pub fn undo(&mut self) -> bool {
        if self.screen != Screen::Playing || !self.can_undo() || !self.game.undo() {
            return false;
        }
        if self.game.mode() == GameMode::VersusAi && !self.game.is_local_turn() && !self.game.is_over() {
            self.ai_move();
        }
        self.move_timer.start();
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.screen != Screen::Playing || !self.can_redo() {
            return false;
        }
        self.game.redo()
    }

    /// Start the match over. Over LAN only the host can.
    pub fn restart(&mut self) {
        if self.screen != Screen::Playing {
            return;
        }
        match self.game.mode() {
            GameMode::Lan => {
                if !self.coordinator.restart(&mut self.game) {
                    self.message = Some("Only the host can restart".to_string());
                    return;
                }
            }
            GameMode::Hotseat => self.game.reset(),
            GameMode::VersusAi => {
                self.game.reset();
                if self.game.local_color() == Stone::White {
                    self.ai_move();
                }
            }
        }
        self.last_ai_result = None;
        self.message = None;
        self.move_timer = MoveTimer::default();
    }

    /// Reset everything and go back to the main menu.
    pub fn exit_to_menu(&mut self) {
        if self.game.mode() == GameMode::Lan {
            self.coordinator.stop();
        }
        self.game.reset();
        self.game.set_names(self.players.default_names.clone());
        self.host_ip = None;
        self.scan_started = None;
        self.last_ai_result = None;
        self.screen = Screen::Menu;
    }

    /// Per-frame work: apply network events.
    pub fn tick(&mut self) -> Vec<SyncNotice> {
        let notices = self.coordinator.poll(&mut self.game);
        for notice in &notices {
            match notice {
                SyncNotice::Established(peer) => {
                    self.message = Some(format!("Opponent connected from {}", peer.ip()));
                }
                SyncNotice::Lost(reason) => {
                    self.exit_to_menu();
                    self.message = Some(format!("Connection lost: {reason}"));
                }
                SyncNotice::RemoteMove(_) | SyncNotice::Synced => {
                    self.move_timer.start();
                }
                SyncNotice::NameChanged(_) => {}
            }
        }
        notices
    }

    // Internals

    fn enter_playing(&mut self) {
        self.screen = Screen::Playing;
        self.last_ai_result = None;
        self.move_timer = MoveTimer::default();
    }

    fn enter_name_input(&mut self, color: Stone) {
        self.game.reset();
        self.game.set_local_color(color);
        self.name_index = 0;
        self.scan_started = None;
        self.screen = Screen::NameInput;
    }

    fn ai_move(&mut self) {
        let result = self.engine.get_move_with_stats(self.game.board());
        match result.best_move {
            Some(pos) => {
                if !self.game.place_stone(pos) {
                    tracing::warn!(x = pos.x, y = pos.y, "AI picked an unplayable cell");
                }
            }
            None => self.message = Some("AI could not find a move".to_string()),
        }
        self.move_timer.set_ai_time(Duration::from_millis(result.time_ms));
        self.last_ai_result = Some(result);
    }

    #[cfg(test)]
    fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.coordinator.stop();
    }
}
