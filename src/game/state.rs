//! Board state machine: placement, undo/redo, win detection, snapshots

use crate::board::{Bitboard, Board, Pos, Stone};
use crate::error::SyncError;
use crate::rules;

use super::{GameMode, Move, SyncState, DEFAULT_NAMES, MAX_NAME_CHARS};

/// Authoritative state of one match.
///
/// The board is always derived from `history`: a cell is occupied iff exactly
/// one move in the history sits on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    history: Vec<Move>,
    redo: Vec<Move>,
    current_turn: Stone,
    winner: Option<Stone>,
    mode: GameMode,
    local_color: Stone,
    names: [String; 2],
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameMode::default())
    }
}

impl GameState {
    pub fn new(mode: GameMode) -> Self {
        Self {
            board: Board::new(),
            history: Vec::new(),
            redo: Vec::new(),
            current_turn: Stone::Black,
            winner: None,
            mode,
            local_color: Stone::Black,
            names: DEFAULT_NAMES.map(String::from),
        }
    }

    /// Clear the board, history and redo stack. Mode, local color and names
    /// are kept.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.history.clear();
        self.redo.clear();
        self.current_turn = Stone::Black;
        self.winner = None;
    }

    /// Place a stone for the side to move.
    ///
    /// Fails without touching anything if the cell is off the board or
    /// occupied, or if the game already has a winner.
    pub fn place_stone(&mut self, pos: Pos) -> bool {
        if self.winner.is_some()
            || !Pos::is_valid(pos.x as i32, pos.y as i32)
            || !self.board.is_empty(pos)
        {
            return false;
        }

        let stone = self.current_turn;
        self.board.place_stone(pos, stone);
        self.history.push(Move::new(pos, stone));
        self.redo.clear();
        self.settle_after(pos, stone);
        true
    }

    /// Whether the stone at `pos` is part of a run of five or more.
    pub fn check_win(&self, pos: Pos) -> bool {
        rules::has_five_at_pos(&self.board, pos)
    }

    /// Take back the last move, or the last two in an unfinished game
    /// against the AI so the human is to move again.
    pub fn undo(&mut self) -> bool {
        if self.history.is_empty() {
            return false;
        }

        let steps = if self.mode == GameMode::VersusAi
            && self.history.len() >= 2
            && self.winner.is_none()
        {
            2
        } else {
            1
        };

        for _ in 0..steps {
            let Some(mv) = self.history.pop() else {
                break;
            };
            self.board.remove_stone(mv.pos);
            // Turn goes to the retracted stone's color rather than flipping,
            // which differs only after a won game
            self.current_turn = mv.stone;
            self.redo.push(mv);
        }

        self.winner = None;
        true
    }

    /// Replay the most recently undone move.
    pub fn redo(&mut self) -> bool {
        let Some(mv) = self.redo.pop() else {
            return false;
        };

        self.board.place_stone(mv.pos, mv.stone);
        self.history.push(mv);
        self.settle_after(mv.pos, mv.stone);
        true
    }

    /// Set winner or pass the turn after `stone` landed on `pos`.
    fn settle_after(&mut self, pos: Pos, stone: Stone) {
        if self.check_win(pos) {
            self.winner = Some(stone);
            self.current_turn = stone;
        } else {
            self.current_turn = stone.opponent();
        }
    }

    /// Snapshot for the wire. Colors are left implicit (by ply parity).
    pub fn to_sync_state(&self) -> SyncState {
        SyncState {
            history: self
                .history
                .iter()
                .map(|mv| (mv.pos.x as i32, mv.pos.y as i32))
                .collect(),
            undone_history: self
                .redo
                .iter()
                .map(|mv| (mv.pos.x as i32, mv.pos.y as i32))
                .collect(),
            current_turn: self.current_turn.index().unwrap_or(0),
            winner: self.winner.and_then(Stone::index),
            player_names: [Stone::Black, Stone::White]
                .into_iter()
                .zip(self.names.iter())
                .filter_map(|(stone, name)| Some((stone.index()?.to_string(), name.clone())))
                .collect(),
        }
    }

    /// Replace board, history, redo, turn, winner and names with a received
    /// snapshot.
    ///
    /// The whole payload is validated before anything is replaced, so a bad
    /// snapshot leaves the current state untouched. Mode and local color are
    /// not part of the snapshot.
    pub fn apply_sync_state(&mut self, state: &SyncState) -> Result<(), SyncError> {
        let current_turn =
            Stone::from_index(state.current_turn).ok_or(SyncError::InvalidTurn(state.current_turn))?;
        let winner = match state.winner {
            Some(idx) => Some(Stone::from_index(idx).ok_or(SyncError::InvalidWinner(idx))?),
            None => None,
        };

        let mut occupied = Bitboard::new();
        let mut claim = |(x, y): (i32, i32)| -> Result<Pos, SyncError> {
            let pos = Pos::try_new(x, y).ok_or(SyncError::OutOfBounds { x, y })?;
            if occupied.get(pos) {
                return Err(SyncError::DuplicateCell { x, y });
            }
            occupied.set(pos);
            Ok(pos)
        };

        let mut board = Board::new();
        let mut history = Vec::with_capacity(state.history.len());
        for (ply, &coords) in state.history.iter().enumerate() {
            let mv = Move::new(claim(coords)?, Stone::for_ply(ply));
            board.place_stone(mv.pos, mv.stone);
            history.push(mv);
        }

        let mut redo = Vec::with_capacity(state.undone_history.len());
        for (i, &coords) in state.undone_history.iter().enumerate() {
            redo.push(Move::new(claim(coords)?, Stone::for_ply(state.redo_ply(i))));
        }

        let mut names = self.names.clone();
        for (key, name) in &state.player_names {
            let idx = key
                .parse::<u8>()
                .ok()
                .filter(|&idx| Stone::from_index(idx).is_some())
                .ok_or_else(|| SyncError::InvalidPlayer(key.clone()))?;
            if name.chars().count() > MAX_NAME_CHARS {
                return Err(SyncError::NameTooLong { limit: MAX_NAME_CHARS });
            }
            names[idx as usize] = name.clone();
        }

        self.board = board;
        self.history = history;
        self.redo = redo;
        self.current_turn = current_turn;
        self.winner = winner;
        self.names = names;
        Ok(())
    }

    // Accessors

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn stone_at(&self, pos: Pos) -> Stone {
        self.board.get(pos)
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn redo_stack(&self) -> &[Move] {
        &self.redo
    }

    pub fn last_move(&self) -> Option<Pos> {
        self.history.last().map(|mv| mv.pos)
    }

    pub fn current_turn(&self) -> Stone {
        self.current_turn
    }

    pub fn winner(&self) -> Option<Stone> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some() || self.board.is_full()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Stones of the winning run, for highlighting
    pub fn winning_line(&self) -> Option<Vec<Pos>> {
        self.winner?;
        rules::find_five_line_at_pos(&self.board, self.last_move()?)
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
    }

    pub fn local_color(&self) -> Stone {
        self.local_color
    }

    pub fn set_local_color(&mut self, color: Stone) {
        debug_assert!(color != Stone::Empty);
        self.local_color = color;
    }

    /// Whether the local player may move now (always true in hotseat).
    pub fn is_local_turn(&self) -> bool {
        match self.mode {
            GameMode::Hotseat => true,
            GameMode::VersusAi | GameMode::Lan => self.current_turn == self.local_color,
        }
    }

    pub fn names(&self) -> &[String; 2] {
        &self.names
    }

    pub fn name(&self, color: Stone) -> &str {
        color
            .index()
            .map(|idx| self.names[idx as usize].as_str())
            .unwrap_or("")
    }

    pub fn set_name(&mut self, color: Stone, name: impl Into<String>) {
        if let Some(idx) = color.index() {
            self.names[idx as usize] = name.into();
        }
    }

    pub fn set_names(&mut self, names: [String; 2]) {
        self.names = names;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(state: &mut GameState, moves: &[(u8, u8)]) {
        for &(x, y) in moves {
            assert!(state.place_stone(Pos::new(x, y)), "move ({x}, {y}) rejected");
        }
    }

    /// Black on row 0, White on row 1, leaving Black one short of five.
    fn black_four_on_row_zero(state: &mut GameState) {
        play(state, &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1), (3, 0), (3, 1)]);
    }

    #[test]
    fn test_initial_state() {
        let state = GameState::default();
        assert_eq!(state.current_turn(), Stone::Black);
        assert_eq!(state.winner(), None);
        assert!(state.history().is_empty());
        assert!(state.board().is_board_empty());
        assert_eq!(state.names(), &["Player 1".to_string(), "Player 2".to_string()]);
    }

    #[test]
    fn test_stone_placement_toggles_turn() {
        let mut state = GameState::default();
        assert!(state.place_stone(Pos::new(7, 7)));
        assert_eq!(state.stone_at(Pos::new(7, 7)), Stone::Black);
        assert_eq!(state.current_turn(), Stone::White);

        assert!(state.place_stone(Pos::new(8, 7)));
        assert_eq!(state.stone_at(Pos::new(8, 7)), Stone::White);
        assert_eq!(state.current_turn(), Stone::Black);
        assert_eq!(
            state.history(),
            &[
                Move::new(Pos::new(7, 7), Stone::Black),
                Move::new(Pos::new(8, 7), Stone::White)
            ]
        );
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut state = GameState::default();
        state.place_stone(Pos::new(7, 7));
        let before = state.clone();
        assert!(!state.place_stone(Pos::new(7, 7)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_off_board_rejected() {
        let mut state = GameState::default();
        assert!(!state.place_stone(Pos { x: 15, y: 0 }));
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_horizontal_win_on_row_zero() {
        let mut state = GameState::default();
        black_four_on_row_zero(&mut state);
        assert_eq!(state.winner(), None);

        assert!(state.place_stone(Pos::new(4, 0)));
        assert!(state.check_win(Pos::new(4, 0)));
        assert_eq!(state.winner(), Some(Stone::Black));
        // Turn freezes on the winner
        assert_eq!(state.current_turn(), Stone::Black);
        assert_eq!(state.winning_line().map(|l| l.len()), Some(5));
    }

    #[test]
    fn test_no_moves_after_win() {
        let mut state = GameState::default();
        black_four_on_row_zero(&mut state);
        state.place_stone(Pos::new(4, 0));
        let before = state.clone();

        assert!(!state.place_stone(Pos::new(10, 10)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_check_win_matches_max_run() {
        let mut state = GameState::default();
        // Black builds a broken row: gap at x = 2
        play(&mut state, &[(0, 5), (9, 9), (1, 5), (9, 10), (3, 5), (9, 11), (4, 5), (10, 0)]);
        assert!(!state.check_win(Pos::new(4, 5)));
        assert!(state.place_stone(Pos::new(2, 5)));
        assert!(state.check_win(Pos::new(2, 5)));
        assert!(state.check_win(Pos::new(0, 5)));
        assert_eq!(rules::max_run_at(state.board(), Pos::new(0, 5)), 5);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut state = GameState::default();
        play(&mut state, &[(7, 7), (8, 8)]);
        let before = state.clone();

        assert!(state.place_stone(Pos::new(6, 6)));
        let placed = state.clone();

        assert!(state.undo());
        assert_eq!(state.board(), before.board());
        assert_eq!(state.history(), before.history());
        assert_eq!(state.current_turn(), before.current_turn());
        assert!(state.can_redo());

        assert!(state.redo());
        assert_eq!(state.board(), placed.board());
        assert_eq!(state.history(), placed.history());
        assert_eq!(state.current_turn(), placed.current_turn());
        assert_eq!(state.winner(), placed.winner());
    }

    #[test]
    fn test_undo_redo_round_trip_winning_move() {
        let mut state = GameState::default();
        black_four_on_row_zero(&mut state);
        state.place_stone(Pos::new(4, 0));
        let won = state.clone();

        assert!(state.undo());
        assert_eq!(state.winner(), None);
        assert_eq!(state.current_turn(), Stone::Black);
        assert_eq!(state.history().len(), 8);

        assert!(state.redo());
        assert_eq!(state.board(), won.board());
        assert_eq!(state.winner(), Some(Stone::Black));
        assert_eq!(state.current_turn(), won.current_turn());
    }

    #[test]
    fn test_undo_empty_history() {
        let mut state = GameState::default();
        assert!(!state.undo());
        assert!(!state.redo());
    }

    #[test]
    fn test_new_move_clears_redo() {
        let mut state = GameState::default();
        play(&mut state, &[(7, 7), (8, 8)]);
        state.undo();
        assert!(state.can_redo());

        // Even replaying the very same move invalidates redo
        assert!(state.place_stone(Pos::new(8, 8)));
        assert!(!state.can_redo());
        assert!(!state.redo());
    }

    #[test]
    fn test_two_step_undo_against_ai() {
        let mut state = GameState::new(GameMode::VersusAi);
        play(&mut state, &[(7, 7), (8, 8), (6, 6), (9, 9)]);

        assert!(state.undo());
        assert_eq!(state.history().len(), 2);
        assert!(state.board().is_empty(Pos::new(6, 6)));
        assert!(state.board().is_empty(Pos::new(9, 9)));
        // Black made the first of the two removed moves
        assert_eq!(state.current_turn(), Stone::Black);
        assert_eq!(state.redo_stack().len(), 2);
    }

    #[test]
    fn test_single_undo_against_ai_with_one_move() {
        let mut state = GameState::new(GameMode::VersusAi);
        play(&mut state, &[(7, 7)]);
        assert!(state.undo());
        assert!(state.history().is_empty());
        assert_eq!(state.current_turn(), Stone::Black);
    }

    #[test]
    fn test_finished_game_undoes_one_step_against_ai() {
        let mut state = GameState::new(GameMode::VersusAi);
        black_four_on_row_zero(&mut state);
        state.place_stone(Pos::new(4, 0));
        assert!(state.winner().is_some());

        assert!(state.undo());
        assert_eq!(state.history().len(), 8);
        assert_eq!(state.winner(), None);

        // Mid-game again, so the next undo takes two
        assert!(state.undo());
        assert_eq!(state.history().len(), 6);
    }

    #[test]
    fn test_hotseat_undo_is_single_step() {
        let mut state = GameState::new(GameMode::Hotseat);
        play(&mut state, &[(7, 7), (8, 8), (6, 6)]);
        state.undo();
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.current_turn(), Stone::Black);
    }

    #[test]
    fn test_reset_keeps_assignment() {
        let mut state = GameState::new(GameMode::VersusAi);
        state.set_local_color(Stone::White);
        state.set_name(Stone::White, "YOU");
        play(&mut state, &[(7, 7), (8, 8)]);
        state.undo();

        state.reset();
        assert!(state.history().is_empty());
        assert!(!state.can_redo());
        assert!(state.board().is_board_empty());
        assert_eq!(state.current_turn(), Stone::Black);
        assert_eq!(state.mode(), GameMode::VersusAi);
        assert_eq!(state.local_color(), Stone::White);
        assert_eq!(state.name(Stone::White), "YOU");
    }

    #[test]
    fn test_local_turn() {
        let mut state = GameState::new(GameMode::Lan);
        state.set_local_color(Stone::White);
        assert!(!state.is_local_turn());
        state.place_stone(Pos::new(7, 7));
        assert!(state.is_local_turn());

        let hotseat = GameState::new(GameMode::Hotseat);
        assert!(hotseat.is_local_turn());
    }

    #[test]
    fn test_sync_round_trip() {
        let mut state = GameState::new(GameMode::Lan);
        state.set_name(Stone::Black, "Stella");
        state.set_name(Stone::White, "Aaron");
        play(&mut state, &[(7, 7), (8, 7), (7, 8), (8, 8), (3, 3)]);
        state.undo();
        state.undo();

        let snapshot = state.to_sync_state();
        let mut fresh = GameState::new(GameMode::Lan);
        fresh.apply_sync_state(&snapshot).unwrap();

        assert_eq!(fresh.board(), state.board());
        assert_eq!(fresh.history(), state.history());
        assert_eq!(fresh.redo_stack(), state.redo_stack());
        assert_eq!(fresh.current_turn(), state.current_turn());
        assert_eq!(fresh.winner(), state.winner());
        assert_eq!(fresh.names(), state.names());

        // Reconstructed redo stack replays to the same game
        fresh.redo();
        fresh.redo();
        assert_eq!(fresh.history().len(), 5);
        assert_eq!(fresh.stone_at(Pos::new(3, 3)), Stone::Black);
    }

    #[test]
    fn test_sync_round_trip_with_winner() {
        let mut state = GameState::default();
        black_four_on_row_zero(&mut state);
        state.place_stone(Pos::new(4, 0));

        let mut fresh = GameState::default();
        fresh.apply_sync_state(&state.to_sync_state()).unwrap();
        assert_eq!(fresh.winner(), Some(Stone::Black));
        assert_eq!(fresh.current_turn(), Stone::Black);
        assert_eq!(fresh.history(), state.history());
    }

    #[test]
    fn test_sync_replaces_local_state_wholesale() {
        let mut local = GameState::default();
        play(&mut local, &[(0, 0), (1, 1), (2, 2)]);

        let mut host = GameState::default();
        play(&mut host, &[(7, 7)]);

        local.apply_sync_state(&host.to_sync_state()).unwrap();
        assert_eq!(local.history(), host.history());
        assert!(local.board().is_empty(Pos::new(0, 0)));
        assert_eq!(local.current_turn(), Stone::White);
    }

    #[test]
    fn test_sync_rejects_invalid_payload_without_mutation() {
        let mut state = GameState::default();
        play(&mut state, &[(7, 7)]);
        let before = state.clone();

        let off_board = SyncState {
            history: vec![(1, 1), (15, 3)],
            ..Default::default()
        };
        assert_eq!(
            state.apply_sync_state(&off_board),
            Err(SyncError::OutOfBounds { x: 15, y: 3 })
        );

        let duplicate = SyncState {
            history: vec![(1, 1)],
            undone_history: vec![(1, 1)],
            ..Default::default()
        };
        assert_eq!(
            state.apply_sync_state(&duplicate),
            Err(SyncError::DuplicateCell { x: 1, y: 1 })
        );

        let bad_turn = SyncState {
            current_turn: 2,
            ..Default::default()
        };
        assert_eq!(state.apply_sync_state(&bad_turn), Err(SyncError::InvalidTurn(2)));

        let bad_winner = SyncState {
            winner: Some(7),
            ..Default::default()
        };
        assert_eq!(state.apply_sync_state(&bad_winner), Err(SyncError::InvalidWinner(7)));

        let bad_player = SyncState {
            player_names: [("2".to_string(), "Ghost".to_string())].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(
            state.apply_sync_state(&bad_player),
            Err(SyncError::InvalidPlayer("2".into()))
        );

        let long_name = SyncState {
            player_names: [("0".to_string(), "x".repeat(MAX_NAME_CHARS + 1))].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(
            state.apply_sync_state(&long_name),
            Err(SyncError::NameTooLong { limit: MAX_NAME_CHARS })
        );

        assert_eq!(state, before);
    }

    #[test]
    fn test_sync_partial_names_keep_others() {
        let mut state = GameState::default();
        state.set_name(Stone::Black, "Jessie");
        let snapshot = SyncState {
            player_names: [("1".to_string(), "Sheryl".to_string())].into_iter().collect(),
            ..Default::default()
        };
        state.apply_sync_state(&snapshot).unwrap();
        assert_eq!(state.name(Stone::Black), "Jessie");
        assert_eq!(state.name(Stone::White), "Sheryl");
    }
}
