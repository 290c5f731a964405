//! Board rendering for the Gobang GUI

use crate::{Board, Pos, Stone, BOARD_SIZE};
use egui::{Color32, CornerRadius, Painter, Pos2, Rect, Sense, Stroke, Vec2};

use super::theme::*;

/// What the board needs from the game to draw one frame
pub struct BoardSnapshot<'a> {
    pub board: &'a Board,
    pub current_turn: Stone,
    pub last_move: Option<Pos>,
    pub winning_line: Option<Vec<Pos>>,
    /// Clicks and hover previews are enabled
    pub interactive: bool,
}

/// Board view handles rendering and input for the game board
pub struct BoardView {
    /// Cached cell size for coordinate calculations
    cell_size: f32,
    /// Board drawing area
    board_rect: Rect,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            cell_size: 36.0,
            board_rect: Rect::NOTHING,
        }
    }
}

impl BoardView {
    /// Render the board and return click position if any
    pub fn show(&mut self, ui: &mut egui::Ui, snapshot: &BoardSnapshot<'_>) -> Option<Pos> {
        let available_size = ui.available_size();

        // Calculate board size to fit available space
        let board_size = available_size.x.min(available_size.y) - 20.0;
        self.cell_size = (board_size - 2.0 * BOARD_MARGIN) / (BOARD_SIZE as f32 - 1.0);

        let (response, painter) = ui.allocate_painter(Vec2::new(board_size, board_size), Sense::click());
        self.board_rect = response.rect;

        painter.rect_filled(self.board_rect, CornerRadius::same(4), BOARD_BG);
        self.draw_grid(&painter);
        self.draw_star_points(&painter);
        self.draw_coordinates(&painter);
        self.draw_stones(&painter, snapshot.board);

        if let Some(pos) = snapshot.last_move {
            self.draw_last_move_marker(&painter, pos);
        }
        if let Some(line) = &snapshot.winning_line {
            self.draw_winning_line(&painter, line);
        }

        if !snapshot.interactive {
            return None;
        }

        // Hover preview and click
        let board_pos = response.hover_pos().and_then(|p| self.screen_to_board(p))?;
        if !snapshot.board.is_empty(board_pos) {
            return None;
        }
        if let Some(color) = hover_stone(snapshot.current_turn) {
            let radius = self.cell_size * STONE_RADIUS_RATIO;
            painter.circle_filled(self.board_to_screen(board_pos), radius, color);
        }
        response.clicked().then_some(board_pos)
    }

    /// Draw the 15x15 grid lines
    fn draw_grid(&self, painter: &Painter) {
        let stroke = Stroke::new(GRID_LINE_WIDTH, GRID_LINE);
        let span = (BOARD_SIZE as f32 - 1.0) * self.cell_size;

        for i in 0..BOARD_SIZE {
            let offset = BOARD_MARGIN + i as f32 * self.cell_size;

            // Vertical line
            let start = self.board_rect.min + Vec2::new(offset, BOARD_MARGIN);
            let end = self.board_rect.min + Vec2::new(offset, BOARD_MARGIN + span);
            painter.line_segment([start, end], stroke);

            // Horizontal line
            let start = self.board_rect.min + Vec2::new(BOARD_MARGIN, offset);
            let end = self.board_rect.min + Vec2::new(BOARD_MARGIN + span, offset);
            painter.line_segment([start, end], stroke);
        }
    }

    fn draw_star_points(&self, painter: &Painter) {
        for (x, y) in STAR_POINTS {
            let center = self.board_to_screen(Pos::new(x, y));
            painter.circle_filled(center, STAR_POINT_RADIUS, STAR_POINT);
        }
    }

    /// Draw coordinate labels (columns 0-14 across the top, rows down the left)
    fn draw_coordinates(&self, painter: &Painter) {
        let font = egui::FontId::proportional(11.0);

        for i in 0..BOARD_SIZE {
            let offset = BOARD_MARGIN + i as f32 * self.cell_size;

            let pos = Pos2::new(self.board_rect.min.x + offset, self.board_rect.min.y + 12.0);
            painter.text(pos, egui::Align2::CENTER_CENTER, i, font.clone(), GRID_LINE);

            let pos = Pos2::new(self.board_rect.min.x + 12.0, self.board_rect.min.y + offset);
            painter.text(pos, egui::Align2::CENTER_CENTER, i, font.clone(), GRID_LINE);
        }
    }

    fn draw_stones(&self, painter: &Painter, board: &Board) {
        for (stone, bits) in [Stone::Black, Stone::White]
            .into_iter()
            .filter_map(|s| board.stones(s).map(|b| (s, b)))
        {
            for pos in bits.iter_ones() {
                self.draw_stone(painter, pos, stone);
            }
        }
    }

    /// Draw a single stone with visual polish
    fn draw_stone(&self, painter: &Painter, pos: Pos, stone: Stone) {
        let center = self.board_to_screen(pos);
        let radius = self.cell_size * STONE_RADIUS_RATIO;
        let shadow_offset = Vec2::new(2.0, 2.0);

        match stone {
            Stone::Black => {
                painter.circle_filled(
                    center + shadow_offset,
                    radius,
                    Color32::from_rgba_unmultiplied(0, 0, 0, 60),
                );
                painter.circle_filled(center, radius, BLACK_STONE);

                // Highlight
                let highlight_offset = Vec2::new(-radius * 0.3, -radius * 0.3);
                painter.circle_filled(center + highlight_offset, radius * 0.2, BLACK_STONE_HIGHLIGHT);
            }
            Stone::White => {
                painter.circle_filled(
                    center + shadow_offset,
                    radius,
                    Color32::from_rgba_unmultiplied(0, 0, 0, 40),
                );
                painter.circle_filled(center, radius, WHITE_STONE);

                // Inner shadow for depth
                painter.circle_stroke(center, radius * 0.85, Stroke::new(radius * 0.1, WHITE_STONE_SHADOW));
            }
            Stone::Empty => {}
        }
    }

    fn draw_last_move_marker(&self, painter: &Painter, pos: Pos) {
        let center = self.board_to_screen(pos);
        painter.circle_filled(center, LAST_MOVE_MARKER_RADIUS, LAST_MOVE_MARKER);
    }

    /// Draw winning line highlight
    fn draw_winning_line(&self, painter: &Painter, line: &[Pos]) {
        let stroke = Stroke::new(4.0, WIN_HIGHLIGHT);

        for pair in line.windows(2) {
            let start = self.board_to_screen(pair[0]);
            let end = self.board_to_screen(pair[1]);
            painter.line_segment([start, end], stroke);
        }

        let radius = self.cell_size * STONE_RADIUS_RATIO + 3.0;
        for &pos in line {
            painter.circle_stroke(self.board_to_screen(pos), radius, stroke);
        }
    }

    /// Convert screen coordinates to board position
    pub fn screen_to_board(&self, screen_pos: Pos2) -> Option<Pos> {
        let relative = screen_pos - self.board_rect.min;
        let x = ((relative.x - BOARD_MARGIN) / self.cell_size).round() as i32;
        let y = ((relative.y - BOARD_MARGIN) / self.cell_size).round() as i32;
        Pos::try_new(x, y)
    }

    /// Convert board position to screen coordinates
    pub fn board_to_screen(&self, pos: Pos) -> Pos2 {
        let x = self.board_rect.min.x + BOARD_MARGIN + pos.x as f32 * self.cell_size;
        let y = self.board_rect.min.y + BOARD_MARGIN + pos.y as f32 * self.cell_size;
        Pos2::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> BoardView {
        BoardView {
            cell_size: 40.0,
            board_rect: Rect::from_min_size(Pos2::new(10.0, 20.0), Vec2::splat(632.0)),
        }
    }

    #[test]
    fn test_screen_board_round_trip() {
        let view = view();
        for pos in [Pos::new(0, 0), Pos::new(7, 7), Pos::new(14, 3), Pos::new(14, 14)] {
            assert_eq!(view.screen_to_board(view.board_to_screen(pos)), Some(pos));
        }
    }

    #[test]
    fn test_click_snaps_to_nearest_intersection() {
        let view = view();
        let center = view.board_to_screen(Pos::new(5, 6));
        assert_eq!(view.screen_to_board(center + Vec2::new(15.0, -15.0)), Some(Pos::new(5, 6)));
        assert_eq!(view.screen_to_board(center + Vec2::new(25.0, 0.0)), Some(Pos::new(6, 6)));
    }

    #[test]
    fn test_outside_grid_is_none() {
        let view = view();
        assert_eq!(view.screen_to_board(Pos2::new(-200.0, 50.0)), None);
        let corner = view.board_to_screen(Pos::new(14, 14));
        assert_eq!(view.screen_to_board(corner + Vec2::new(30.0, 0.0)), None);
    }
}
