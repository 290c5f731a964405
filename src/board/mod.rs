//! Board representation for Gobang

pub mod bitboard;
pub mod board;

#[cfg(test)]
mod tests;

// Re-exports
pub use bitboard::Bitboard;
pub use board::Board;

/// Board size (15x15)
pub const BOARD_SIZE: usize = 15;
pub const TOTAL_CELLS: usize = BOARD_SIZE * BOARD_SIZE; // 225

/// Stone colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stone {
    Empty,
    Black,
    White,
}

impl Stone {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }

    /// Player index used on the wire: Black = 0, White = 1.
    #[inline]
    pub fn index(self) -> Option<u8> {
        match self {
            Stone::Black => Some(0),
            Stone::White => Some(1),
            Stone::Empty => None,
        }
    }

    /// Inverse of [`Stone::index`].
    #[inline]
    pub fn from_index(index: u8) -> Option<Stone> {
        match index {
            0 => Some(Stone::Black),
            1 => Some(Stone::White),
            _ => None,
        }
    }

    /// Color of the n-th move of a game (Black always opens).
    #[inline]
    pub fn for_ply(ply: usize) -> Stone {
        if ply % 2 == 0 {
            Stone::Black
        } else {
            Stone::White
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stone::Black => "BLACK",
            Stone::White => "WHITE",
            Stone::Empty => "EMPTY",
        }
    }
}

/// Position on the board: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: u8,
    pub y: u8,
}

impl Pos {
    #[inline]
    pub fn new(x: u8, y: u8) -> Self {
        debug_assert!(x < BOARD_SIZE as u8 && y < BOARD_SIZE as u8);
        Self { x, y }
    }

    /// Checked constructor for coordinates coming from outside the crate.
    #[inline]
    pub fn try_new(x: i32, y: i32) -> Option<Self> {
        if Self::is_valid(x, y) {
            Some(Self { x: x as u8, y: y as u8 })
        } else {
            None
        }
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.y as usize * BOARD_SIZE + self.x as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self {
            x: (idx % BOARD_SIZE) as u8,
            y: (idx / BOARD_SIZE) as u8,
        }
    }

    #[inline]
    pub fn is_valid(x: i32, y: i32) -> bool {
        x >= 0 && x < BOARD_SIZE as i32 && y >= 0 && y < BOARD_SIZE as i32
    }

    /// Step `n` cells along `(dx, dy)`, if the result stays on the board.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32, n: i32) -> Option<Pos> {
        Self::try_new(self.x as i32 + dx * n, self.y as i32 + dy * n)
    }

    /// Iterate every cell in row-major order.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..TOTAL_CELLS).map(Pos::from_index)
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_index().cmp(&other.to_index())
    }
}
