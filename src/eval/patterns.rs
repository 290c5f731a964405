//! Window scores for the one-ply evaluator
//!
//! A five-cell window contributes only when it holds stones of a single
//! side. Completing our own line always outranks blocking the opponent's,
//! and a block of four outranks any building move.

/// Scores for five-cell windows
pub struct WindowScore;

impl WindowScore {
    // Own stones only
    /// Four of ours: playing here wins
    pub const OWN_FOUR: i32 = 1_000_000;
    pub const OWN_THREE: i32 = 10_000;
    pub const OWN_TWO: i32 = 1_000;

    // Opponent stones only
    /// Four of theirs: must block
    pub const OPP_FOUR: i32 = 900_000;
    pub const OPP_THREE: i32 = 8_000;
    pub const OPP_TWO: i32 = 500;
}

/// Score a single window from its stone counts.
///
/// Mixed windows are dead for both sides and score zero, as do windows with
/// fewer than two stones of one color.
#[inline]
pub fn window_score(own: usize, opp: usize) -> i32 {
    match (own, opp) {
        (4, 0) => WindowScore::OWN_FOUR,
        (3, 0) => WindowScore::OWN_THREE,
        (2, 0) => WindowScore::OWN_TWO,
        (0, 4) => WindowScore::OPP_FOUR,
        (0, 3) => WindowScore::OPP_THREE,
        (0, 2) => WindowScore::OPP_TWO,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_score_hierarchy() {
        assert!(WindowScore::OWN_FOUR > WindowScore::OPP_FOUR);
        assert!(WindowScore::OPP_FOUR > WindowScore::OWN_THREE);
        assert!(WindowScore::OWN_THREE > WindowScore::OPP_THREE);
        assert!(WindowScore::OPP_THREE > WindowScore::OWN_TWO);
        assert!(WindowScore::OWN_TWO > WindowScore::OPP_TWO);
    }

    #[test]
    fn test_mixed_windows_are_dead() {
        assert_eq!(window_score(3, 1), 0);
        assert_eq!(window_score(1, 3), 0);
        assert_eq!(window_score(2, 2), 0);
    }

    #[test]
    fn test_sparse_windows_score_nothing() {
        assert_eq!(window_score(0, 0), 0);
        assert_eq!(window_score(1, 0), 0);
        assert_eq!(window_score(0, 1), 0);
    }

    #[test]
    fn test_single_sided_windows() {
        assert_eq!(window_score(4, 0), 1_000_000);
        assert_eq!(window_score(0, 4), 900_000);
        assert_eq!(window_score(3, 0), 10_000);
        assert_eq!(window_score(0, 3), 8_000);
        assert_eq!(window_score(2, 0), 1_000);
        assert_eq!(window_score(0, 2), 500);
    }
}
