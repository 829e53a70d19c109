//! The bot-to-runner protocol's `game_info` struct (spec.md §6).

/// Context the external match runner passes alongside a board snapshot and
/// rack on every move request.
#[derive(Debug, Clone)]
pub struct GameInfo {
    pub your_score: i32,
    pub opp_score: i32,
    pub tiles_in_bag: usize,
    /// 1-based move number.
    pub move_number: u32,
    /// Pre-existing board blanks, as (row, col, displayed letter) — 1-indexed.
    pub blanks_on_board: Vec<(usize, usize, char)>,
}

impl GameInfo {
    pub fn new(your_score: i32, opp_score: i32, tiles_in_bag: usize, move_number: u32) -> Self {
        Self {
            your_score,
            opp_score,
            tiles_in_bag,
            move_number,
            blanks_on_board: Vec::new(),
        }
    }

    /// `true` once the bag is empty and the endgame solver (spec.md §4.7)
    /// applies instead of Monte-Carlo search.
    pub fn is_endgame(&self) -> bool {
        self.tiles_in_bag == 0
    }

    /// `true` in the near-endgame band (spec.md §4.7: bag 1-8).
    pub fn is_near_endgame(&self) -> bool {
        (1..=8).contains(&self.tiles_in_bag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endgame_bands_are_mutually_exclusive() {
        let endgame = GameInfo::new(0, 0, 0, 10);
        assert!(endgame.is_endgame());
        assert!(!endgame.is_near_endgame());

        let near = GameInfo::new(0, 0, 5, 10);
        assert!(!near.is_endgame());
        assert!(near.is_near_endgame());

        let mid = GameInfo::new(0, 0, 40, 10);
        assert!(!mid.is_endgame());
        assert!(!mid.is_near_endgame());
    }
}
