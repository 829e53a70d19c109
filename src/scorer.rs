//! Move scoring (spec.md §4.4, C5): main-word score, every cross-word, premium
//! squares, blanks, and the bingo bonus, in a single pass over the played
//! cells as spec.md prescribes.

use crate::board::{Board, Orientation, Pos};
use crate::config::{premium_at, tile_value, BINGO_BONUS};
use crate::mv::CrossWordScore;

/// Scores a single play. Stateless — a play is entirely described by the
/// board it's played on plus its own word/position/orientation/blank
/// bookkeeping, so `Scorer` carries no fields and is cheap to construct per
/// call (spec.md §4.5 "the evaluator is pure and thread-safe" applies
/// equally here).
#[derive(Debug, Default, Clone, Copy)]
pub struct Scorer;

impl Scorer {
    pub fn new() -> Self {
        Self
    }

    /// Scores `word` played at `start` along `orientation` on `board`
    /// (the board state BEFORE the play). `blanks_in_word` are 0-based
    /// indices within `word` where a *newly placed* rack blank landed;
    /// pre-existing board blanks within the span are discovered directly
    /// from `board`. Returns `None` if the word runs off the board.
    pub fn score_play(
        &self,
        board: &Board,
        word: &str,
        start: Pos,
        orientation: Orientation,
        blanks_in_word: &[usize],
        rack_size: usize,
    ) -> Option<(u32, Vec<CrossWordScore>)> {
        let chars: Vec<char> = word.chars().collect();
        let mut main_base = 0u32;
        let mut word_multiplier = 1u32;
        let mut new_tile_count = 0usize;
        let mut crosswords = Vec::new();

        for (i, &letter) in chars.iter().enumerate() {
            let pos = start.step(orientation, i as isize)?;
            let is_new = board.is_empty(pos);
            let is_blank = if is_new {
                blanks_in_word.contains(&i)
            } else {
                board.is_blank_at(pos)
            };
            let letter_value = if is_blank { 0 } else { tile_value(letter) };

            if is_new {
                new_tile_count += 1;
                let premium = premium_at(pos.row, pos.col);
                let (letter_mult, word_mult) = match premium {
                    Some(p) => (p.letter_multiplier(), p.word_multiplier()),
                    None => (1, 1),
                };
                main_base += letter_value * letter_mult;
                word_multiplier *= word_mult;

                if let Some(cw) =
                    self.cross_word(board, pos, orientation, letter, is_blank, letter_mult, word_mult)
                {
                    crosswords.push(cw);
                }
            } else {
                // Existing cells never re-apply a premium (spec.md §8
                // property 3): no multiplier, just the raw letter value.
                main_base += letter_value;
            }
        }

        let main_score = main_base * word_multiplier;
        let cross_total: u32 = crosswords.iter().map(|c| c.score).sum();
        let bingo = if new_tile_count == rack_size {
            BINGO_BONUS
        } else {
            0
        };
        Some((main_score + cross_total + bingo, crosswords))
    }

    /// The cross-word formed perpendicular to the main play by placing a
    /// new tile at `pos`, or `None` if `pos` has no perpendicular neighbor
    /// (no cross-word is formed).
    fn cross_word(
        &self,
        board: &Board,
        pos: Pos,
        orientation: Orientation,
        new_letter: char,
        new_is_blank: bool,
        letter_mult: u32,
        word_mult: u32,
    ) -> Option<CrossWordScore> {
        let perp = orientation.perpendicular();

        let mut prefix = Vec::new();
        let mut cur = pos;
        while let Some(prev) = cur.step(perp, -1) {
            if board.is_occupied(prev) {
                prefix.push(prev);
                cur = prev;
            } else {
                break;
            }
        }
        prefix.reverse();

        let mut suffix = Vec::new();
        let mut cur = pos;
        while let Some(next) = cur.step(perp, 1) {
            if board.is_occupied(next) {
                suffix.push(next);
                cur = next;
            } else {
                break;
            }
        }

        if prefix.is_empty() && suffix.is_empty() {
            return None;
        }

        let mut word = String::new();
        let mut score = 0u32;
        for &p in &prefix {
            let letter = board.get(p).unwrap();
            word.push(letter);
            score += if board.is_blank_at(p) { 0 } else { tile_value(letter) };
        }
        word.push(new_letter);
        score += (if new_is_blank { 0 } else { tile_value(new_letter) }) * letter_mult;
        for &p in &suffix {
            let letter = board.get(p).unwrap();
            word.push(letter);
            score += if board.is_blank_at(p) { 0 } else { tile_value(letter) };
        }
        score *= word_mult;

        let cw_start = *prefix.first().unwrap_or(&pos);
        Some(CrossWordScore {
            word,
            row: cw_start.row,
            col: cw_start.col,
            direction: perp,
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bingo_bonus_applied_once_regardless_of_crosswords() {
        let board = Board::new();
        let scorer = Scorer::new();
        let (score_no_cross, cws) = scorer
            .score_play(&board, "RETAINS", Pos::new(8, 2), Orientation::Horizontal, &[], 7)
            .unwrap();
        assert!(cws.is_empty());
        assert!(score_no_cross >= BINGO_BONUS);
    }

    #[test]
    fn premium_applies_only_to_new_tiles() {
        let mut board = Board::new();
        // Cover (8,8), the center double-word, with the first play.
        board
            .place_word("CAT", Pos::new(8, 7), Orientation::Horizontal, &[])
            .unwrap();
        let scorer = Scorer::new();
        let (first_score, _) = scorer
            .score_play(&board, "CAT", Pos::new(8, 7), Orientation::Horizontal, &[], 7)
            .unwrap();
        // C(3)+A(1)+T(1) = 5, doubled by the center DW = 10.
        assert_eq!(first_score, 10);

        // A second play spanning the same DW cell (already occupied) must
        // not re-apply the multiplier there.
        board
            .place_word("CATS", Pos::new(8, 7), Orientation::Horizontal, &[])
            .unwrap();
        let (second_score, _) = scorer
            .score_play(&board, "CATS", Pos::new(8, 7), Orientation::Horizontal, &[], 7)
            .unwrap();
        // Only the new S (value 1, no premium at (8,10)) counts as new.
        assert_eq!(second_score, 1);
    }

    #[test]
    fn blank_contributes_zero_everywhere_it_appears() {
        let board = Board::new();
        let scorer = Scorer::new();
        let (score, _) = scorer
            .score_play(&board, "CAT", Pos::new(8, 7), Orientation::Horizontal, &[0], 7)
            .unwrap();
        // Blank stands for C (value 0); A(1)+T(1) = 2, doubled by DW at (8,8) -> 4.
        assert_eq!(score, 4);
    }

    #[test]
    fn triple_word_multiplies_after_letter_premiums_are_summed() {
        // spec.md §4.4 step 2: letter premiums are summed first, then the
        // whole total is multiplied by the word premium(s) covered.
        // (1,1) is a 3W on the canonical table (see config.rs).
        let board = Board::new();
        let scorer = Scorer::new();
        let (score, _) = scorer
            .score_play(&board, "CAT", Pos::new(1, 1), Orientation::Horizontal, &[], 7)
            .unwrap();
        // C(3)+A(1)+T(1) = 5, tripled = 15.
        assert_eq!(score, 15);
    }
}
