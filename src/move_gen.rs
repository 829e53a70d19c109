//! The anchor-driven GADDAG move generator (spec.md §4.3, C4): Gordon's
//! algorithm as two mutually recursive traversal functions, `extend_left`
//! and `extend_right`, operating on the packed [`Gaddag`] with a
//! board-state-local [`CrossSetTable`].
//!
//! Grounded in `examples/duni-k-scrabbler/src/solver.rs`'s `part_before`/
//! `extend_after` skeleton (itself citing Appel & Jacobson, "The World's
//! Fastest Scrabble Program") and in
//! `examples/other_examples/1f37c234_seb-bl-scrabble-solver-rs__src-solver.rs.rs`'s
//! `ConstrainedBoard`/`RestrictedSquare` for the idea of precomputing
//! perpendicular-letter restrictions per line before enumerating placements.
//! Unlike the teacher's skeleton, recursion here is driven by a dedicated
//! `Search` state struct passed by mutable reference rather than captured
//! closures (spec.md §9's "recursive closures capturing locals" redesign
//! note); recursion depth is bounded by `BOARD_SIZE`, so stack recursion is
//! acceptable per that same note.

use crate::board::{Board, Orientation, Pos};
use crate::config::{BLANK, BOARD_SIZE, RACK_SIZE};
use crate::cross_set::CrossSetTable;
use crate::dictionary::Dictionary;
use crate::gaddag::{Gaddag, Offset, DELIM_IDX};
use crate::mv::{canonical_leave, is_blank_tile, Move};
use crate::scorer::Scorer;
use std::collections::HashMap;

/// Rack tile counts: index 0-25 for A-Z, 26 for the blank.
#[derive(Clone, Copy)]
struct RackCounts([i32; 27]);

impl RackCounts {
    fn from_rack(rack: &str) -> Self {
        let mut counts = [0i32; 27];
        for c in rack.chars() {
            counts[rack_index(c)] += 1;
        }
        Self(counts)
    }

    fn total(&self) -> usize {
        self.0.iter().map(|&n| n.max(0) as usize).sum()
    }

    fn consume(&mut self, letter: char, is_blank: bool) {
        self.0[if is_blank { 26 } else { rack_index(letter) }] -= 1;
    }

    fn restore(&mut self, letter: char, is_blank: bool) {
        self.0[if is_blank { 26 } else { rack_index(letter) }] += 1;
    }

    /// Every (letter, is_blank) combination currently available, without
    /// allocating more than one small `Vec` per recursion level.
    fn candidates(&self) -> Vec<(char, bool)> {
        let mut out = Vec::new();
        for (idx, &count) in self.0[0..26].iter().enumerate() {
            if count > 0 {
                out.push(((b'A' + idx as u8) as char, false));
            }
        }
        if self.0[26] > 0 {
            for c in 'A'..='Z' {
                out.push((c, true));
            }
        }
        out
    }

    fn leave_string(&self) -> String {
        let mut tiles = Vec::new();
        for (idx, &count) in self.0.iter().enumerate() {
            let letter = if idx == 26 { BLANK } else { (b'A' + idx as u8) as char };
            for _ in 0..count.max(0) {
                tiles.push(letter);
            }
        }
        canonical_leave(tiles)
    }
}

fn rack_index(c: char) -> usize {
    if is_blank_tile(c) {
        26
    } else {
        (c.to_ascii_uppercase() as usize) - ('A' as usize)
    }
}

#[derive(Debug, Clone, Copy)]
enum Origin {
    Existing,
    New { is_blank: bool },
}

/// The move generator: holds only borrowed, immutable references to the
/// shared read-only GADDAG and dictionary (spec.md §4.8: these are loaded
/// once and shared across every worker).
pub struct MoveGenerator<'a> {
    gaddag: &'a Gaddag,
    dictionary: &'a Dictionary,
}

impl<'a> MoveGenerator<'a> {
    pub fn new(gaddag: &'a Gaddag, dictionary: &'a Dictionary) -> Self {
        Self { gaddag, dictionary }
    }

    /// Enumerates every legal play for `rack` on `board`, sorted by score
    /// descending, deduplicated on (word, start, direction) (spec.md §4.3).
    /// An empty rack (or one the generator can't place) yields an empty
    /// list — not an error (spec.md §7 `NoLegalMoves`).
    pub fn generate(&self, board: &Board, rack: &str) -> Vec<Move> {
        let cross_sets = CrossSetTable::compute(board, self.dictionary);
        let rack_counts = RackCounts::from_rack(rack);
        let rack_size = rack_counts.total().max(RACK_SIZE);
        let mut results: HashMap<(String, usize, usize, bool), Move> = HashMap::new();

        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            for anchor in board.anchors() {
                let (coord, fixed) = match orientation {
                    Orientation::Horizontal => (anchor.col, anchor.row),
                    Orientation::Vertical => (anchor.row, anchor.col),
                };
                let mut search = Search {
                    board,
                    gaddag: self.gaddag,
                    dictionary: self.dictionary,
                    cross_sets: &cross_sets,
                    orientation,
                    fixed,
                    anchor_coord: coord as isize,
                    rack: rack_counts,
                    rack_size,
                    placed: HashMap::new(),
                    results: &mut results,
                };
                let limit = coord as isize - 1;
                search.extend_left(coord as isize, self.gaddag.root(), limit);
            }
        }

        let mut moves: Vec<Move> = results.into_values().collect();
        moves.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.word.cmp(&b.word)));
        moves
    }
}

struct Search<'a, 'b> {
    board: &'a Board,
    gaddag: &'a Gaddag,
    dictionary: &'a Dictionary,
    cross_sets: &'a CrossSetTable,
    orientation: Orientation,
    /// The row (Horizontal plays) or column (Vertical plays) that does not
    /// vary along the word.
    fixed: usize,
    anchor_coord: isize,
    rack: RackCounts,
    rack_size: usize,
    placed: HashMap<isize, (char, Origin)>,
    results: &'b mut HashMap<(String, usize, usize, bool), Move>,
}

impl Search<'_, '_> {
    fn pos(&self, coord: isize) -> Pos {
        match self.orientation {
            Orientation::Horizontal => Pos::new(self.fixed, coord as usize),
            Orientation::Vertical => Pos::new(coord as usize, self.fixed),
        }
    }

    fn in_bounds(&self, coord: isize) -> bool {
        (1..=BOARD_SIZE as isize).contains(&coord)
    }

    /// Walks leftward (or upward) from `coord` toward the board edge,
    /// matching existing tiles against the GADDAG and, budget permitting,
    /// trying every legal rack letter at empty squares. At every step it
    /// also tries crossing the `+` delimiter to continue with
    /// [`Search::extend_right`] (spec.md §4.3 `gen_left`).
    fn extend_left(&mut self, coord: isize, node: Offset, limit_remaining: isize) {
        if !self.in_bounds(coord) {
            return;
        }
        let pos = self.pos(coord);
        let at_anchor = coord == self.anchor_coord;

        if self.board.is_occupied(pos) {
            let letter = self.board.get(pos).unwrap();
            if let Some(child) = self.gaddag.get_child_letter(node, letter) {
                self.placed.insert(coord, (letter, Origin::Existing));
                self.after_step_left(coord, child, limit_remaining);
                self.placed.remove(&coord);
            }
            return;
        }

        if !at_anchor && limit_remaining <= 0 {
            return;
        }

        let perp_cross = self.cross_sets.get(pos, self.orientation);
        for (letter, is_blank) in self.rack.candidates() {
            if !perp_cross.allows(letter) {
                continue;
            }
            let Some(child) = self.gaddag.get_child_letter(node, letter) else {
                continue;
            };
            self.rack.consume(letter, is_blank);
            self.placed.insert(coord, (letter, Origin::New { is_blank }));
            let next_limit = if at_anchor { limit_remaining } else { limit_remaining - 1 };
            self.after_step_left(coord, child, next_limit);
            self.placed.remove(&coord);
            self.rack.restore(letter, is_blank);
        }
    }

    fn after_step_left(&mut self, coord: isize, node: Offset, limit_remaining: isize) {
        if let Some(sep) = self.gaddag.get_child(node, DELIM_IDX) {
            self.extend_right(self.anchor_coord + 1, sep);
        }
        self.extend_left(coord - 1, node, limit_remaining);
    }

    /// Walks rightward (or downward) from `coord`, matching existing tiles
    /// and trying rack letters at empty squares; records a play whenever a
    /// terminal node is reached at a cell followed by the board edge or an
    /// empty square (spec.md §4.3 `gen_right`).
    fn extend_right(&mut self, coord: isize, node: Offset) {
        if !self.in_bounds(coord) {
            if self.gaddag.is_terminal(node) {
                self.maybe_record();
            }
            return;
        }
        let pos = self.pos(coord);

        if self.board.is_occupied(pos) {
            let letter = self.board.get(pos).unwrap();
            if let Some(child) = self.gaddag.get_child_letter(node, letter) {
                self.placed.insert(coord, (letter, Origin::Existing));
                if self.gaddag.is_terminal(child) && self.word_ends_after(coord) {
                    self.maybe_record();
                }
                self.extend_right(coord + 1, child);
                self.placed.remove(&coord);
            }
            return;
        }

        let perp_cross = self.cross_sets.get(pos, self.orientation);
        for (letter, is_blank) in self.rack.candidates() {
            if !perp_cross.allows(letter) {
                continue;
            }
            let Some(child) = self.gaddag.get_child_letter(node, letter) else {
                continue;
            };
            self.rack.consume(letter, is_blank);
            self.placed.insert(coord, (letter, Origin::New { is_blank }));
            if self.gaddag.is_terminal(child) && self.word_ends_after(coord) {
                self.maybe_record();
            }
            self.extend_right(coord + 1, child);
            self.placed.remove(&coord);
            self.rack.restore(letter, is_blank);
        }
    }

    fn word_ends_after(&self, coord: isize) -> bool {
        let next = coord + 1;
        !self.in_bounds(next) || self.board.is_empty(self.pos(next))
    }

    /// Assembles the word currently held in `placed`, validates it against
    /// the soundness properties of spec.md §8 (at least one new tile, every
    /// coordinate contiguous), scores it, and records it if not already
    /// seen under the same (word, start, direction) key.
    fn maybe_record(&mut self) {
        if self.placed.len() < 2 {
            return;
        }
        let min_coord = *self.placed.keys().min().unwrap();
        let max_coord = *self.placed.keys().max().unwrap();
        if (max_coord - min_coord + 1) as usize != self.placed.len() {
            return; // not contiguous: a gap means this traversal path is incomplete
        }

        let has_new_tile = self
            .placed
            .values()
            .any(|(_, origin)| matches!(origin, Origin::New { .. }));
        if !has_new_tile {
            return;
        }

        let mut word = String::with_capacity(self.placed.len());
        let mut blanks_used = Vec::new();
        let mut tiles_used = Vec::new();
        for (i, coord) in (min_coord..=max_coord).enumerate() {
            let (letter, origin) = self.placed[&coord];
            word.push(letter);
            if let Origin::New { is_blank } = origin {
                tiles_used.push(if is_blank { BLANK } else { letter });
                if is_blank {
                    blanks_used.push(i);
                }
            }
        }

        if !self.dictionary.is_valid(&word) {
            return;
        }

        let start = self.pos(min_coord);
        let scorer = Scorer::new();
        let Some((score, crosswords)) = scorer.score_play(
            self.board,
            &word,
            start,
            self.orientation,
            &blanks_used,
            self.rack_size,
        ) else {
            return;
        };

        let mv = Move {
            word,
            start,
            direction: self.orientation,
            score,
            blanks_used,
            tiles_used,
            leave: self.rack.leave_string(),
            crosswords,
        };
        let key = mv.dedup_key();
        if self.results.contains_key(&key) {
            return;
        }
        self.results.insert(key, mv);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> Dictionary {
        Dictionary::build(
            [
                "RETAINS", "RETINAS", "NASTIER", "ANTSIER", "STRAINER", "CAT", "DOGS", "DOG",
                "CARE", "CARES", "BATS", "BAT",
            ]
            .iter()
            .map(|s| s.to_string()),
            ["TS", "AT", "AS"].iter().map(|s| s.to_string()),
        )
    }

    fn gaddag(dictionary: &Dictionary) -> Gaddag {
        let words: Vec<&str> = [
            "RETAINS", "RETINAS", "NASTIER", "ANTSIER", "STRAINER", "CAT", "DOGS", "DOG", "CARE",
            "CARES", "BATS", "BAT",
        ]
        .to_vec();
        let _ = dictionary;
        Gaddag::build_from_dictionary(words, ["TS", "AT", "AS"])
    }

    #[test]
    fn opening_move_covers_center() {
        let dictionary = dict();
        let g = gaddag(&dictionary);
        let gen = MoveGenerator::new(&g, &dictionary);
        let board = Board::new();
        let moves = gen.generate(&board, "AEINRST");
        assert!(!moves.is_empty());
        for m in &moves {
            let center = Pos::center();
            let covers_center = match m.direction {
                Orientation::Horizontal => {
                    m.start.row == center.row
                        && m.start.col <= center.col
                        && center.col < m.start.col + m.word.len()
                }
                Orientation::Vertical => {
                    m.start.col == center.col
                        && m.start.row <= center.row
                        && center.row < m.start.row + m.word.len()
                }
            };
            assert!(covers_center, "move {:?} does not cover center", m);
        }
    }

    #[test]
    fn finds_seven_letter_bingo_on_empty_board() {
        let dictionary = dict();
        let g = gaddag(&dictionary);
        let gen = MoveGenerator::new(&g, &dictionary);
        let board = Board::new();
        let moves = gen.generate(&board, "AEINRST");
        assert!(moves.iter().any(|m| m.word.len() == 7 && m.is_bingo(7)));
    }

    #[test]
    fn cross_word_play_is_validated_against_dictionary() {
        let dictionary = dict();
        let g = gaddag(&dictionary);
        let gen = MoveGenerator::new(&g, &dictionary);
        let mut board = Board::new();
        board
            .place_word("CAT", Pos::new(8, 7), Orientation::Horizontal, &[])
            .unwrap();
        let moves = gen.generate(&board, "DOGS");
        // Every move returned must have only legal-length cross-words.
        for m in &moves {
            for cw in &m.crosswords {
                assert!(cw.word.len() >= 2);
                assert!(dictionary.is_valid(&cw.word));
            }
        }
    }

    #[test]
    fn generator_is_idempotent() {
        let dictionary = dict();
        let g = gaddag(&dictionary);
        let gen = MoveGenerator::new(&g, &dictionary);
        let board = Board::new();
        let first = gen.generate(&board, "AEINRST");
        let second = gen.generate(&board, "AEINRST");
        assert_eq!(first, second);
    }

    #[test]
    fn no_moves_for_empty_rack_is_not_an_error() {
        let dictionary = dict();
        let g = gaddag(&dictionary);
        let gen = MoveGenerator::new(&g, &dictionary);
        let board = Board::new();
        let moves = gen.generate(&board, "");
        assert!(moves.is_empty());
    }

    #[test]
    fn completeness_matches_brute_force_for_small_rack() {
        // Brute force every placement of a 3-tile rack on an empty board's
        // single anchor and compare against the generator (spec.md §8
        // property 6).
        let dictionary = Dictionary::build(
            ["CAT", "CAR", "ARE"].iter().map(|s| s.to_string()),
            ["AT", "AR"].iter().map(|s| s.to_string()),
        );
        let g = Gaddag::build_from_dictionary(["CAT", "CAR", "ARE"], ["AT", "AR"]);
        let gen = MoveGenerator::new(&g, &dictionary);
        let board = Board::new();
        let generated = gen.generate(&board, "CAT");

        let mut brute_force = Vec::new();
        let center = Pos::center();
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            for offset in 0..3isize {
                let Some(start) = center.step(orientation, -offset) else {
                    continue;
                };
                for perm in permutations(&['C', 'A', 'T']) {
                    let word: String = perm.iter().collect();
                    if dictionary.is_valid(&word) {
                        // word must still span the center cell
                        let len = word.len() as isize;
                        let covers = (0..len).any(|i| start.step(orientation, i) == Some(center));
                        if covers {
                            brute_force.push((word, start, orientation));
                        }
                    }
                }
            }
        }
        brute_force.sort();
        brute_force.dedup();

        let mut generated_keys: Vec<(String, Pos, Orientation)> = generated
            .iter()
            .map(|m| (m.word.clone(), m.start, m.direction))
            .collect();
        generated_keys.sort_by(|a, b| {
            (a.0.clone(), a.1.row, a.1.col).cmp(&(b.0.clone(), b.1.row, b.1.col))
        });

        for (word, start, orientation) in &brute_force {
            assert!(
                generated_keys
                    .iter()
                    .any(|(w, p, o)| w == word && p == start && o == orientation),
                "brute force found {word} at {start:?}/{orientation:?} but generator did not"
            );
        }
    }

    fn permutations(letters: &[char]) -> Vec<Vec<char>> {
        if letters.len() <= 1 {
            return vec![letters.to_vec()];
        }
        let mut out = Vec::new();
        for i in 0..letters.len() {
            let mut rest = letters.to_vec();
            let chosen = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, chosen);
                out.push(tail);
            }
        }
        out
    }
}
