//! Tic-tac-toe as a `RuleEngine`, for driving sessions in tests.
//!
//! Squares are `a1`..`c3` (column letter, row digit). A mark is placed by
//! a move whose origin and destination are the same square. Three in a
//! row counts as "checkmate" of the side left to move.

#![allow(dead_code)]

use duel_protocol::{Move, Participant, Roster, Turn};
use duel_session::{IllegalMove, RuleEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Turn>; 3]; 3],
    to_move: Turn,
}

impl Board {
    pub fn mark(&self, square: &str) -> Option<Turn> {
        let (row, col) = parse(square).ok()?;
        self.cells[row][col]
    }

    pub fn marks(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    fn line_owner(&self) -> Option<Turn> {
        const LINES: [[(usize, usize); 3]; 8] = [
            [(0, 0), (0, 1), (0, 2)],
            [(1, 0), (1, 1), (1, 2)],
            [(2, 0), (2, 1), (2, 2)],
            [(0, 0), (1, 0), (2, 0)],
            [(0, 1), (1, 1), (2, 1)],
            [(0, 2), (1, 2), (2, 2)],
            [(0, 0), (1, 1), (2, 2)],
            [(0, 2), (1, 1), (2, 0)],
        ];
        LINES.iter().find_map(|line| {
            let [a, b, c] = (*line).map(|(r, c)| self.cells[r][c]);
            match (a, b, c) {
                (Some(x), Some(y), Some(z)) if x == y && y == z => Some(x),
                _ => None,
            }
        })
    }

    fn full(&self) -> bool {
        self.marks() == 9
    }
}

fn parse(square: &str) -> Result<(usize, usize), IllegalMove> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(IllegalMove::new(format!("bad square {square}")));
    }
    let col = match bytes[0] {
        b'a'..=b'c' => (bytes[0] - b'a') as usize,
        _ => return Err(IllegalMove::new(format!("bad column in {square}"))),
    };
    let row = match bytes[1] {
        b'1'..=b'3' => (bytes[1] - b'1') as usize,
        _ => return Err(IllegalMove::new(format!("bad row in {square}"))),
    };
    Ok((row, col))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl RuleEngine for TicTacToe {
    type Position = Board;

    fn current_position(&self) -> Board {
        Board {
            cells: [[None; 3]; 3],
            to_move: Turn::First,
        }
    }

    fn apply_move(&self, position: &Board, mv: &Move) -> Result<Board, IllegalMove> {
        if mv.origin != mv.destination {
            return Err(IllegalMove::new("marks are placed, not moved"));
        }
        if self.is_game_over(position) {
            return Err(IllegalMove::new("game is over"));
        }
        if mv.mover != position.to_move {
            return Err(IllegalMove::new("wrong side to move"));
        }
        let (row, col) = parse(mv.destination.as_str())?;
        if position.cells[row][col].is_some() {
            return Err(IllegalMove::new("cell is occupied"));
        }

        let mut next = *position;
        next.cells[row][col] = Some(mv.mover);
        next.to_move = mv.mover.opponent();
        Ok(next)
    }

    fn is_game_over(&self, position: &Board) -> bool {
        position.line_owner().is_some() || position.full()
    }

    fn is_checkmate(&self, position: &Board) -> bool {
        position.line_owner().is_some()
    }

    fn is_draw(&self, position: &Board) -> bool {
        position.line_owner().is_none() && position.full()
    }

    fn turn_of(&self, position: &Board) -> Turn {
        position.to_move
    }
}

/// A move placing `mover`'s mark on `square`.
pub fn place(square: &str, mover: Turn) -> Move {
    Move::new(square, square, mover)
}

/// Alice (id 1) and Bob (id 2).
pub fn full_roster() -> Roster {
    Roster::from_participants(vec![
        Participant::new(1, "alice"),
        Participant::new(2, "bob"),
    ])
    .unwrap()
}

pub fn half_roster() -> Roster {
    Roster::from_participants(vec![Participant::new(1, "alice")]).unwrap()
}

/// First wins along the top row: a1 b2 b1 c3 c1 (alternating sides).
pub const FIRST_WINS: [&str; 5] = ["a1", "b2", "b1", "c3", "c1"];

/// Fills the board with no line: a1 b1 c1 b2 a2 c2 b3 a3 c3.
pub const DRAWN_GAME: [&str; 9] =
    ["a1", "b1", "c1", "b2", "a2", "c2", "b3", "a3", "c3"];
