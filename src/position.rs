use crate::error::{EngineError, Result};
use chess::{
    BitBoard, Board, BoardBuilder, BoardStatus, ChessMove, Color, File, MoveGen, Piece, Rank, Square, ALL_SQUARES,
    EMPTY,
};
use std::fmt;
use std::str::FromStr;

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const WHITE_WINS: &str = "1-0";
pub const BLACK_WINS: &str = "0-1";
pub const DRAW: &str = "1/2-1/2";
pub const ONGOING: &str = "*";

const LIGHT_SQUARES: BitBoard = BitBoard(0x55AA_55AA_55AA_55AA);

/// A chess position as the search sees it: the board from the `chess` crate
/// plus the bookkeeping it does not track (move clocks and the repetition
/// history needed for draw claims).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    // Hashes of earlier positions since the last capture or pawn move.
    history: Vec<u64>,
}

impl Position {
    pub fn startpos() -> Self {
        Self::from_board(Board::default())
    }

    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidFen(fen.to_string());
        let builder = BoardBuilder::from_str(fen).map_err(|_| invalid())?;

        // The board's sanity check looks up each king square, so a missing
        // king has to be rejected before conversion.
        for color in [Color::White, Color::Black] {
            let kings = ALL_SQUARES
                .iter()
                .filter(|&&sq| builder[sq] == Some((Piece::King, color)))
                .count();
            if kings != 1 {
                return Err(invalid());
            }
        }
        let board = Board::try_from(builder).map_err(|_| invalid())?;
        let mut clocks = fen.split_whitespace().skip(4);
        let halfmove_clock = clocks.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        let fullmove_number = clocks.next().and_then(|s| s.parse().ok()).unwrap_or(1);

        Ok(Self {
            board,
            halfmove_clock,
            fullmove_number,
            history: Vec::new(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Legal moves in generation order. The order is stable for a given
    /// board, which keeps child ordering (and tie-breaks) reproducible.
    pub fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }

    pub fn has_legal_moves(&self) -> bool {
        MoveGen::new_legal(&self.board).next().is_some()
    }

    pub fn is_legal(&self, mv: ChessMove) -> bool {
        self.board.legal(mv)
    }

    /// Returns the position after `mv`, leaving `self` untouched.
    pub fn apply_move(&self, mv: ChessMove) -> Result<Position> {
        if !self.board.legal(mv) {
            return Err(EngineError::InvalidMove {
                mv: mv.to_string(),
                fen: self.fen(),
            });
        }

        let irreversible = self.board.piece_on(mv.get_source()) == Some(Piece::Pawn)
            || self.board.piece_on(mv.get_dest()).is_some();

        let (halfmove_clock, history) = if irreversible {
            (0, Vec::new())
        } else {
            let mut history = self.history.clone();
            history.push(self.board.get_hash());
            (self.halfmove_clock + 1, history)
        };

        let fullmove_number = match self.side_to_move() {
            Color::White => self.fullmove_number,
            Color::Black => self.fullmove_number + 1,
        };

        Ok(Position {
            board: self.board.make_move_new(mv),
            halfmove_clock,
            fullmove_number,
            history,
        })
    }

    /// Parses a move in coordinate notation (`e2e4`, `e7e8q`) and checks it
    /// is legal here.
    pub fn parse_move(&self, move_str: &str) -> Result<ChessMove> {
        let invalid = || EngineError::InvalidMove {
            mv: move_str.to_string(),
            fen: self.fen(),
        };

        let bytes = move_str.as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return Err(invalid());
        }

        let square = |file: u8, rank: u8| -> Option<Square> {
            if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
                return None;
            }
            Some(Square::make_square(
                Rank::from_index((rank - b'1') as usize),
                File::from_index((file - b'a') as usize),
            ))
        };

        let from = square(bytes[0], bytes[1]).ok_or_else(invalid)?;
        let to = square(bytes[2], bytes[3]).ok_or_else(invalid)?;
        let promotion = match bytes.get(4) {
            None => None,
            Some(b'q') => Some(Piece::Queen),
            Some(b'r') => Some(Piece::Rook),
            Some(b'b') => Some(Piece::Bishop),
            Some(b'n') => Some(Piece::Knight),
            Some(_) => return Err(invalid()),
        };

        let mv = ChessMove::new(from, to, promotion);
        if self.board.legal(mv) {
            Ok(mv)
        } else {
            Err(invalid())
        }
    }

    /// Key identifying the position for repetition purposes (pieces, side to
    /// move, castling rights and en passant square).
    pub fn repetition_fingerprint(&self) -> u64 {
        self.board.get_hash()
    }

    /// How many times the current position has occurred, this one included.
    pub fn repetition_count(&self) -> usize {
        let current = self.board.get_hash();
        1 + self.history.iter().filter(|&&hash| hash == current).count()
    }

    pub fn is_insufficient_material(&self) -> bool {
        let board = &self.board;
        let heavy = *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
        if heavy != EMPTY {
            return false;
        }

        let knights = board.pieces(Piece::Knight).popcnt();
        let bishops = *board.pieces(Piece::Bishop);
        if knights + bishops.popcnt() <= 1 {
            return true;
        }

        // Any number of bishops all on one square colour cannot mate.
        knights == 0 && ((bishops & LIGHT_SQUARES) == EMPTY || (bishops & !LIGHT_SQUARES) == EMPTY)
    }

    /// With `claim_draw`, threefold repetition and the fifty-move rule end
    /// the game as well; without it only their automatic forms (fivefold,
    /// seventy-five moves) do.
    pub fn is_game_over(&self, claim_draw: bool) -> bool {
        self.outcome(claim_draw).is_some()
    }

    /// PGN-style result: `1-0`, `0-1`, `1/2-1/2`, or `*` while ongoing.
    pub fn result(&self, claim_draw: bool) -> &'static str {
        self.outcome(claim_draw).unwrap_or(ONGOING)
    }

    fn outcome(&self, claim_draw: bool) -> Option<&'static str> {
        match self.board.status() {
            BoardStatus::Checkmate => {
                return Some(match self.side_to_move() {
                    Color::White => BLACK_WINS,
                    Color::Black => WHITE_WINS,
                });
            }
            BoardStatus::Stalemate => return Some(DRAW),
            BoardStatus::Ongoing => {}
        }

        if self.is_insufficient_material() {
            return Some(DRAW);
        }

        let repetitions = self.repetition_count();
        if self.halfmove_clock >= 150 || repetitions >= 5 {
            return Some(DRAW);
        }
        if claim_draw && (self.halfmove_clock >= 100 || repetitions >= 3) {
            return Some(DRAW);
        }

        None
    }

    pub fn fen(&self) -> String {
        let board_fen = self.board.to_string();
        let fields: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        format!("{} {} {}", fields.join(" "), self.halfmove_clock, self.fullmove_number)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}

/// Reward of a finished game for `side`: +1 for a win, 0 for a draw, -1 for
/// a loss.
pub fn terminal_reward(result: &str, side: Color) -> Result<f32> {
    let white_score = match result {
        WHITE_WINS => 1.0,
        BLACK_WINS => -1.0,
        DRAW => 0.0,
        other => return Err(EngineError::UnknownResult(other.to_string())),
    };

    Ok(match side {
        Color::White => white_score,
        Color::Black => -white_score,
    })
}

/// +1 for White, -1 for Black.
pub fn color_sign(color: Color) -> f32 {
    match color {
        Color::White => 1.0,
        Color::Black => -1.0,
    }
}
