use super::{OracleError, PolicyOracle, ValueOracle};
use crate::codec::{self, MOVE_SPACE};
use crate::position::{color_sign, Position};
use chess::{Board, ChessMove, Color, Piece, Square};

pub const MATERIAL_VALUE: &str = "material";
pub const CAPTURE_POLICY: &str = "capture";

// Centipawns at which the squashed value reaches tanh(1) ~ 0.76.
const VALUE_SCALE: f32 = 400.0;

fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 320,
        Piece::Bishop => 330,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 0,
    }
}

/// Static evaluation: material, piece-square tables and pawn structure,
/// squashed into `[-1, 1]`.
pub struct MaterialValue {
    // Tables are written from White's side with the eighth rank first.
    pawn_table: [[i32; 8]; 8],
    knight_table: [[i32; 8]; 8],
    bishop_table: [[i32; 8]; 8],
    rook_table: [[i32; 8]; 8],
    queen_table: [[i32; 8]; 8],
    king_table: [[i32; 8]; 8],
    king_endgame_table: [[i32; 8]; 8],

    doubled_pawn_penalty: i32,
    isolated_pawn_penalty: i32,
    connected_pawn_bonus: i32,
}

impl MaterialValue {
    pub fn new() -> Self {
        Self {
            pawn_table: [
                [0, 0, 0, 0, 0, 0, 0, 0],
                [50, 50, 50, 50, 50, 50, 50, 50],
                [10, 10, 20, 30, 30, 20, 10, 10],
                [5, 5, 10, 25, 25, 10, 5, 5],
                [0, 0, 0, 20, 20, 0, 0, 0],
                [5, -5, -10, 0, 0, -10, -5, 5],
                [5, 10, 10, -20, -20, 10, 10, 5],
                [0, 0, 0, 0, 0, 0, 0, 0],
            ],
            knight_table: [
                [-50, -40, -30, -30, -30, -30, -40, -50],
                [-40, -20, 0, 0, 0, 0, -20, -40],
                [-30, 0, 10, 15, 15, 10, 0, -30],
                [-30, 5, 15, 20, 20, 15, 5, -30],
                [-30, 0, 15, 20, 20, 15, 0, -30],
                [-30, 5, 10, 15, 15, 10, 5, -30],
                [-40, -20, 0, 5, 5, 0, -20, -40],
                [-50, -40, -30, -30, -30, -30, -40, -50],
            ],
            bishop_table: [
                [-20, -10, -10, -10, -10, -10, -10, -20],
                [-10, 0, 0, 0, 0, 0, 0, -10],
                [-10, 0, 5, 10, 10, 5, 0, -10],
                [-10, 5, 5, 10, 10, 5, 5, -10],
                [-10, 0, 10, 10, 10, 10, 0, -10],
                [-10, 10, 10, 10, 10, 10, 10, -10],
                [-10, 5, 0, 0, 0, 0, 5, -10],
                [-20, -10, -10, -10, -10, -10, -10, -20],
            ],
            rook_table: [
                [0, 0, 0, 0, 0, 0, 0, 0],
                [5, 10, 10, 10, 10, 10, 10, 5],
                [-5, 0, 0, 0, 0, 0, 0, -5],
                [-5, 0, 0, 0, 0, 0, 0, -5],
                [-5, 0, 0, 0, 0, 0, 0, -5],
                [-5, 0, 0, 0, 0, 0, 0, -5],
                [-5, 0, 0, 0, 0, 0, 0, -5],
                [0, 0, 0, 5, 5, 0, 0, 0],
            ],
            queen_table: [
                [-20, -10, -10, -5, -5, -10, -10, -20],
                [-10, 0, 0, 0, 0, 0, 0, -10],
                [-10, 0, 5, 5, 5, 5, 0, -10],
                [-5, 0, 5, 5, 5, 5, 0, -5],
                [0, 0, 5, 5, 5, 5, 0, -5],
                [-10, 5, 5, 5, 5, 5, 0, -10],
                [-10, 0, 5, 0, 0, 0, 0, -10],
                [-20, -10, -10, -5, -5, -10, -10, -20],
            ],
            king_table: [
                [-30, -40, -40, -50, -50, -40, -40, -30],
                [-30, -40, -40, -50, -50, -40, -40, -30],
                [-30, -40, -40, -50, -50, -40, -40, -30],
                [-30, -40, -40, -50, -50, -40, -40, -30],
                [-20, -30, -30, -40, -40, -30, -30, -20],
                [-10, -20, -20, -20, -20, -20, -20, -10],
                [20, 20, 0, 0, 0, 0, 20, 20],
                [20, 30, 10, 0, 0, 10, 30, 20],
            ],
            king_endgame_table: [
                [-50, -40, -30, -20, -20, -30, -40, -50],
                [-30, -20, -10, 0, 0, -10, -20, -30],
                [-30, -10, 20, 30, 30, 20, -10, -30],
                [-30, -10, 30, 40, 40, 30, -10, -30],
                [-30, -10, 30, 40, 40, 30, -10, -30],
                [-30, -10, 20, 30, 30, 20, -10, -30],
                [-30, -30, 0, 0, 0, 0, -30, -30],
                [-50, -30, -30, -30, -30, -30, -30, -50],
            ],

            doubled_pawn_penalty: -10,
            isolated_pawn_penalty: -20,
            connected_pawn_bonus: 10,
        }
    }

    /// Score in centipawns from White's point of view.
    pub fn centipawns(&self, board: &Board) -> i32 {
        let is_endgame = self.is_endgame(board);
        let mut score = 0;

        for square in *board.combined() {
            if let (Some(piece), Some(color)) = (board.piece_on(square), board.color_on(square)) {
                let value = piece_value(piece) + self.square_bonus(piece, color, square, is_endgame);
                score += match color {
                    Color::White => value,
                    Color::Black => -value,
                };
            }
        }

        score + self.pawn_structure(board, Color::White) - self.pawn_structure(board, Color::Black)
    }

    fn square_bonus(&self, piece: Piece, color: Color, square: Square, is_endgame: bool) -> i32 {
        let rank = square.get_rank().to_index();
        let file = square.get_file().to_index();
        let row = match color {
            Color::White => 7 - rank,
            Color::Black => rank,
        };

        let table = match piece {
            Piece::Pawn => &self.pawn_table,
            Piece::Knight => &self.knight_table,
            Piece::Bishop => &self.bishop_table,
            Piece::Rook => &self.rook_table,
            Piece::Queen => &self.queen_table,
            Piece::King if is_endgame => &self.king_endgame_table,
            Piece::King => &self.king_table,
        };
        table[row][file]
    }

    fn is_endgame(&self, board: &Board) -> bool {
        let majors = *board.pieces(Piece::Queen) | *board.pieces(Piece::Rook);
        majors.popcnt() <= 2
    }

    fn pawn_structure(&self, board: &Board, color: Color) -> i32 {
        let mut files = [0i32; 8];
        for square in *board.pieces(Piece::Pawn) & *board.color_combined(color) {
            files[square.get_file().to_index()] += 1;
        }

        let mut score = 0;
        for file in 0..8 {
            let count = files[file];
            if count == 0 {
                continue;
            }
            if count > 1 {
                score += self.doubled_pawn_penalty * (count - 1);
            }
            let left = file > 0 && files[file - 1] > 0;
            let right = file < 7 && files[file + 1] > 0;
            if !left && !right {
                score += self.isolated_pawn_penalty * count;
            }
            if right {
                score += self.connected_pawn_bonus;
            }
        }
        score
    }
}

impl Default for MaterialValue {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueOracle for MaterialValue {
    fn evaluate(&self, position: &Position) -> Result<f32, OracleError> {
        let white_cp = self.centipawns(position.board()) as f32;
        let relative = white_cp * color_sign(position.side_to_move());
        Ok((relative / VALUE_SCALE).tanh())
    }

    fn name(&self) -> &str {
        MATERIAL_VALUE
    }
}

/// Priors favouring captures of valuable pieces by cheap ones, and
/// promotions. Quiet moves keep a baseline weight so nothing is starved.
#[derive(Debug, Clone, Default)]
pub struct CapturePolicy;

impl CapturePolicy {
    pub fn new() -> Self {
        Self
    }

    fn weight(board: &Board, mv: ChessMove) -> f32 {
        let attacker = board.piece_on(mv.get_source()).unwrap_or(Piece::Pawn);
        let victim = match board.piece_on(mv.get_dest()) {
            Some(piece) => Some(piece),
            // en passant
            None if attacker == Piece::Pawn && mv.get_source().get_file() != mv.get_dest().get_file() => {
                Some(Piece::Pawn)
            }
            None => None,
        };

        let mut weight = 1.0;
        if let Some(victim) = victim {
            weight += piece_value(victim) as f32 / 100.0 - piece_value(attacker) as f32 / 1000.0;
        }
        if let Some(promotion) = mv.get_promotion() {
            weight += piece_value(promotion) as f32 / 100.0;
        }
        weight.max(0.1)
    }
}

impl PolicyOracle for CapturePolicy {
    fn score_distribution(&self, position: &Position) -> Result<Vec<f32>, OracleError> {
        let mut scores = vec![0.0; MOVE_SPACE];
        let side = position.side_to_move();
        let weights: Vec<(usize, f32)> = position
            .legal_moves()
            .into_iter()
            .map(|mv| (codec::encode(mv, side), Self::weight(position.board(), mv)))
            .collect();

        let total: f32 = weights.iter().map(|(_, w)| w).sum();
        if total > 0.0 {
            for (index, weight) in weights {
                scores[index] = weight / total;
            }
        }
        Ok(scores)
    }

    fn name(&self) -> &str {
        CAPTURE_POLICY
    }
}
