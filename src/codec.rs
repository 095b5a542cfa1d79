//! Mapping between legal moves and the fixed index space shared with the
//! scoring oracles.
//!
//! Moves are encoded from the mover's point of view: for Black the board is
//! mirrored vertically, so the same pattern of play gets the same index for
//! either colour.
//!
//! Layout:
//! - `0..4096`: non-promotion moves, `from * 64 + to`.
//! - `4096..4192`: promotions, by piece (N, B, R, Q), source file and
//!   direction (capture left, push, capture right).

use chess::{ChessMove, Color, File, Piece, Rank, Square, ALL_SQUARES};

const PLAIN_MOVES: usize = 64 * 64;
const PROMOTION_PIECES: [Piece; 4] = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];

/// Size of the move index space.
pub const MOVE_SPACE: usize = PLAIN_MOVES + PROMOTION_PIECES.len() * 8 * 3;

fn relative(square: Square, side: Color) -> usize {
    match side {
        Color::White => square.to_index(),
        Color::Black => square.to_index() ^ 56,
    }
}

fn absolute(index: usize, side: Color) -> Square {
    match side {
        Color::White => ALL_SQUARES[index],
        Color::Black => ALL_SQUARES[index ^ 56],
    }
}

pub fn encode(mv: ChessMove, side: Color) -> usize {
    let from = relative(mv.get_source(), side);
    let to = relative(mv.get_dest(), side);

    match mv.get_promotion() {
        None => from * 64 + to,
        Some(piece) => {
            let piece_index = PROMOTION_PIECES
                .iter()
                .position(|&p| p == piece)
                .unwrap_or(PROMOTION_PIECES.len() - 1);
            let from_file = from % 8;
            // 0 = towards the a-file, 1 = straight, 2 = towards the h-file
            let direction = (to % 8 + 1).saturating_sub(from_file).min(2);
            PLAIN_MOVES + (piece_index * 8 + from_file) * 3 + direction
        }
    }
}

/// Inverse of [`encode`]. Returns `None` for indices outside the space or
/// promotion slots that would leave the board.
pub fn decode(index: usize, side: Color) -> Option<ChessMove> {
    if index < PLAIN_MOVES {
        let from = absolute(index / 64, side);
        let to = absolute(index % 64, side);
        return Some(ChessMove::new(from, to, None));
    }
    if index >= MOVE_SPACE {
        return None;
    }

    let slot = index - PLAIN_MOVES;
    let direction = slot % 3;
    let from_file = (slot / 3) % 8;
    let piece = PROMOTION_PIECES[slot / 24];

    let to_file = (from_file + direction).checked_sub(1).filter(|&f| f < 8)?;
    let from = Square::make_square(Rank::Seventh, File::from_index(from_file));
    let to = Square::make_square(Rank::Eighth, File::from_index(to_file));

    Some(ChessMove::new(
        absolute(from.to_index(), side),
        absolute(to.to_index(), side),
        Some(piece),
    ))
}
