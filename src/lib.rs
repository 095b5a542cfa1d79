pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod mcts;
pub mod oracle;
pub mod position;
pub mod time;
pub mod uci;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use mcts::{Mcts, SearchReport};
pub use position::Position;
pub use uci::UciHandler;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chess::{Piece, Square};
    use position::{BLACK_WINS, DRAW, ONGOING};

    fn play(position: &Position, moves: &[&str]) -> Position {
        moves.iter().fold(position.clone(), |current, mv| {
            let mv = current.parse_move(mv).unwrap();
            current.apply_move(mv).unwrap()
        })
    }

    #[test]
    fn test_initial_position() {
        let position = Position::startpos();
        let moves = position.legal_moves();

        // White should have 20 legal moves in the initial position
        assert_eq!(moves.len(), 20);
        for mv in moves {
            assert!(position.is_legal(mv));
        }
        assert_eq!(position.result(true), ONGOING);
    }

    #[test]
    fn test_castling() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        assert!(position.parse_move("e1g1").is_ok());
        assert!(position.parse_move("e1c1").is_ok());

        let castled = play(&position, &["e1g1"]);
        assert_eq!(castled.board().piece_on(Square::F1), Some(Piece::Rook));
        assert_eq!(castled.board().piece_on(Square::G1), Some(Piece::King));
    }

    #[test]
    fn test_en_passant() {
        let position = play(&Position::startpos(), &["e2e4", "d7d5", "e4e5", "f7f5"]);

        let after = play(&position, &["e5f6"]);
        assert_eq!(after.board().piece_on(Square::F5), None);
        assert_eq!(after.board().piece_on(Square::F6), Some(Piece::Pawn));
        // A capture resets the fifty-move clock.
        assert_eq!(after.halfmove_clock(), 0);
    }

    #[test]
    fn test_promotion() {
        let position = Position::from_fen("8/P7/8/8/8/8/8/k3K3 w - - 0 1").unwrap();

        let promotions = position
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.get_promotion().is_some())
            .count();

        // Should have 4 promotion options (Queen, Rook, Bishop, Knight)
        assert_eq!(promotions, 4);
        let queened = play(&position, &["a7a8q"]);
        assert_eq!(queened.board().piece_on(Square::A8), Some(Piece::Queen));
    }

    #[test]
    fn test_checkmate() {
        let position = play(&Position::startpos(), &["f2f3", "e7e5", "g2g4", "d8h4"]);

        assert!(!position.has_legal_moves());
        assert!(position.is_game_over(false));
        assert_eq!(position.result(false), BLACK_WINS);
    }

    #[test]
    fn test_stalemate() {
        let position = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();

        assert!(position.legal_moves().is_empty());
        assert_eq!(position.result(false), DRAW);
    }

    #[test]
    fn test_insufficient_material() {
        // King vs King
        let bare = Position::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(bare.is_insufficient_material());
        assert_eq!(bare.result(false), DRAW);

        // King and bishop vs King
        let bishop = Position::from_fen("8/8/8/4k3/8/8/8/2B1K3 w - - 0 1").unwrap();
        assert!(bishop.is_insufficient_material());

        // A rook can still mate
        let rook = Position::from_fen("8/8/8/4k3/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(!rook.is_insufficient_material());
        assert!(!rook.is_game_over(true));
    }

    #[test]
    fn test_fifty_move_rule() {
        let position = Position::from_fen("8/8/8/4k3/8/8/4R3/4K3 w - - 100 80").unwrap();

        // Claimable, not automatic
        assert!(!position.is_game_over(false));
        assert!(position.is_game_over(true));
        assert_eq!(position.result(true), DRAW);

        let automatic = Position::from_fen("8/8/8/4k3/8/8/4R3/4K3 w - - 150 105").unwrap();
        assert!(automatic.is_game_over(false));
    }

    #[test]
    fn test_threefold_repetition() {
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        let twice = play(&Position::startpos(), &shuffle);
        assert_eq!(twice.repetition_count(), 2);
        assert!(!twice.is_game_over(true));

        let thrice = play(&twice, &shuffle);
        assert_eq!(thrice.repetition_count(), 3);
        assert_eq!(thrice.repetition_fingerprint(), Position::startpos().repetition_fingerprint());
        assert!(!thrice.is_game_over(false));
        assert_eq!(thrice.result(true), DRAW);
    }

    #[test]
    fn test_move_validation() {
        // The bishop on e2 is pinned to the king by the rook on e7.
        let position = Position::from_fen("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();

        assert_matches!(position.parse_move("e2d3"), Err(EngineError::InvalidMove { .. }));
        assert_matches!(position.parse_move("e9e4"), Err(EngineError::InvalidMove { .. }));
        assert_matches!(position.parse_move("e1"), Err(EngineError::InvalidMove { .. }));

        let pinned = chess::ChessMove::new(Square::E2, Square::D3, None);
        assert_matches!(position.apply_move(pinned), Err(EngineError::InvalidMove { .. }));
    }

    #[test]
    fn test_fen_round_trip() {
        let position = play(&Position::startpos(), &["e2e4", "c7c5", "g1f3"]);
        assert_eq!(position.fullmove_number(), 2);
        assert_eq!(position.halfmove_clock(), 1);

        let reparsed = Position::from_fen(&position.fen()).unwrap();
        assert_eq!(reparsed.board(), position.board());
        assert_eq!(reparsed.fen(), position.fen());
        assert_matches!(Position::from_fen("not a fen"), Err(EngineError::InvalidFen(_)));
    }

    #[test]
    fn test_fen_without_both_kings_is_rejected() {
        for fen in [
            "4k3/8/8/8/8/8/8/8 w - - 0 1",
            "8/8/8/8/8/8/8/4K3 b - - 0 1",
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "3kk3/8/8/8/8/8/8/4K3 w - - 0 1",
        ] {
            assert_matches!(Position::from_fen(fen), Err(EngineError::InvalidFen(_)));
        }
    }

    #[test]
    fn test_terminal_reward() {
        use chess::Color;
        use position::{terminal_reward, WHITE_WINS};

        assert_eq!(terminal_reward(WHITE_WINS, Color::White).unwrap(), 1.0);
        assert_eq!(terminal_reward(WHITE_WINS, Color::Black).unwrap(), -1.0);
        assert_eq!(terminal_reward(BLACK_WINS, Color::Black).unwrap(), 1.0);
        assert_eq!(terminal_reward(DRAW, Color::White).unwrap(), 0.0);
        assert_eq!(terminal_reward(DRAW, Color::Black).unwrap(), 0.0);
        assert_matches!(terminal_reward(ONGOING, Color::White), Err(EngineError::UnknownResult(_)));
        assert_matches!(terminal_reward("2-0", Color::Black), Err(EngineError::UnknownResult(_)));
    }

    #[test]
    fn test_perft_initial_position() {
        let position = Position::startpos();

        assert_eq!(perft(&position, 1), 20);
        assert_eq!(perft(&position, 2), 400);
        assert_eq!(perft(&position, 3), 8902);
    }

    // Helper function to perform perft
    fn perft(position: &Position, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }

        let moves = position.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0;
        for mv in moves {
            let next = position.apply_move(mv).unwrap();
            nodes += perft(&next, depth - 1);
        }

        nodes
    }
}
