//! Turns the clock fields of a `go` command into a search budget.

use crate::error::{EngineError, Result};
use chess::Color;

/// Moves assumed to remain when `go` gives no `movestogo`.
const DEFAULT_MOVES_TO_GO: f64 = 20.0;
/// Fischer games are budgeted as if this many moves were left.
const FISCHER_MOVES: f64 = 16.0;
const INCREMENT_SHARE: f64 = 0.75;

/// Clock fields of a `go` command, in milliseconds (move count for
/// `movestogo`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeControl {
    pub wtime: Option<f64>,
    pub btime: Option<f64>,
    pub winc: Option<f64>,
    pub binc: Option<f64>,
    pub movestogo: Option<f64>,
    pub movetime: Option<f64>,
}

impl TimeControl {
    /// Parses the tokens following `go`. Tokens that are not clock keys are
    /// skipped.
    pub fn parse(tokens: &[&str]) -> Result<Self> {
        let mut tc = TimeControl::default();
        let mut iter = tokens.iter();

        while let Some(&key) = iter.next() {
            let slot = match key {
                "wtime" => &mut tc.wtime,
                "btime" => &mut tc.btime,
                "winc" => &mut tc.winc,
                "binc" => &mut tc.binc,
                "movestogo" => &mut tc.movestogo,
                "movetime" => &mut tc.movetime,
                _ => continue,
            };

            let raw = iter
                .next()
                .ok_or_else(|| EngineError::TimeControlParse(format!("missing value for {}", key)))?;
            let value: f64 = raw
                .parse()
                .map_err(|_| EngineError::TimeControlParse(format!("{} is not a number: {}", key, raw)))?;
            *slot = Some(value);
        }

        Ok(tc)
    }

    fn clocks(&self, side: Color) -> (Option<f64>, Option<f64>, Option<f64>) {
        match side {
            Color::White => (self.wtime, self.btime, self.winc),
            Color::Black => (self.btime, self.wtime, self.binc),
        }
    }
}

/// Remembers the clock seen on the first classic-control `go` of a game so
/// later moves can be budgeted against the whole control.
#[derive(Debug, Clone, Default)]
pub struct TimeManager {
    total_time: Option<f64>,
    total_moves: Option<f64>,
}

impl TimeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.total_time = None;
        self.total_moves = None;
    }

    /// Seconds to search for `side`.
    pub fn compute_duration(&mut self, side: Color, tc: &TimeControl) -> Result<f64> {
        let millis = if let Some(movetime) = tc.movetime {
            movetime
        } else if tc.winc.is_some() && tc.binc.is_some() {
            Self::fischer(side, tc)?
        } else {
            self.classic(side, tc)?
        };
        Ok(millis / 1000.0)
    }

    fn fischer(side: Color, tc: &TimeControl) -> Result<f64> {
        let (time, other_time, inc) = match tc.clocks(side) {
            (Some(time), Some(other), Some(inc)) => (time, other, inc),
            _ => {
                return Err(EngineError::TimeControlParse(
                    "increment given without both clocks".to_string(),
                ))
            }
        };

        let ratio = (other_time / time).max(1.0);
        let moves = FISCHER_MOVES * ratio.min(2.0);
        Ok(time / moves + INCREMENT_SHARE * inc)
    }

    fn classic(&mut self, side: Color, tc: &TimeControl) -> Result<f64> {
        let (time, _, _) = tc.clocks(side);
        let time = time.ok_or_else(|| EngineError::TimeControlParse(format!("no clock for {:?}", side)))?;

        if self.total_time.is_none() && self.total_moves.is_none() {
            self.total_moves = tc.movestogo;
            self.total_time = Some(time);
        }

        let moves = tc.movestogo.filter(|&m| m > 0.0).unwrap_or(DEFAULT_MOVES_TO_GO);
        let naive = time / moves;
        let fair = match (self.total_moves, self.total_time) {
            (Some(total_moves), Some(total_time)) if total_moves > 0.0 => {
                (time + total_time) / (moves + total_moves)
            }
            _ => f64::INFINITY,
        };
        Ok(naive.min(fair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn tc(line: &str) -> TimeControl {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        TimeControl::parse(&tokens).unwrap()
    }

    #[test]
    fn test_parse() {
        let parsed = tc("wtime 1000 btime 2000 winc 10 binc 20 movestogo 5 infinite");
        assert_eq!(parsed.wtime, Some(1000.0));
        assert_eq!(parsed.btime, Some(2000.0));
        assert_eq!(parsed.winc, Some(10.0));
        assert_eq!(parsed.binc, Some(20.0));
        assert_eq!(parsed.movestogo, Some(5.0));
        assert_eq!(parsed.movetime, None);
    }

    #[test]
    fn test_parse_errors() {
        assert_matches!(TimeControl::parse(&["wtime"]), Err(EngineError::TimeControlParse(_)));
        assert_matches!(
            TimeControl::parse(&["movetime", "soon"]),
            Err(EngineError::TimeControlParse(_))
        );
    }

    #[test]
    fn test_movetime() {
        let mut manager = TimeManager::new();
        assert_eq!(manager.compute_duration(Color::White, &tc("movetime 500")).unwrap(), 0.5);
        // movetime wins over any clock
        let mixed = tc("wtime 60000 btime 60000 winc 1000 binc 1000 movetime 250");
        assert_eq!(manager.compute_duration(Color::Black, &mixed).unwrap(), 0.25);
    }

    #[test]
    fn test_fischer_symmetric() {
        let mut manager = TimeManager::new();
        let control = tc("wtime 60000 btime 60000 winc 1000 binc 1000");
        let duration = manager.compute_duration(Color::White, &control).unwrap();
        assert!((duration - 4.5).abs() < 1e-9);
        assert!(duration > 0.0 && duration < 60.0);
    }

    #[test]
    fn test_fischer_when_ahead_on_time() {
        let mut manager = TimeManager::new();
        // Black has three times White's clock and budgets for 16 moves.
        let control = tc("wtime 32000 btime 96000 winc 0 binc 0");
        let duration = manager.compute_duration(Color::Black, &control).unwrap();
        assert!((duration - 6.0).abs() < 1e-9);
        // White is behind: ratio 3 capped at 2.
        let duration = manager.compute_duration(Color::White, &control).unwrap();
        assert!((duration - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fischer_needs_both_clocks() {
        let mut manager = TimeManager::new();
        assert_matches!(
            manager.compute_duration(Color::White, &tc("wtime 1000 winc 10 binc 10")),
            Err(EngineError::TimeControlParse(_))
        );
    }

    #[test]
    fn test_classic_without_movestogo() {
        let mut manager = TimeManager::new();
        let duration = manager.compute_duration(Color::White, &tc("wtime 60000 btime 60000")).unwrap();
        assert!((duration - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_classic_uses_whole_control() {
        let mut manager = TimeManager::new();
        // First move of 40 in 2 minutes.
        let first = manager
            .compute_duration(Color::Black, &tc("wtime 120000 btime 120000 movestogo 40"))
            .unwrap();
        assert!((first - 3.0).abs() < 1e-9);

        // Spent time fast early: naive 60000/10 = 6s, fair 180000/50 = 3.6s.
        let later = manager
            .compute_duration(Color::Black, &tc("wtime 90000 btime 60000 movestogo 10"))
            .unwrap();
        assert!((later - 3.6).abs() < 1e-9);

        manager.reset();
        let fresh = manager
            .compute_duration(Color::Black, &tc("wtime 90000 btime 60000 movestogo 10"))
            .unwrap();
        assert!((fresh - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_classic_needs_own_clock() {
        let mut manager = TimeManager::new();
        assert_matches!(
            manager.compute_duration(Color::White, &tc("btime 1000")),
            Err(EngineError::TimeControlParse(_))
        );
        assert_matches!(manager.compute_duration(Color::White, &tc("")), Err(EngineError::TimeControlParse(_)));
    }
}
