use crate::config::{EngineConfig, OptionChange};
use crate::error::{EngineError, Result};
use crate::mcts::Mcts;
use crate::oracle::{build_policy, build_value};
use crate::position::Position;
use crate::time::{TimeControl, TimeManager};
use chess::ChessMove;
use log::{debug, warn};
use std::io::{self, BufRead, Write};

pub const ENGINE_NAME: &str = "Salmon MCTS";
pub const ENGINE_AUTHOR: &str = "Magnus Torvund";

pub struct UciHandler {
    config: EngineConfig,
    mcts: Mcts,
    time_manager: TimeManager,
}

impl UciHandler {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let policy = build_policy(&config)?;
        let value = build_value(&config)?;

        let mut mcts = Mcts::new(Position::startpos(), policy, value, config.confidence);
        if let Some(seed) = config.seed {
            mcts = mcts.with_seed(seed);
        }

        Ok(UciHandler {
            config,
            mcts,
            time_manager: TimeManager::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mcts(&self) -> &Mcts {
        &self.mcts
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Reads commands line by line until `quit` or end of input.
    pub fn run_with<R: BufRead, W: Write>(&mut self, mut reader: R, mut writer: W) -> anyhow::Result<()> {
        let mut buf = Vec::new();

        while reader.read_until(b'\n', &mut buf)? > 0 {
            // Undecodable bytes become U+FFFD and end up as an unknown command.
            let line = String::from_utf8_lossy(&buf).into_owned();
            buf.clear();
            let command = line.trim();
            debug!("received: {}", command);

            if command == "quit" {
                break;
            }

            let response = self.handle_command(command);
            writer.write_all(response.as_bytes())?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Handles one command and returns everything it prints. Failures are
    /// reported as `info string error: ...` and never end the session.
    pub fn handle_command(&mut self, command: &str) -> String {
        let parts: Vec<&str> = command.split_whitespace().collect();
        let Some(&head) = parts.first() else {
            return String::new();
        };

        let outcome = match head {
            "uci" => Ok(self.handle_uci()),
            "isready" => Ok("readyok\n".to_string()),
            "ucinewgame" => Ok(self.handle_ucinewgame()),
            "position" => self.handle_position(&parts[1..]),
            "go" => Ok(self.handle_go(&parts[1..])),
            "setoption" => self.handle_setoption(&parts[1..]),
            // Search is synchronous, nothing to stop.
            "stop" | "quit" => Ok(String::new()),
            _ => Ok(format!("info string unknown command: {}\n", command.trim())),
        };

        outcome.unwrap_or_else(|e| report_error(&e))
    }

    fn handle_uci(&self) -> String {
        let mut out = format!("id name {}\nid author {}\n", ENGINE_NAME, ENGINE_AUTHOR);
        for option in self.config.uci_options() {
            out.push_str(&option);
            out.push('\n');
        }
        out.push_str("uciok\n");
        out
    }

    fn handle_ucinewgame(&mut self) -> String {
        self.mcts.reset(Position::startpos());
        self.time_manager.reset();
        "info string new game\n".to_string()
    }

    fn handle_position(&mut self, parts: &[&str]) -> Result<String> {
        let (start, rest) = match parts.first() {
            Some(&"startpos") => (Position::startpos(), &parts[1..]),
            Some(&"fen") => {
                let end = parts.iter().position(|&p| p == "moves").unwrap_or(parts.len());
                (Position::from_fen(&parts[1..end].join(" "))?, &parts[end..])
            }
            _ => {
                return Err(EngineError::InvalidFen(
                    "expected 'startpos' or 'fen <fen>'".to_string(),
                ))
            }
        };
        let moves = match rest.split_first() {
            Some((&"moves", moves)) => moves,
            _ => &[],
        };

        // Replay everything before touching the tree so a bad move leaves it
        // as it was.
        let mut line: Vec<(Position, ChessMove)> = Vec::with_capacity(moves.len());
        let mut position = start;
        for token in moves {
            let mv = position.parse_move(token)?;
            let next = position.apply_move(mv)?;
            line.push((position, mv));
            position = next;
        }

        let mut advanced = 0;
        for (before, mv) in line {
            if &before == self.mcts.root_position() {
                self.mcts.advance_root(mv)?;
                advanced += 1;
            }
        }

        if self.mcts.root_position() == &position {
            let nodes = self.mcts.tree().len();
            Ok(format!(
                "info string reusing tree: advanced {} moves, {} nodes kept\n",
                advanced, nodes
            ))
        } else {
            self.mcts.reset(position);
            Ok("info string new tree\n".to_string())
        }
    }

    fn handle_go(&mut self, parts: &[&str]) -> String {
        let side = self.mcts.root_position().side_to_move();
        let duration = match TimeControl::parse(parts).and_then(|tc| self.time_manager.compute_duration(side, &tc)) {
            Ok(duration) => duration,
            Err(e) => return report_error(&e),
        };

        let mut out = format!("info string search for {} seconds\n", duration);
        match self.mcts.search(duration) {
            Ok(report) => {
                let pv: Vec<String> = self.mcts.principal_variation().iter().map(|mv| mv.to_string()).collect();
                out.push_str(&format!("info string search iterations: {}\n", report.iterations));
                out.push_str(&format!(
                    "info nodes {} time {} pv {}\n",
                    self.mcts.tree().len(),
                    report.elapsed.as_millis(),
                    pv.join(" ")
                ));
            }
            Err(e) => out.push_str(&report_error(&e)),
        }

        match self.mcts.get_move() {
            Ok(mv) => out.push_str(&format!("bestmove {}\n", mv)),
            Err(e) => {
                out.push_str(&report_error(&e));
                out.push_str("bestmove 0000\n");
            }
        }
        out
    }

    fn handle_setoption(&mut self, parts: &[&str]) -> Result<String> {
        let (name, value) = parse_setoption(parts)?;

        // Work on a copy so a rejected option changes nothing.
        let mut candidate = self.config.clone();
        match candidate.set_option(&name, &value)? {
            OptionChange::Oracles => {
                let policy = build_policy(&candidate)?;
                let evaluator = build_value(&candidate)?;
                self.mcts.set_oracles(policy, evaluator);
                let root = self.mcts.root_position().clone();
                self.mcts.reset(root);
            }
            OptionChange::Confidence => self.mcts.set_confidence(candidate.confidence),
        }
        self.config = candidate;

        Ok(format!("info string {} set to {}\n", name, value))
    }
}

/// Splits `name <Name...> value <Value...>`. Both parts may contain spaces.
fn parse_setoption(parts: &[&str]) -> Result<(String, String)> {
    if parts.first() != Some(&"name") {
        return Err(EngineError::InvalidOption("expected 'setoption name <name> value <value>'".to_string()));
    }

    let rest = &parts[1..];
    let split = rest.iter().position(|&p| p == "value").unwrap_or(rest.len());
    let name = rest[..split].join(" ");
    let value = rest.get(split + 1..).map(|v| v.join(" ")).unwrap_or_default();
    if name.is_empty() {
        return Err(EngineError::InvalidOption("missing option name".to_string()));
    }
    Ok((name, value))
}

fn report_error(e: &EngineError) -> String {
    warn!("{}", e);
    format!("info string error: {}\n", e)
}
