//! Tug of Rope headless runner
//!
//! Drives the simulation the way a render loop would (frame deltas fed
//! through a fixed-step accumulator) with a scripted human on the blue side,
//! then prints a JSON summary of the rounds played.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use tug_of_rope::consts::{MAX_SUBSTEPS, SIM_DT_MS};
use tug_of_rope::input::InputState;
use tug_of_rope::sim::{MatchRecord, MatchState, TickInput, Winner};
use tug_of_rope::{DifficultyPreset, Settings};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Opponent RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// easy | normal | hard
    #[arg(long)]
    difficulty: Option<String>,
    /// Settings JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Human script: hold | idle | pulse:<on_ms>:<off_ms>
    #[arg(long, default_value = "pulse:400:200")]
    human: String,
    /// Rounds to play
    #[arg(long, default_value_t = 3)]
    rounds: u32,
    /// Give up on a round after this many ticks
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,
    /// Host frame time in milliseconds
    #[arg(long, default_value_t = 1000.0 / 60.0, value_parser = parse_frame_ms)]
    frame_ms: f32,
    /// Ease the rope ends toward the characters' grips
    #[arg(long)]
    grips: bool,
    /// Also print the final rope snapshot
    #[arg(long)]
    snapshot: bool,
}

/// Frame time must advance the accumulator or no tick would ever run
fn parse_frame_ms(s: &str) -> Result<f32, String> {
    let ms: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if ms.is_finite() && ms > 0.0 {
        Ok(ms)
    } else {
        Err(format!("frame time must be a positive number of ms, got {s}"))
    }
}

/// Scripted stand-in for a human holding the pull key
#[derive(Debug, Clone, Copy, PartialEq)]
enum HumanScript {
    Hold,
    Idle,
    Pulse { on_ms: f32, off_ms: f32 },
}

impl HumanScript {
    fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(':');
        match parts.next()? {
            "hold" => Some(HumanScript::Hold),
            "idle" => Some(HumanScript::Idle),
            "pulse" => {
                let on_ms = parts.next()?.parse().ok()?;
                let off_ms = parts.next()?.parse().ok()?;
                Some(HumanScript::Pulse { on_ms, off_ms })
            }
            _ => None,
        }
    }

    /// Whether the pull key is held at `t_ms` into the round
    fn holding(&self, t_ms: f32) -> bool {
        match *self {
            HumanScript::Hold => true,
            HumanScript::Idle => false,
            HumanScript::Pulse { on_ms, off_ms } => {
                let period = on_ms + off_ms;
                period > 0.0 && t_ms % period < on_ms
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct RoundLine {
    round: u32,
    winner: Option<Winner>,
    ticks: u64,
    #[serde(rename = "durationMs")]
    duration_ms: f32,
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    difficulty: f32,
    human: String,
    rounds: Vec<RoundLine>,
    record: MatchRecord,
    score: String,
}

/// Host-side loop state, mirroring what a browser frame callback would keep
struct Runner {
    state: MatchState,
    input: InputState,
    script: HumanScript,
    accumulator: f32,
    round_ms: f32,
    grips: bool,
}

impl Runner {
    /// Feed one host frame; returns a winner if a round was decided.
    /// A pending restart key is handled before any ticks run.
    fn frame(&mut self, frame_ms: f32) -> Option<Winner> {
        if self.input.take_restart() {
            self.restart();
        }
        let frame_ms = frame_ms.min(100.0);
        self.accumulator += frame_ms;

        let mut decided = None;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            if self.script.holding(self.round_ms) {
                self.input.key_down("w");
            } else {
                self.input.key_up("w");
            }

            let input = TickInput {
                human_pulling: self.input.human_pulling(),
                grips: self.grips.then(|| self.state.default_grips()),
            };
            if let Some(winner) = self.state.tick(SIM_DT_MS, &input) {
                decided = Some(winner);
            }
            self.accumulator -= SIM_DT_MS;
            self.round_ms += SIM_DT_MS;
            substeps += 1;
        }
        decided
    }

    /// Tap the restart key and let an empty frame pick it up
    fn press_restart(&mut self) {
        self.input.key_down("r");
        self.input.key_up("r");
        self.frame(0.0);
    }

    fn restart(&mut self) {
        self.state.reset();
        self.input.clear();
        self.accumulator = 0.0;
        self.round_ms = 0.0;
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(name) = &cli.difficulty {
        let preset = DifficultyPreset::from_str(name)
            .ok_or_else(|| format!("unknown difficulty: {name}"))?;
        settings.apply_difficulty(preset);
    }
    let script =
        HumanScript::parse(&cli.human).ok_or_else(|| format!("bad human script: {}", cli.human))?;

    let difficulty = settings.opponent.difficulty;
    let mut runner = Runner {
        state: MatchState::new(settings, cli.seed)?,
        input: InputState::new(),
        script,
        accumulator: 0.0,
        round_ms: 0.0,
        grips: cli.grips,
    };

    let mut rounds = Vec::with_capacity(cli.rounds as usize);
    for round in 1..=cli.rounds {
        let mut winner = None;
        while winner.is_none() && runner.state.round_ticks() < cli.max_ticks {
            winner = runner.frame(cli.frame_ms);
        }
        if winner.is_none() {
            log::warn!("Round {} undecided after {} ticks", round, cli.max_ticks);
        }
        rounds.push(RoundLine {
            round,
            winner,
            ticks: runner.state.round_ticks(),
            duration_ms: runner.round_ms,
        });
        if round < cli.rounds {
            runner.press_restart();
        }
    }

    let record = runner.state.record();
    let summary = Summary {
        seed: cli.seed,
        difficulty,
        human: cli.human.clone(),
        rounds,
        record,
        score: record.to_string(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    if cli.snapshot {
        println!("{}", serde_json::to_string(&runner.state.snapshot())?);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Tug of Rope (headless) starting...");

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scripts() {
        assert_eq!(HumanScript::parse("hold"), Some(HumanScript::Hold));
        assert_eq!(HumanScript::parse("idle"), Some(HumanScript::Idle));
        assert_eq!(
            HumanScript::parse("pulse:300:100"),
            Some(HumanScript::Pulse {
                on_ms: 300.0,
                off_ms: 100.0
            })
        );
        assert_eq!(HumanScript::parse("pulse:300"), None);
        assert_eq!(HumanScript::parse("yank"), None);
    }

    #[test]
    fn test_pulse_timing() {
        let script = HumanScript::Pulse {
            on_ms: 300.0,
            off_ms: 100.0,
        };
        assert!(script.holding(0.0));
        assert!(script.holding(299.0));
        assert!(!script.holding(350.0));
        assert!(script.holding(410.0));
    }

    fn hold_runner() -> Runner {
        let mut settings = Settings::default();
        settings.opponent.enabled = false;
        Runner {
            state: MatchState::new(settings, 1).unwrap(),
            input: InputState::new(),
            script: HumanScript::Hold,
            accumulator: 0.0,
            round_ms: 0.0,
            grips: false,
        }
    }

    #[test]
    fn test_frame_ms_must_be_positive() {
        assert!(Cli::try_parse_from(["tug-of-rope", "--frame-ms", "0"]).is_err());
        assert!(Cli::try_parse_from(["tug-of-rope", "--frame-ms", "-5"]).is_err());
        assert!(Cli::try_parse_from(["tug-of-rope", "--frame-ms", "inf"]).is_err());
        assert!(Cli::try_parse_from(["tug-of-rope", "--frame-ms", "NaN"]).is_err());
        let cli = Cli::try_parse_from(["tug-of-rope", "--frame-ms", "8"]).unwrap();
        assert_eq!(cli.frame_ms, 8.0);
        let cli = Cli::try_parse_from(["tug-of-rope"]).unwrap();
        assert!(cli.frame_ms > 0.0);
    }

    #[test]
    fn test_restart_key_starts_next_round() {
        let mut runner = hold_runner();
        while runner.frame(1000.0 / 60.0).is_none() {}
        assert!(runner.state.game_over());

        runner.press_restart();
        assert!(!runner.state.game_over());
        assert_eq!(runner.state.round(), 2);
        assert_eq!(runner.state.round_ticks(), 0);
        assert_eq!(runner.state.record().blue_score, 1);
        assert_eq!(runner.round_ms, 0.0);
        assert!(!runner.input.take_restart());
    }

    #[test]
    fn test_runner_hold_beats_disabled_opponent() {
        let mut runner = hold_runner();
        let mut winner = None;
        for _ in 0..500 {
            if let Some(w) = runner.frame(1000.0 / 60.0) {
                winner = Some(w);
                break;
            }
        }
        assert_eq!(winner, Some(Winner::Blue));
        assert_eq!(runner.state.record().blue_score, 1);
    }
}
