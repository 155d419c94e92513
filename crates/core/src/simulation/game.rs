//! Headless two-agent match: a player against an opponent on one field

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::arena::{Arena, StepReport};
use super::config::SimulationConfig;
use crate::agent::{AgentConfig, FirefighterAgent, PolicyProvider};
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    MainMenu,
    Preparing,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Player,
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Extinguished total that ends the match early
    pub winning_fires: f32,
    /// Match length once play starts (s)
    pub game_timer: f32,
    /// Countdown between the start button and play (s)
    pub countdown: f32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            winning_fires: 10.0,
            game_timer: 70.0,
            countdown: 4.0,
        }
    }
}

const PLAYER: usize = 0;
const OPPONENT: usize = 1;

/// Match controller.
///
/// Time is counted in fixed steps, so a match replays identically for the
/// same seed and policies.
pub struct FireMatch {
    arena: Arena,
    settings: MatchSettings,
    state: GameState,
    winner: Option<Winner>,
    ticks: u64,
    phase_started: u64,
}

impl FireMatch {
    /// Set up both agents and enter the main menu.
    ///
    /// Both agents play with `training_mode` off regardless of `agent`.
    pub fn new(
        scene: &Scene,
        config: SimulationConfig,
        settings: MatchSettings,
        agent: AgentConfig,
        player: Box<dyn PolicyProvider>,
        opponent: Box<dyn PolicyProvider>,
    ) -> Self {
        let agent = AgentConfig {
            training_mode: false,
            ..agent
        };
        let mut arena = Arena::new(scene, config);
        arena.add_agent("Player", agent, player);
        arena.add_agent("Opponent", agent, opponent);

        let mut game = Self {
            arena,
            settings,
            state: GameState::MainMenu,
            winner: None,
            ticks: 0,
            phase_started: 0,
        };
        game.main_menu();
        game
    }

    /// Relight the field, respawn both agents and hold them frozen
    pub fn main_menu(&mut self) {
        self.state = GameState::MainMenu;
        self.winner = None;
        self.arena.reset_field();
        self.arena.begin_all();
        self.arena.freeze_all();
        info!("Main menu");
    }

    pub fn button_clicked(&mut self) {
        match self.state {
            GameState::GameOver => self.main_menu(),
            GameState::MainMenu => {
                self.state = GameState::Preparing;
                self.phase_started = self.ticks;
                info!(countdown = self.settings.countdown, "Starting match");
            }
            state => warn!(?state, "Button clicked in unexpected state"),
        }
    }

    /// Advance the match by one fixed step
    pub fn tick(&mut self) -> StepReport {
        let report = self.arena.step();
        self.ticks += 1;

        match self.state {
            GameState::Preparing if self.phase_elapsed() >= self.settings.countdown => {
                self.state = GameState::Playing;
                self.phase_started = self.ticks;
                self.arena.unfreeze_all();
                info!(timer = self.settings.game_timer, "Go!");
            }
            GameState::Playing => {
                let (player, opponent) = self.scores();
                if self.time_remaining() <= 0.0
                    || player >= self.settings.winning_fires
                    || opponent >= self.settings.winning_fires
                {
                    self.end_game();
                }
            }
            _ => {}
        }
        report
    }

    /// Freeze both agents and decide the winner
    pub fn end_game(&mut self) {
        self.state = GameState::GameOver;
        self.arena.freeze_all();

        let (player, opponent) = self.scores();
        let winner = decide_winner(player, opponent);
        self.winner = Some(winner);
        info!(player, opponent, ?winner, "Game over");
    }

    /// Seconds left while playing, zero in every other state
    pub fn time_remaining(&self) -> f32 {
        if self.state == GameState::Playing {
            (self.settings.game_timer - self.phase_elapsed()).max(0.0)
        } else {
            0.0
        }
    }

    /// Extinguished totals as fractions of `winning_fires`
    pub fn progress(&self) -> (f32, f32) {
        let (player, opponent) = self.scores();
        let goal = self.settings.winning_fires.max(f32::EPSILON);
        (player / goal, opponent / goal)
    }

    /// Extinguished totals of player and opponent
    pub fn scores(&self) -> (f32, f32) {
        let score = |index| {
            self.arena
                .agent(index)
                .map_or(0.0, FirefighterAgent::fires_extinguished)
        };
        (score(PLAYER), score(OPPONENT))
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    fn phase_elapsed(&self) -> f32 {
        (self.ticks - self.phase_started) as f32 * self.arena.config().fixed_dt
    }
}

/// Ties go to the opponent
fn decide_winner(player: f32, opponent: f32) -> Winner {
    if player <= opponent {
        Winner::Opponent
    } else {
        Winner::Player
    }
}
