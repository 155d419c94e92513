//! Episodic training arenas and a parallel pool of them

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::arena::Arena;
use super::config::SimulationConfig;
use crate::agent::{AgentConfig, FirefighterAgent, PolicyProvider};
use crate::scene::Scene;

/// Statistics of one finished episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: u32,
    pub steps: u32,
    pub reward: f32,
    pub fires_extinguished: f32,
}

/// A single training agent in its own arena.
///
/// The agent runs with `training_mode` on, so each episode start relights
/// the whole field. An episode ends after `max_steps` steps.
pub struct TrainingArena {
    arena: Arena,
    episode: u32,
    episode_steps: u32,
}

impl TrainingArena {
    pub fn new(
        scene: &Scene,
        config: SimulationConfig,
        agent: AgentConfig,
        policy: Box<dyn PolicyProvider>,
    ) -> Self {
        let mut arena = Arena::new(scene, config);
        let agent = AgentConfig {
            training_mode: true,
            ..agent
        };
        arena.add_agent("Trainee", agent, policy);
        arena.begin_all();

        Self {
            arena,
            episode: 0,
            episode_steps: 0,
        }
    }

    /// Run one step; returns the summary when this step ended the episode
    pub fn step(&mut self) -> Option<EpisodeSummary> {
        self.arena.step();
        self.episode_steps += 1;

        let max_steps = self.arena.config().max_steps;
        if max_steps > 0 && self.episode_steps >= max_steps {
            Some(self.end_episode())
        } else {
            None
        }
    }

    /// Run `steps` steps and collect every episode finished along the way
    pub fn run(&mut self, steps: u32) -> Vec<EpisodeSummary> {
        (0..steps).filter_map(|_| self.step()).collect()
    }

    /// Statistics of the episode in progress
    pub fn current(&self) -> EpisodeSummary {
        let agent = self.trainee();
        EpisodeSummary {
            episode: self.episode,
            steps: self.episode_steps,
            reward: agent.map_or(0.0, FirefighterAgent::cumulative_reward),
            fires_extinguished: agent.map_or(0.0, FirefighterAgent::fires_extinguished),
        }
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn trainee(&self) -> Option<&FirefighterAgent> {
        self.arena.agent(0)
    }

    fn end_episode(&mut self) -> EpisodeSummary {
        let summary = self.current();
        debug!(
            episode = summary.episode,
            steps = summary.steps,
            reward = summary.reward,
            extinguished = summary.fires_extinguished,
            "Episode finished"
        );

        self.episode += 1;
        self.episode_steps = 0;
        self.arena.begin_all();
        summary
    }
}

/// Many independent training arenas stepped in parallel
pub struct TrainingPool {
    arenas: Vec<TrainingArena>,
}

impl TrainingPool {
    pub fn new(arenas: Vec<TrainingArena>) -> Self {
        Self { arenas }
    }

    /// `count` arenas sharing one layout. Arena `i` is seeded with
    /// `config.seed + i`.
    pub fn from_scene(
        scene: &Scene,
        config: SimulationConfig,
        agent: AgentConfig,
        count: usize,
        mut make_policy: impl FnMut(usize) -> Box<dyn PolicyProvider>,
    ) -> Self {
        let arenas = (0..count)
            .map(|i| {
                let seeded = config.with_seed(config.seed.wrapping_add(i as u64));
                TrainingArena::new(scene, seeded, agent, make_policy(i))
            })
            .collect();
        Self::new(arenas)
    }

    /// Step every arena `steps` times in parallel.
    ///
    /// Returns the finished episodes per arena, in arena order.
    pub fn run(&mut self, steps: u32) -> Vec<Vec<EpisodeSummary>> {
        let finished: Vec<Vec<EpisodeSummary>> =
            self.arenas.par_iter_mut().map(|arena| arena.run(steps)).collect();

        let episodes: usize = finished.iter().map(Vec::len).sum();
        info!(
            arenas = self.arenas.len(),
            steps,
            episodes,
            mean_reward = ?mean_reward(&finished),
            "Training batch finished"
        );
        finished
    }

    pub fn arenas(&self) -> &[TrainingArena] {
        &self.arenas
    }

    pub fn len(&self) -> usize {
        self.arenas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arenas.is_empty()
    }
}

/// Mean reward over all summaries, `None` when there are none
pub fn mean_reward(summaries: &[Vec<EpisodeSummary>]) -> Option<f32> {
    let (total, count) = summaries
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(total, count), s| (total + s.reward, count + 1));
    (count > 0).then(|| total / count as f32)
}
