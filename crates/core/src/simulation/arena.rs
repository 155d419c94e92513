//! One fire field, one physics world, and the agents acting in it

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::config::SimulationConfig;
use crate::agent::{
    Action, AgentConfig, CollisionEvents, ContactContext, FirefighterAgent, Observation,
    PolicyProvider, SpawnOutcome,
};
use crate::core_types::Pose;
use crate::fire::FireField;
use crate::physics::ArenaWorld;
use crate::scene::Scene;

/// An agent together with the policy driving it
pub struct AgentSlot {
    pub agent: FirefighterAgent,
    pub policy: Box<dyn PolicyProvider>,
    action: Action,
    observation: Observation,
}

impl AgentSlot {
    /// Action repeated on every step until the next decision
    pub fn action(&self) -> Action {
        self.action
    }

    /// Observation of the last decision step
    pub fn observation(&self) -> &Observation {
        &self.observation
    }
}

/// Outcome of one fixed step
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Index of the step just run
    pub step: u64,
    /// Reward each agent earned during the step, in slot order
    pub rewards: Vec<f32>,
    /// Contact events dispatched
    pub contacts: usize,
    /// Fires still burning after the step
    pub burning: usize,
}

/// Fixed-step driver for a single fire area.
///
/// Each [`step`](Arena::step) runs, in order: policy decisions (every
/// `decision_period` steps), actions, fire region sync, physics, contact
/// dispatch, and per-agent upkeep.
pub struct Arena {
    config: SimulationConfig,
    field: FireField,
    world: ArenaWorld,
    slots: Vec<AgentSlot>,
    rng: StdRng,
    step_count: u64,
}

impl Arena {
    pub fn new(scene: &Scene, config: SimulationConfig) -> Self {
        let field = FireField::discover(scene.root());
        if !field.discovery_errors().is_empty() {
            warn!(
                errors = field.discovery_errors().len(),
                "Fire discovery reported layout errors"
            );
        }
        let world = scene.build_world(&field);
        info!(
            fires = field.len(),
            colliders = world.colliders().len(),
            seed = config.seed,
            "Created arena"
        );

        Self {
            config,
            field,
            world,
            slots: Vec::new(),
            rng: StdRng::seed_from_u64(config.seed),
            step_count: 0,
        }
    }

    /// Add an agent and return its slot index.
    ///
    /// The body starts at the origin; call
    /// [`begin_episode`](Arena::begin_episode) to place it.
    pub fn add_agent(
        &mut self,
        name: impl Into<String>,
        config: AgentConfig,
        policy: Box<dyn PolicyProvider>,
    ) -> usize {
        let body = self.world.spawn_body(Pose::identity(), config.body);
        let agent = FirefighterAgent::new(name, config, body);
        debug!(agent = %agent.name(), body = body.0, "Added agent");
        self.slots.push(AgentSlot {
            agent,
            policy,
            action: Action::default(),
            observation: Observation::empty(),
        });
        self.slots.len() - 1
    }

    /// Begin a new episode for one agent
    pub fn begin_episode(&mut self, index: usize) -> Option<SpawnOutcome> {
        let slot = self.slots.get_mut(index)?;
        slot.action = Action::default();
        let outcome = slot
            .agent
            .on_episode_begin(&mut self.field, &mut self.world, &mut self.rng);
        self.world.sync_fire_regions(&self.field);
        Some(outcome)
    }

    pub fn begin_all(&mut self) {
        for index in 0..self.slots.len() {
            self.begin_episode(index);
        }
    }

    /// Relight every fire
    pub fn reset_field(&mut self) {
        self.field.reset_all();
        self.world.sync_fire_regions(&self.field);
    }

    pub fn freeze_all(&mut self) {
        for slot in &mut self.slots {
            slot.agent.freeze(&mut self.world);
        }
    }

    pub fn unfreeze_all(&mut self) {
        for slot in &mut self.slots {
            slot.agent.unfreeze(&mut self.world);
        }
    }

    /// Run one fixed step
    pub fn step(&mut self) -> StepReport {
        let dt = self.config.fixed_dt;

        if self.config.is_decision_step(self.step_count) {
            for slot in &mut self.slots {
                let observation = slot.agent.collect_observations(&self.field, &self.world);
                slot.policy.observe(&observation);
                slot.action = slot.policy.act();
                slot.observation = observation;
            }
        }

        for slot in &mut self.slots {
            slot.agent.on_action_received(slot.action, &mut self.world, dt);
        }

        self.world.sync_fire_regions(&self.field);
        let events = self.world.step(dt);

        for event in &events {
            let Some(slot) = self.slots.iter_mut().find(|s| s.agent.body() == event.body) else {
                continue;
            };
            let mut ctx = ContactContext {
                field: &mut self.field,
                world: &self.world,
            };
            slot.agent.dispatch(event, &mut ctx);
        }

        for slot in &mut self.slots {
            slot.agent.fixed_update(&self.field, &self.world);
        }

        let report = StepReport {
            step: self.step_count,
            rewards: self
                .slots
                .iter_mut()
                .map(|s| s.agent.take_step_reward())
                .collect(),
            contacts: events.len(),
            burning: self.field.burning_count(),
        };
        self.step_count += 1;
        report
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn field(&self) -> &FireField {
        &self.field
    }

    pub fn world(&self) -> &ArenaWorld {
        &self.world
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn slots(&self) -> &[AgentSlot] {
        &self.slots
    }

    pub fn agent(&self, index: usize) -> Option<&FirefighterAgent> {
        self.slots.get(index).map(|s| &s.agent)
    }

    pub fn agents(&self) -> impl Iterator<Item = &FirefighterAgent> {
        self.slots.iter().map(|s| &s.agent)
    }
}
