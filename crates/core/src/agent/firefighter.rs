//! The firefighter agent

use rand::Rng;
use tracing::{debug, trace};

use super::config::AgentConfig;
use super::observation::{Action, Observation, OBSERVATION_SIZE};
use super::spawn::{SpawnOutcome, SpawnPlacer};
use super::targeting::TargetSelector;
use super::{CollisionEvents, ContactContext};
use crate::core_types::vec3::{self, normalize_or_zero};
use crate::core_types::{Pose, Vec3};
use crate::fire::{FireField, FireIndex, AREA_DIAMETER};
use crate::physics::{BodyHandle, Contact, PhysicsWorld, SurfaceTag};

/// Base reward for a hit on a burning fire (training only)
pub const HIT_REWARD: f32 = 0.02;

/// Extra hit reward at perfect alignment, scaled by how squarely the agent
/// faces the fire's front
pub const ALIGNMENT_BONUS: f32 = 0.02;

/// Touching a fire region without the tool tip near it
pub const GRAZE_PENALTY: f32 = -0.05;

/// Running into the arena boundary (training only)
pub const BOUNDARY_PENALTY: f32 = -0.5;

/// Max change of the smoothed yaw input per second
pub const YAW_SMOOTHING_RATE: f32 = 2.0;

/// An agent that moves around the arena and puts fires out with a tool.
///
/// The agent owns one physics body. Everything it senses or does goes
/// through the [`PhysicsWorld`] and [`FireField`] handed to each call.
#[derive(Debug, Clone)]
pub struct FirefighterAgent {
    name: String,
    config: AgentConfig,
    body: BodyHandle,
    placer: SpawnPlacer,
    target: TargetSelector,
    fires_extinguished: f32,
    frozen: bool,
    smoothed_yaw: f32,
    step_reward: f32,
    cumulative_reward: f32,
}

impl FirefighterAgent {
    pub fn new(name: impl Into<String>, config: AgentConfig, body: BodyHandle) -> Self {
        Self {
            name: name.into(),
            placer: SpawnPlacer::new(config.spawn),
            config,
            body,
            target: TargetSelector::new(),
            fires_extinguished: 0.0,
            frozen: false,
            smoothed_yaw: 0.0,
            step_reward: 0.0,
            cumulative_reward: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn is_training(&self) -> bool {
        self.config.training_mode
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Total fire health removed by this agent since the episode began
    pub fn fires_extinguished(&self) -> f32 {
        self.fires_extinguished
    }

    /// The fire currently being approached
    pub fn nearest_fire(&self) -> Option<FireIndex> {
        self.target.tracked()
    }

    pub fn smoothed_yaw(&self) -> f32 {
        self.smoothed_yaw
    }

    pub fn cumulative_reward(&self) -> f32 {
        self.cumulative_reward
    }

    pub fn add_reward(&mut self, reward: f32) {
        self.step_reward += reward;
        self.cumulative_reward += reward;
    }

    /// Reward accrued since the last call
    pub fn take_step_reward(&mut self) -> f32 {
        std::mem::take(&mut self.step_reward)
    }

    /// World position of the tool tip
    pub fn tool_tip(&self, world: &dyn PhysicsWorld) -> Vec3 {
        let pose = world.body_pose(self.body);
        pose.translation.vector + pose.rotation * self.config.tool_tip_offset
    }

    /// Facing direction of the agent (and of the tool it holds)
    pub fn forward(&self, world: &dyn PhysicsWorld) -> Vec3 {
        world.body_pose(self.body).rotation * vec3::forward()
    }

    /// Start a new episode.
    ///
    /// Training agents reset every fire in their field first. In play mode
    /// the match controller owns the field reset.
    pub fn on_episode_begin<R: Rng>(
        &mut self,
        field: &mut FireField,
        world: &mut dyn PhysicsWorld,
        rng: &mut R,
    ) -> SpawnOutcome {
        world.reset_velocity(self.body);
        self.fires_extinguished = 0.0;
        self.step_reward = 0.0;
        self.cumulative_reward = 0.0;

        if self.config.training_mode {
            field.reset_all();
        }

        let outcome = self
            .placer
            .place(self.config.spawn_mode, field, &*world, Some(self.body), rng);
        world.set_body_pose(self.body, outcome.pose);

        let target = self.update_nearest_fire(field, &*world);
        debug!(
            agent = %self.name,
            attempts = outcome.attempts,
            accepted = outcome.accepted,
            target = ?target,
            "Episode begin"
        );
        outcome
    }

    /// Apply one action.
    ///
    /// Movement is a world-space force. Yaw input is smoothed before it
    /// turns the body, and the body is kept upright.
    pub fn on_action_received(&mut self, action: Action, world: &mut dyn PhysicsWorld, fixed_dt: f32) {
        if self.frozen {
            return;
        }

        let movement = Vec3::new(action.lateral, 0.0, action.forward) * self.config.move_force;
        world.add_force(self.body, movement);

        self.smoothed_yaw = vec3::move_towards(
            self.smoothed_yaw,
            action.yaw,
            YAW_SMOOTHING_RATE * fixed_dt,
        );

        let pose = world.body_pose(self.body);
        let yaw = vec3::yaw_degrees(&pose.rotation) + self.smoothed_yaw * fixed_dt * self.config.yaw_speed;
        world.set_body_pose(
            self.body,
            Pose::from_parts(pose.translation, vec3::yaw_rotation(yaw)),
        );
    }

    /// Build the observation for the current target.
    ///
    /// With no burning target (or one without a placement) the all-zero
    /// observation is returned.
    pub fn collect_observations(&self, field: &FireField, world: &dyn PhysicsWorld) -> Observation {
        let Some(fire) = self.target.tracked().and_then(|index| field.get(index)) else {
            return Observation::empty();
        };
        let (Ok(center), Ok(up)) = (fire.center_position(), fire.up_vector()) else {
            return Observation::empty();
        };

        let pose = world.body_pose(self.body);
        let tip = pose.translation.vector + pose.rotation * self.config.tool_tip_offset;
        let to_target = center - tip;
        let direction = normalize_or_zero(&to_target);
        let facing = -normalize_or_zero(&up);
        let tool_forward = pose.rotation * vec3::forward();
        let rotation = pose.rotation.coords;

        let mut values = [0.0; OBSERVATION_SIZE];
        values[..4].copy_from_slice(&[rotation.x, rotation.y, rotation.z, rotation.w]);
        values[4..7].copy_from_slice(direction.as_slice());
        values[7] = direction.dot(&facing);
        values[8] = tool_forward.dot(&facing);
        values[9] = to_target.norm() / AREA_DIAMETER;
        Observation(values)
    }

    /// Stop the body and ignore actions until [`unfreeze`](Self::unfreeze)
    pub fn freeze(&mut self, world: &mut dyn PhysicsWorld) {
        self.frozen = true;
        world.reset_velocity(self.body);
        world.sleep(self.body);
    }

    pub fn unfreeze(&mut self, world: &mut dyn PhysicsWorld) {
        self.frozen = false;
        world.wake_up(self.body);
    }

    /// Re-select the nearest burning fire from the tool tip
    pub fn update_nearest_fire(&mut self, field: &FireField, world: &dyn PhysicsWorld) -> Option<FireIndex> {
        let tip = self.tool_tip(world);
        self.target.select(field, tip)
    }

    /// Per-physics-step upkeep.
    ///
    /// Another agent may have put the tracked fire out, so a stale target
    /// is replaced here.
    pub fn fixed_update(&mut self, field: &FireField, world: &dyn PhysicsWorld) {
        let tip = self.tool_tip(world);
        if self.target.refresh_if_stale(field, tip) {
            trace!(agent = %self.name, target = ?self.target.tracked(), "Stale target replaced");
        }
    }

    /// Line from the tool tip to the target center, for debug drawing
    pub fn target_line(&self, field: &FireField, world: &dyn PhysicsWorld) -> Option<(Vec3, Vec3)> {
        let fire = field.get(self.target.tracked()?)?;
        let center = fire.center_position().ok()?;
        Some((self.tool_tip(world), center))
    }

    fn on_fire_region_contact(&mut self, other: &Contact, ctx: &mut ContactContext<'_>) {
        if other.tag != SurfaceTag::FireRegion {
            return;
        }

        let tip = self.tool_tip(ctx.world);
        let Some(closest) = ctx.world.closest_point(other.collider, tip) else {
            return;
        };

        if (closest - tip).norm() >= self.config.tool_tip_radius {
            trace!(agent = %self.name, region = %other.collider, "Graze");
            self.add_reward(GRAZE_PENALTY);
            return;
        }

        let Ok(index) = ctx.field.lookup(other.collider) else {
            return;
        };
        let forward = self.forward(ctx.world);
        let Some(fire) = ctx.field.get_mut(index) else {
            return;
        };
        // Regions of an extinguished fire are inactive
        if !fire.is_burning() {
            return;
        }

        let removed = fire.extinguish(self.config.extinguish_per_hit);
        self.fires_extinguished += removed;
        let still_burning = fire.is_burning();

        if self.config.training_mode {
            let alignment = fire
                .up_vector()
                .map(|up| forward.dot(&-normalize_or_zero(&up)).clamp(0.0, 1.0))
                .unwrap_or(0.0);
            self.add_reward(HIT_REWARD + ALIGNMENT_BONUS * alignment);
        }

        if !still_burning {
            debug!(agent = %self.name, fire = ?index, "Fire extinguished");
            self.update_nearest_fire(ctx.field, ctx.world);
        }
    }
}

impl CollisionEvents for FirefighterAgent {
    fn on_trigger_enter(&mut self, other: &Contact, ctx: &mut ContactContext<'_>) {
        self.on_fire_region_contact(other, ctx);
    }

    fn on_trigger_stay(&mut self, other: &Contact, ctx: &mut ContactContext<'_>) {
        self.on_fire_region_contact(other, ctx);
    }

    fn on_collision_enter(&mut self, other: &Contact, _ctx: &mut ContactContext<'_>) {
        if self.config.training_mode && other.tag == SurfaceTag::Boundary {
            debug!(agent = %self.name, "Hit boundary");
            self.add_reward(BOUNDARY_PENALTY);
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::fire::{FireRegion, FireUnit};
    use crate::physics::{ArenaWorld, ColliderId, ContactEvent, ContactPhase, Shape};
    use crate::core_types::Quat;

    /// One fire at the origin facing -Z (its front points toward negative z)
    fn single_fire_field() -> FireField {
        let interactive = FireRegion::interactive(
            ColliderId(1),
            Shape::Sphere { radius: 0.35 },
            Pose::translation(0.0, 0.5, 0.3),
        );
        let solid = FireRegion::solid(
            ColliderId(2),
            Shape::Cuboid {
                half_extents: Vec3::new(0.35, 0.5, 0.2),
            },
            Pose::translation(0.0, 0.5, 0.0),
        );
        let mut fire = FireUnit::new("Fire", interactive, solid);
        fire.attach(Pose::from_parts(
            Vec3::new(0.0, 0.0, 0.0).into(),
            vec3::yaw_rotation(180.0),
        ));
        FireField::with_fires(Vec3::zeros(), [fire])
    }

    fn agent_at(world: &mut ArenaWorld, config: AgentConfig, pose: Pose) -> FirefighterAgent {
        let body = world.spawn_body(pose, config.body);
        FirefighterAgent::new("Agent", config, body)
    }

    /// Standing in front of the fire, facing it, tool tip on the region center
    fn facing_fire_pose() -> Pose {
        // region center sits at (0, 0.5, -0.3); tip is 0.7 ahead
        Pose::from_parts(Vec3::new(0.0, 0.5, -1.0).into(), Quat::identity())
    }

    fn region_contact() -> Contact {
        Contact {
            collider: ColliderId(1),
            tag: SurfaceTag::FireRegion,
        }
    }

    #[test]
    fn dead_center_hit_rewards_in_training() {
        let mut field = single_fire_field();
        let mut world = ArenaWorld::new();
        world.add_fire_regions(&field);
        let mut agent = agent_at(&mut world, AgentConfig::training(), facing_fire_pose());
        agent.update_nearest_fire(&field, &world);

        let mut ctx = ContactContext {
            field: &mut field,
            world: &world,
        };
        agent.on_trigger_stay(&region_contact(), &mut ctx);

        assert_relative_eq!(field.fires()[0].health(), 0.99, epsilon = 1e-6);
        assert_relative_eq!(agent.fires_extinguished(), 0.01, epsilon = 1e-6);
        // facing straight into the fire front: full bonus
        assert_relative_eq!(agent.take_step_reward(), HIT_REWARD + ALIGNMENT_BONUS, epsilon = 1e-6);
    }

    #[test]
    fn hit_in_play_mode_gives_no_reward() {
        let mut field = single_fire_field();
        let mut world = ArenaWorld::new();
        world.add_fire_regions(&field);
        let mut agent = agent_at(&mut world, AgentConfig::default(), facing_fire_pose());

        let mut ctx = ContactContext {
            field: &mut field,
            world: &world,
        };
        agent.on_trigger_enter(&region_contact(), &mut ctx);

        assert_relative_eq!(field.fires()[0].health(), 0.99, epsilon = 1e-6);
        assert_eq!(agent.take_step_reward(), 0.0);
    }

    #[test]
    fn sideways_hit_gets_partial_bonus() {
        let mut field = single_fire_field();
        let mut world = ArenaWorld::new();
        world.add_fire_regions(&field);
        // tip on the region center, but the agent faces +X
        let pose = Pose::from_parts(Vec3::new(-0.7, 0.5, -0.3).into(), vec3::yaw_rotation(90.0));
        let mut agent = agent_at(&mut world, AgentConfig::training(), pose);

        let mut ctx = ContactContext {
            field: &mut field,
            world: &world,
        };
        agent.on_trigger_stay(&region_contact(), &mut ctx);

        assert_relative_eq!(agent.take_step_reward(), HIT_REWARD, epsilon = 1e-5);
    }

    #[test]
    fn tool_tip_far_from_region_is_a_graze() {
        let mut field = single_fire_field();
        let mut world = ArenaWorld::new();
        world.add_fire_regions(&field);
        // facing away: tip is 0.7 behind the body, far from the region
        let pose = Pose::from_parts(Vec3::new(0.0, 0.5, -0.9).into(), vec3::yaw_rotation(180.0));
        let mut agent = agent_at(&mut world, AgentConfig::training(), pose);

        let mut ctx = ContactContext {
            field: &mut field,
            world: &world,
        };
        agent.on_trigger_stay(&region_contact(), &mut ctx);

        assert_eq!(field.fires()[0].health(), 1.0);
        assert_relative_eq!(agent.take_step_reward(), GRAZE_PENALTY);
    }

    #[test]
    fn contacts_with_other_tags_are_ignored() {
        let mut field = single_fire_field();
        let mut world = ArenaWorld::new();
        world.add_fire_regions(&field);
        let mut agent = agent_at(&mut world, AgentConfig::training(), facing_fire_pose());

        let floor = Contact {
            collider: ColliderId(1),
            tag: SurfaceTag::Floor,
        };
        let mut ctx = ContactContext {
            field: &mut field,
            world: &world,
        };
        agent.on_trigger_stay(&floor, &mut ctx);
        agent.on_collision_enter(&floor, &mut ctx);

        assert_eq!(field.fires()[0].health(), 1.0);
        assert_eq!(agent.cumulative_reward(), 0.0);
    }

    #[test]
    fn boundary_penalty_only_in_training() {
        let mut field = single_fire_field();
        let mut world = ArenaWorld::new();
        let boundary = Contact {
            collider: ColliderId(9),
            tag: SurfaceTag::Boundary,
        };

        let mut trainee = agent_at(&mut world, AgentConfig::training(), Pose::identity());
        let mut player = agent_at(&mut world, AgentConfig::default(), Pose::identity());
        let mut ctx = ContactContext {
            field: &mut field,
            world: &world,
        };
        trainee.on_collision_enter(&boundary, &mut ctx);
        player.on_collision_enter(&boundary, &mut ctx);

        assert_relative_eq!(trainee.cumulative_reward(), BOUNDARY_PENALTY);
        assert_eq!(player.cumulative_reward(), 0.0);
    }

    #[test]
    fn dispatch_routes_by_phase() {
        let mut field = single_fire_field();
        let mut world = ArenaWorld::new();
        world.add_fire_regions(&field);
        let mut agent = agent_at(&mut world, AgentConfig::training(), facing_fire_pose());

        let event = ContactEvent {
            body: agent.body(),
            contact: region_contact(),
            phase: ContactPhase::TriggerEnter,
        };
        let mut ctx = ContactContext {
            field: &mut field,
            world: &world,
        };
        agent.dispatch(&event, &mut ctx);

        assert!(field.fires()[0].health() < 1.0);
    }

    #[test]
    fn extinguishing_the_target_retargets() {
        let mut field = single_fire_field();
        let mut world = ArenaWorld::new();
        world.add_fire_regions(&field);
        let config = AgentConfig {
            extinguish_per_hit: 1.0,
            ..AgentConfig::training()
        };
        let mut agent = agent_at(&mut world, config, facing_fire_pose());
        agent.update_nearest_fire(&field, &world);
        assert_eq!(agent.nearest_fire(), Some(FireIndex(0)));

        let mut ctx = ContactContext {
            field: &mut field,
            world: &world,
        };
        agent.on_trigger_stay(&region_contact(), &mut ctx);
        assert!(!field.fires()[0].is_burning());
        assert_eq!(agent.nearest_fire(), None);

        // a second contact on the extinguished fire does nothing
        let before = agent.cumulative_reward();
        let mut ctx = ContactContext {
            field: &mut field,
            world: &world,
        };
        agent.on_trigger_stay(&region_contact(), &mut ctx);
        assert_eq!(agent.cumulative_reward(), before);
        assert_relative_eq!(agent.fires_extinguished(), 1.0);
    }

    #[test]
    fn observation_layout_when_facing_target() {
        let field = single_fire_field();
        let mut world = ArenaWorld::new();
        let pose = Pose::from_parts(Vec3::new(0.0, 0.5, -3.0).into(), Quat::identity());
        let mut agent = agent_at(&mut world, AgentConfig::default(), pose);
        agent.update_nearest_fire(&field, &world);

        let obs = agent.collect_observations(&field, &world);
        assert_eq!(obs.rotation(), [0.0, 0.0, 0.0, 1.0]);
        let dir = obs.to_target();
        assert_relative_eq!(dir[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(dir[1], 0.0, epsilon = 1e-6);
        assert_relative_eq!(dir[2], 1.0, epsilon = 1e-6);
        assert_relative_eq!(obs.approach_alignment(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(obs.aim_alignment(), 1.0, epsilon = 1e-5);
        // tip at z = -2.3, region center at z = -0.3
        assert_relative_eq!(obs.normalized_distance(), 2.0 / AREA_DIAMETER, epsilon = 1e-5);
    }

    #[test]
    fn observation_is_zero_without_target() {
        let mut field = single_fire_field();
        let mut world = ArenaWorld::new();
        if let Some(fire) = field.get_mut(FireIndex(0)) {
            fire.extinguish(1.0);
        }
        let mut agent = agent_at(&mut world, AgentConfig::default(), Pose::identity());
        agent.update_nearest_fire(&field, &world);

        let obs = agent.collect_observations(&field, &world);
        assert!(obs.is_empty());
        assert_eq!(obs.as_slice().len(), OBSERVATION_SIZE);
    }

    #[test]
    fn frozen_agent_ignores_actions() {
        let mut world = ArenaWorld::new();
        let mut agent = agent_at(&mut world, AgentConfig::default(), Pose::identity());
        agent.freeze(&mut world);

        agent.on_action_received(Action::new(1.0, 1.0, 1.0), &mut world, 0.02);
        world.step(0.02);

        assert_eq!(agent.smoothed_yaw(), 0.0);
        assert_eq!(world.body_velocity(agent.body()), Vec3::zeros());
        assert_eq!(world.body_pose(agent.body()), Pose::identity());

        agent.unfreeze(&mut world);
        agent.on_action_received(Action::new(0.0, 1.0, 0.0), &mut world, 0.02);
        world.step(0.02);
        assert!(world.body_velocity(agent.body()).z > 0.0);
    }

    #[test]
    fn yaw_input_is_smoothed() {
        let mut world = ArenaWorld::new();
        let mut agent = agent_at(&mut world, AgentConfig::default(), Pose::identity());

        agent.on_action_received(Action::new(0.0, 0.0, 1.0), &mut world, 0.02);
        assert_relative_eq!(agent.smoothed_yaw(), 0.04, epsilon = 1e-6);
        let yaw = vec3::yaw_degrees(&world.body_pose(agent.body()).rotation);
        assert_relative_eq!(yaw, 0.04 * 0.02 * 100.0, epsilon = 1e-4);

        for _ in 0..100 {
            agent.on_action_received(Action::new(0.0, 0.0, 1.0), &mut world, 0.02);
        }
        assert_relative_eq!(agent.smoothed_yaw(), 1.0);
    }

    #[test]
    fn episode_begin_resets_training_field_and_targets() {
        let mut field = single_fire_field();
        if let Some(fire) = field.get_mut(FireIndex(0)) {
            fire.extinguish(0.5);
        }
        let mut world = ArenaWorld::new();
        world.add_fire_regions(&field);
        let mut agent = agent_at(&mut world, AgentConfig::training(), Pose::identity());
        agent.add_reward(1.0);
        let mut rng = StdRng::seed_from_u64(7);

        let outcome = agent.on_episode_begin(&mut field, &mut world, &mut rng);

        assert_eq!(field.fires()[0].health(), 1.0);
        assert_eq!(agent.cumulative_reward(), 0.0);
        assert_eq!(agent.fires_extinguished(), 0.0);
        assert_eq!(agent.nearest_fire(), Some(FireIndex(0)));
        assert_eq!(world.body_pose(agent.body()), outcome.pose);
    }

    #[test]
    fn episode_begin_in_play_leaves_field_alone() {
        let mut field = single_fire_field();
        if let Some(fire) = field.get_mut(FireIndex(0)) {
            fire.extinguish(0.5);
        }
        let mut world = ArenaWorld::new();
        let mut agent = agent_at(&mut world, AgentConfig::default(), Pose::identity());
        let mut rng = StdRng::seed_from_u64(7);

        agent.on_episode_begin(&mut field, &mut world, &mut rng);

        assert_relative_eq!(field.fires()[0].health(), 0.5);
    }

    #[test]
    fn fixed_update_replaces_a_target_put_out_elsewhere() {
        let mut field = single_fire_field();
        let mut world = ArenaWorld::new();
        let mut agent = agent_at(&mut world, AgentConfig::default(), Pose::identity());
        agent.update_nearest_fire(&field, &world);
        assert!(agent.nearest_fire().is_some());

        if let Some(fire) = field.get_mut(FireIndex(0)) {
            fire.extinguish(1.0);
        }
        agent.fixed_update(&field, &world);

        assert_eq!(agent.nearest_fire(), None);
        assert!(agent.target_line(&field, &world).is_none());
    }
}
