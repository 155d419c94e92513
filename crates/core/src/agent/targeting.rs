//! Nearest burning fire tracking

use tracing::debug;

use crate::core_types::Vec3;
use crate::fire::{FireField, FireIndex};

/// Tracks the burning fire closest to a reference point.
///
/// Selection is recomputed explicitly: at episode start, after the tracked
/// fire goes out, and from the fixed-step safety net when another agent put
/// it out in between.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetSelector {
    tracked: Option<FireIndex>,
}

impl TargetSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently tracked fire, if any
    pub fn tracked(&self) -> Option<FireIndex> {
        self.tracked
    }

    /// The burning fire closest to `point`.
    ///
    /// Among equally distant fires the earliest registered one wins. Fires
    /// without a placement are skipped. Returns `None` when nothing burns.
    pub fn nearest_burning(field: &FireField, point: Vec3) -> Option<FireIndex> {
        let mut best: Option<(FireIndex, f32)> = None;
        for (index, fire) in field.iter() {
            if !fire.is_burning() {
                continue;
            }
            let Ok(position) = fire.position() else {
                continue;
            };
            let distance = (position - point).norm();
            match best {
                Some((_, nearest)) if distance >= nearest => {}
                _ => best = Some((index, distance)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Recompute the tracked fire from `point`
    pub fn select(&mut self, field: &FireField, point: Vec3) -> Option<FireIndex> {
        let selected = Self::nearest_burning(field, point);
        if selected != self.tracked {
            debug!(from = ?self.tracked, to = ?selected, "Nearest fire changed");
        }
        self.tracked = selected;
        selected
    }

    /// Whether the tracked fire no longer burns (or no longer exists)
    pub fn is_stale(&self, field: &FireField) -> bool {
        match self.tracked {
            Some(index) => !matches!(field.get(index), Some(fire) if fire.is_burning()),
            None => false,
        }
    }

    /// Re-select only if the tracked fire went out. Returns whether a
    /// re-selection happened.
    pub fn refresh_if_stale(&mut self, field: &FireField, point: Vec3) -> bool {
        if self.is_stale(field) {
            self.select(field, point);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Pose;
    use crate::fire::{FireRegion, FireUnit};
    use crate::physics::{ColliderId, Shape};

    fn fire_at(id: u32, x: f32, z: f32) -> FireUnit {
        let mut fire = FireUnit::new(
            format!("Fire {id}"),
            FireRegion::interactive(
                ColliderId(id * 2),
                Shape::Sphere { radius: 0.3 },
                Pose::identity(),
            ),
            FireRegion::solid(
                ColliderId(id * 2 + 1),
                Shape::Sphere { radius: 0.2 },
                Pose::identity(),
            ),
        );
        fire.attach(Pose::translation(x, 0.0, z));
        fire
    }

    #[test]
    fn test_picks_closest_then_next_after_extinguish() {
        let mut field = FireField::with_fires(
            Vec3::zeros(),
            [fire_at(1, 0.0, 5.0), fire_at(2, 3.0, 0.0)],
        );
        let mut selector = TargetSelector::new();
        assert_eq!(selector.select(&field, Vec3::zeros()), Some(FireIndex(1)));

        field.get_mut(FireIndex(1)).unwrap().extinguish(1.0);
        assert!(selector.is_stale(&field));
        assert!(selector.refresh_if_stale(&field, Vec3::zeros()));
        assert_eq!(selector.tracked(), Some(FireIndex(0)));
        assert!(!selector.refresh_if_stale(&field, Vec3::zeros()));
    }

    #[test]
    fn test_ties_resolve_to_first_registered() {
        let field = FireField::with_fires(
            Vec3::zeros(),
            [fire_at(1, 0.0, -2.0), fire_at(2, 2.0, 0.0), fire_at(3, 0.0, 2.0)],
        );
        assert_eq!(
            TargetSelector::nearest_burning(&field, Vec3::zeros()),
            Some(FireIndex(0))
        );
    }

    #[test]
    fn test_none_when_nothing_burns() {
        let mut field = FireField::with_fires(Vec3::zeros(), [fire_at(1, 1.0, 0.0)]);
        field.get_mut(FireIndex(0)).unwrap().extinguish(2.0);
        let mut selector = TargetSelector::new();
        assert_eq!(selector.select(&field, Vec3::zeros()), None);
        assert!(!selector.is_stale(&field));
    }

    #[test]
    fn test_unplaced_fires_are_skipped() {
        let unplaced = FireUnit::new(
            "Loose",
            FireRegion::interactive(ColliderId(90), Shape::Sphere { radius: 0.3 }, Pose::identity()),
            FireRegion::solid(ColliderId(91), Shape::Sphere { radius: 0.3 }, Pose::identity()),
        );
        let field = FireField::with_fires(Vec3::zeros(), [unplaced, fire_at(1, 9.0, 0.0)]);
        assert_eq!(
            TargetSelector::nearest_burning(&field, Vec3::zeros()),
            Some(FireIndex(1))
        );
    }
}
