//! Error type shared by the fire model, scene discovery and agent interfaces.

use std::fmt;

use crate::physics::ColliderId;

/// Errors surfaced by the firefighter core.
///
/// Configuration problems (`MissingFireComponent`, `DuplicateRegion`) are
/// reported and skipped during discovery; they never abort the rest of the
/// field. `RegionNotFound` is returned from lookups, `Unplaced` from transform
/// reads on a fire unit that was never attached to a placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirefighterError {
    /// A fire unit's transform was read before it had a placement
    Unplaced,
    /// No fire unit registered for this interactive region
    RegionNotFound(ColliderId),
    /// A node tagged `fire` carries no fire component
    MissingFireComponent { node: String },
    /// An interactive region id was registered twice
    DuplicateRegion { region: ColliderId, node: String },
    /// An action buffer had the wrong number of values
    InvalidAction { expected: usize, got: usize },
}

impl fmt::Display for FirefighterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unplaced => write!(f, "fire unit has no placement"),
            Self::RegionNotFound(region) => {
                write!(f, "no fire unit registered for region {region}")
            }
            Self::MissingFireComponent { node } => {
                write!(f, "node '{node}' is tagged fire but has no fire component")
            }
            Self::DuplicateRegion { region, node } => {
                write!(f, "region {region} on node '{node}' is already registered")
            }
            Self::InvalidAction { expected, got } => {
                write!(f, "expected {expected} continuous actions, got {got}")
            }
        }
    }
}

impl std::error::Error for FirefighterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_offending_node() {
        let err = FirefighterError::MissingFireComponent {
            node: "Fire (3)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "node 'Fire (3)' is tagged fire but has no fire component"
        );
    }

    #[test]
    fn test_display_region_not_found() {
        let err = FirefighterError::RegionNotFound(ColliderId(42));
        assert_eq!(err.to_string(), "no fire unit registered for region #42");
    }
}
