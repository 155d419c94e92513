//! Fire targets and the field that owns them

pub mod field;
pub mod unit;

pub use field::{FireField, FireIndex, AREA_DIAMETER};
pub use unit::{FireRegion, FireState, FireUnit, FireVisual, EXTINGUISHED_EPSILON, FULL_HEALTH};
