//! Core types and utilities

pub mod vec3;

pub use vec3::{Pose, Quat, Vec3};
