//! Core engine types and utilities for the ragdoll range.
//!
//! This crate provides the foundational types used across all simulation systems:
//! - Transform and spatial components
//! - Fixed-step time management
//! - Common component types for ECS

pub mod components;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Quat, Vec3, Vec4};
pub use hecs::{Entity, World};
