//! Weapon hits, body-part damage and ragdoll deaths for jointed targets.
//!
//! A projectile ray-casts the segment it covered each physics tick against the
//! hit-detection layer. A struck bone collider resolves to a [`BodyPartHitbox`],
//! which scales the damage by its body part and forwards it to the owning
//! [`DamageableEntity`]. Lethal damage hands the body over to its ragdoll.

pub mod body_part;
pub mod config;
pub mod damageable;
pub mod error;
pub mod health_bar;
pub mod hitbox;
pub mod projectile;
pub mod rig;
pub mod weapon;
pub mod world;

pub use body_part::{BodyPart, BodyPartProfile, HitMultiplier};
pub use config::{CombatConfig, HealthBarConfig, PhysicsConfig, ProjectileConfig, TargetConfig, WeaponConfig};
pub use damageable::{DamageOutcome, Damageable, DamageableEntity};
pub use error::CombatError;
pub use health_bar::HealthBar;
pub use hitbox::{BodyPartHitbox, DamageRouter, HitboxRegistry};
pub use projectile::{ProjectileHit, ProjectileHitDetector, ProjectileStatus};
pub use weapon::{ProjectileSpawn, Weapon};
pub use world::{CombatWorld, ProjectileId, TickReport};
