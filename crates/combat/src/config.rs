//! Tunables for targets, projectiles and weapons. Usually loaded from RON.

use crate::body_part::{BodyPartProfile, HitMultiplier};
use crate::error::CombatError;
use crate::projectile::DEFAULT_TTL;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Bone-name patterns, checked in order.
    pub body_parts: Vec<HitMultiplier>,
    pub projectile: ProjectileConfig,
    pub target: TargetConfig,
    pub health_bar: HealthBarConfig,
    pub weapon: WeaponConfig,
    pub physics: PhysicsConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            body_parts: BodyPartProfile::humanoid().entries().cloned().collect(),
            projectile: ProjectileConfig::default(),
            target: TargetConfig::default(),
            health_bar: HealthBarConfig::default(),
            weapon: WeaponConfig::default(),
            physics: PhysicsConfig::default(),
        }
    }
}

impl CombatConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, CombatError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, CombatError> {
        let source = std::fs::read_to_string(path).map_err(|source| CombatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    pub fn profile(&self) -> BodyPartProfile {
        BodyPartProfile::new(self.body_parts.iter().cloned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Muzzle speed in units per second.
    pub speed: f32,
    /// Raw damage before body-part multipliers.
    pub damage: f32,
    /// Seconds before an unspent projectile is removed.
    pub ttl: f32,
    pub gravity_scale: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 120.0,
            damage: 25.0,
            ttl: DEFAULT_TTL,
            gravity_scale: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub max_health: f32,
    /// Seconds a ragdolled corpse stays before it is despawned.
    pub corpse_lifetime: Option<f32>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            corpse_lifetime: Some(5.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthBarConfig {
    pub hide_when_full: bool,
    pub hide_delay: f32,
}

impl Default for HealthBarConfig {
    fn default() -> Self {
        Self {
            hide_when_full: true,
            hide_delay: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub fire_rate: f32, // Shots per second
    /// Reach of the camera ray that picks the aim point.
    pub aim_distance: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            fire_rate: 4.0,
            aim_distance: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub fixed_rate_hz: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { fixed_rate_hz: 60.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ron_gives_defaults() {
        let config = CombatConfig::from_ron_str("()").unwrap();
        assert_eq!(config, CombatConfig::default());
        assert_eq!(config.projectile.ttl, 4.0);
    }

    #[test]
    fn partial_ron_overrides_fields() {
        let config = CombatConfig::from_ron_str(
            r#"(
                body_parts: [(bone: "head", multiplier: 2.0), (bone: "torso")],
                projectile: (damage: 30.0),
                target: (corpse_lifetime: None),
            )"#,
        )
        .unwrap();

        let profile = config.profile();
        assert_eq!(profile.resolve("Head").multiplier, 2.0);
        assert_eq!(profile.resolve("UpperTorso").multiplier, 1.0);
        assert_eq!(config.projectile.damage, 30.0);
        assert_eq!(config.projectile.speed, 120.0);
        assert_eq!(config.target.corpse_lifetime, None);
    }

    #[test]
    fn malformed_ron_is_an_error() {
        let err = CombatConfig::from_ron_str("(projectile: (speed: \"fast\"))").unwrap_err();
        assert!(matches!(err, CombatError::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = CombatConfig::load(Path::new("definitely/not/here.ron")).unwrap_err();
        assert!(matches!(err, CombatError::Io { .. }));
    }
}
