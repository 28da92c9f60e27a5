//! Headless shooting range: a row of humanoid targets and one marksman.

use crate::config::RangeConfig;
use anyhow::Result;
use combat::{CombatWorld, Weapon};
use engine_core::{Time, Transform};
use glam::Vec3;
use hecs::Entity;
use physics::SkeletonDesc;
use std::time::Duration;

/// Bones the marksman walks through, one per shot.
const AIM_BONES: [&str; 4] = ["Head", "Spine", "LeftUpperArm", "RightThigh"];
const EYE_HEIGHT: f32 = 1.6;
const MUZZLE_OFFSET: Vec3 = Vec3::new(0.25, -0.2, 0.0);

/// Running totals for the end-of-run summary.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RangeStats {
    pub shots: u32,
    pub hits: u32,
    pub misses: u32,
    pub kills: u32,
    pub despawned: u32,
    pub damage_dealt: f32,
}

pub struct Range {
    pub combat: CombatWorld,
    pub weapon: Weapon,
    pub camera: Transform,
    pub time: Time,
    pub stats: RangeStats,
    targets: Vec<Entity>,
    next_bone: usize,
    duration: f32,
}

impl Range {
    pub fn new(config: &RangeConfig) -> Result<Self> {
        let mut combat = CombatWorld::new(config.combat.clone());
        combat.add_ground();

        let skeleton = SkeletonDesc::humanoid();
        let width = config.spacing * config.targets.saturating_sub(1) as f32;
        let mut targets = Vec::with_capacity(config.targets);
        for i in 0..config.targets {
            let x = i as f32 * config.spacing - width * 0.5;
            targets.push(combat.spawn_target(Vec3::new(x, 0.0, -config.distance), &skeleton)?);
        }

        let mut time = Time::new();
        time.set_fixed_rate(config.combat.physics.fixed_rate_hz);

        let weapon = Weapon::new(&config.combat.weapon, config.combat.projectile);
        Ok(Self {
            combat,
            weapon,
            camera: Transform::from_position(Vec3::new(0.0, EYE_HEIGHT, 0.0)),
            time,
            stats: RangeStats::default(),
            targets,
            next_bone: 0,
            duration: config.duration,
        })
    }

    pub fn targets_alive(&self) -> usize {
        self.targets
            .iter()
            .filter(|&&target| self.combat.is_alive(target))
            .count()
    }

    /// The range is done once time runs out or nothing is left standing and
    /// every shot has landed or expired.
    pub fn is_finished(&self) -> bool {
        self.time.elapsed_seconds() >= self.duration
            || (self.targets_alive() == 0 && self.combat.projectile_count() == 0)
    }

    /// Run one rendered frame of length `delta`.
    pub fn frame(&mut self, delta: Duration) {
        self.time.advance(delta);
        let before = self.health_total();

        while self.time.should_fixed_update() {
            let dt = self.time.fixed_timestep_seconds();
            let report = self.combat.fixed_update(dt);
            for (id, hit) in &report.hits {
                self.stats.hits += 1;
                log::info!(
                    "Shot {:?} hit {} ({:?})",
                    id,
                    hit.body_part.as_deref().unwrap_or("nothing"),
                    hit.outcome
                );
            }
            for id in &report.expired {
                self.stats.misses += 1;
                log::debug!("Shot {:?} expired", id);
            }
            for target in &report.kills {
                self.stats.kills += 1;
                log::info!("Target {:?} down", target);
            }
        }
        self.stats.damage_dealt += (before - self.health_total()).max(0.0);

        let dt = self.time.delta_seconds();
        let despawned = self.combat.frame_update(dt);
        self.stats.despawned += despawned.len() as u32;
        self.targets.retain(|target| !despawned.contains(target));

        self.shoot(dt);
    }

    fn health_total(&self) -> f32 {
        self.targets
            .iter()
            .filter_map(|&target| self.combat.health(target))
            .sum()
    }

    /// Look at the next bone on the first standing target and fire when ready.
    fn shoot(&mut self, dt: f32) {
        self.weapon.update(dt);

        let Some(target) = self
            .targets
            .iter()
            .copied()
            .find(|&target| self.combat.is_alive(target))
        else {
            return;
        };
        let bone = AIM_BONES[self.next_bone % AIM_BONES.len()];
        let Some(point) = self.combat.bone_position(target, bone) else {
            log::warn!("Target {:?} has no bone `{}`", target, bone);
            return;
        };

        self.camera.look_at(point);
        self.weapon.muzzle.position = self.camera.position + self.camera.rotation * MUZZLE_OFFSET;
        if self.weapon.aim(&self.combat.physics, &self.camera).is_none() {
            self.next_bone += 1;
            return;
        }

        if let Some(shot) = self.weapon.fire() {
            let id = self.combat.spawn_projectile(shot);
            self.stats.shots += 1;
            self.next_bone += 1;
            log::debug!("Fired {:?} at {:?} `{}`", id, target, bone);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(targets: usize) -> RangeConfig {
        RangeConfig {
            targets,
            duration: 30.0,
            ..RangeConfig::default()
        }
    }

    #[test]
    fn targets_stand_in_a_centered_row() {
        let range = Range::new(&config(3)).unwrap();
        assert_eq!(range.targets_alive(), 3);
        let xs: Vec<f32> = range
            .targets
            .iter()
            .map(|&t| range.combat.bone_position(t, "Hips").unwrap().x)
            .collect();
        assert!((xs[0] + 2.5).abs() < 1e-4);
        assert!(xs[1].abs() < 1e-4);
        assert!((xs[2] - 2.5).abs() < 1e-4);
    }

    #[test]
    fn marksman_clears_the_range() {
        let mut range = Range::new(&config(2)).unwrap();
        let frame = Duration::from_secs_f64(1.0 / 60.0);
        while !range.is_finished() {
            range.frame(frame);
        }

        assert_eq!(range.targets_alive(), 0);
        assert_eq!(range.stats.kills, 2);
        assert!(range.stats.hits >= 2);
        assert!(range.stats.shots >= range.stats.hits);
        assert!(range.time.elapsed_seconds() < 30.0);
    }

    #[test]
    fn empty_range_finishes_immediately() {
        let range = Range::new(&config(0)).unwrap();
        assert!(range.is_finished());
    }
}
