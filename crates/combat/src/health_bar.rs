//! Health bar display model.

use engine_core::{Lifetime, Vec4};

pub const LOW_HEALTH_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
pub const HIGH_HEALTH_COLOR: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);

/// What a renderer needs to draw one health bar, refreshed every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthBar {
    pub low_color: Vec4,
    pub high_color: Vec4,
    /// Hide the bar while health is full and no hit landed for a while.
    pub hide_when_full: bool,
    fill: f32,
    current: f32,
    visible: bool,
    since_hit: Lifetime,
    dead: bool,
}

impl HealthBar {
    pub fn new(hide_when_full: bool, hide_delay: f32) -> Self {
        Self {
            low_color: LOW_HEALTH_COLOR,
            high_color: HIGH_HEALTH_COLOR,
            hide_when_full,
            fill: 1.0,
            current: f32::NAN,
            visible: !hide_when_full,
            since_hit: Lifetime::new(hide_delay),
            dead: false,
        }
    }

    /// A hit landed on the owner, even one that left health unchanged. Shows the
    /// bar and restarts the hide delay.
    pub fn on_hit(&mut self) {
        if self.dead {
            return;
        }
        self.visible = true;
        self.since_hit.reset();
    }

    /// Refresh from the owner's health. A drop since the previous call also
    /// counts as a hit.
    pub fn observe(&mut self, current: f32, max: f32, alive: bool, dt: f32) {
        let hit = current < self.current;
        self.current = current;
        self.fill = if max > 0.0 { (current / max).clamp(0.0, 1.0) } else { 0.0 };

        if !alive {
            self.dead = true;
            self.visible = false;
            return;
        }
        if hit {
            self.on_hit();
            return;
        }

        let idle = self.since_hit.update(dt);
        if self.hide_when_full && self.fill >= 1.0 && idle {
            self.visible = false;
        }
    }

    /// Fraction of the bar that is filled, `[0, 1]`.
    pub fn fill(&self) -> f32 {
        self.fill
    }

    /// Linear blend from the low-health to the high-health color.
    pub fn color(&self) -> Vec4 {
        self.low_color.lerp(self.high_color, self.fill)
    }

    /// Whole hit points to print next to the bar (rounded up).
    pub fn display_value(&self) -> i32 {
        if self.current.is_finite() {
            self.current.ceil() as i32
        } else {
            0
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible && !self.dead
    }
}
