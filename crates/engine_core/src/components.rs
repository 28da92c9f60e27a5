//! Common ECS components used across the engine.

/// Health pool for damageable entities.
///
/// `current` never drops below zero and never exceeds `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// Subtract `amount`, clamping at zero. Returns the health left.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        self.current = (self.current - amount).max(0.0);
        self.current
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Fraction of health left in `[0, 1]`. A zero-max pool reads as empty.
    pub fn percentage(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Elapsed-time budget for temporary things (projectiles, corpses, UI fades).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    pub elapsed: f32,
    pub limit: f32,
}

impl Lifetime {
    pub fn new(seconds: f32) -> Self {
        Self {
            elapsed: 0.0,
            limit: seconds,
        }
    }

    /// Advance by `dt` and report whether the budget is used up.
    pub fn update(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed >= self.limit
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}
