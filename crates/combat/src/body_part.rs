//! Per-bone damage multipliers.

use serde::{Deserialize, Serialize};

/// Label given to bones that match no profile entry.
pub const DEFAULT_BODY_PART: &str = "head";
/// Multiplier given to bones that match no profile entry.
pub const DEFAULT_MULTIPLIER: f32 = 1.0;

fn default_bone() -> String {
    DEFAULT_BODY_PART.to_string()
}
fn default_multiplier() -> f32 {
    DEFAULT_MULTIPLIER
}

/// One `(pattern, multiplier)` entry as written in config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitMultiplier {
    /// Substring matched case-insensitively against bone names. Also the label.
    #[serde(default = "default_bone")]
    pub bone: String,
    #[serde(default = "default_multiplier")]
    pub multiplier: f32,
}

impl HitMultiplier {
    pub fn new(bone: impl Into<String>, multiplier: f32) -> Self {
        Self {
            bone: bone.into(),
            multiplier,
        }
    }
}

impl Default for HitMultiplier {
    fn default() -> Self {
        Self {
            bone: default_bone(),
            multiplier: default_multiplier(),
        }
    }
}

/// Resolved body part of a bone.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPart {
    pub label: String,
    pub multiplier: f32,
}

impl Default for BodyPart {
    fn default() -> Self {
        Self {
            label: DEFAULT_BODY_PART.to_string(),
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

/// Ordered list of bone-name patterns. The first entry whose pattern occurs in
/// the lowercased bone name wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyPartProfile {
    entries: Vec<(String, HitMultiplier)>,
}

impl BodyPartProfile {
    pub fn new(entries: impl IntoIterator<Item = HitMultiplier>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.bone.to_lowercase(), entry))
                .collect(),
        }
    }

    /// Head shots double, limbs are reduced.
    pub fn humanoid() -> Self {
        Self::new([
            HitMultiplier::new("head", 2.0),
            HitMultiplier::new("neck", 1.5),
            HitMultiplier::new("spine", 1.0),
            HitMultiplier::new("hips", 1.0),
            HitMultiplier::new("arm", 0.5),
            HitMultiplier::new("thigh", 0.75),
            HitMultiplier::new("shin", 0.5),
        ])
    }

    pub fn resolve(&self, bone_name: &str) -> BodyPart {
        let name = bone_name.to_lowercase();
        self.entries
            .iter()
            .find(|(needle, _)| name.contains(needle.as_str()))
            .map(|(_, entry)| BodyPart {
                label: entry.bone.clone(),
                multiplier: entry.multiplier,
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HitMultiplier> {
        self.entries.iter().map(|(_, entry)| entry)
    }
}
