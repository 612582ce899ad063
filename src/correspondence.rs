use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// A re-located reference feature: where it was found on screen, where it sits
/// on the marker plane, and how well it matched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    pub p2d: Vec2,
    pub p3d: Vec3,
    pub similarity: f32,
}
