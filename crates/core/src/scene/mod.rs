use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::{PolygonSpec, Result};

/// Placement of one rendered copy of a layer's shared polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CopyTransform {
    pub index: u32,
    pub scale: f64,
    /// Static layout offset in radians, independent of the sweep angle.
    pub rotation: f64,
}

impl CopyTransform {
    pub fn new(index: u32, scale: f64, rotation: f64) -> Self {
        Self {
            index,
            scale,
            rotation,
        }
    }

    pub fn identity() -> Self {
        Self::new(0, 1.0, 0.0)
    }

    pub fn is_valid(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0 && self.rotation.is_finite()
    }

    pub fn apply(&self, point: DVec2, group_rotation: f64) -> DVec2 {
        DVec2::from_angle(self.rotation + group_rotation).rotate(point * self.scale)
    }
}

/// Evenly stepped copies: copy `i` is scaled by `1 + i * scale_step` and
/// rotated by `i * rotation_step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyLayout {
    pub count: u32,
    pub scale_step: f64,
    pub rotation_step: f64,
}

impl Default for CopyLayout {
    fn default() -> Self {
        Self {
            count: 1,
            scale_step: 0.0,
            rotation_step: 0.0,
        }
    }
}

impl CopyLayout {
    pub fn new(count: u32, scale_step: f64, rotation_step: f64) -> Self {
        Self {
            count,
            scale_step,
            rotation_step,
        }
    }

    pub fn transforms(&self) -> Vec<CopyTransform> {
        (0..self.count)
            .map(|i| {
                let step = i as f64;
                CopyTransform::new(i, 1.0 + step * self.scale_step, step * self.rotation_step)
            })
            .collect()
    }
}

/// Everything the layer collaborator owns about one polygon family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub name: String,
    pub polygon: PolygonSpec,
    #[serde(default)]
    pub layout: CopyLayout,
    #[serde(default)]
    pub group_rotation: f64,
}

impl LayerDescriptor {
    pub fn new(name: impl Into<String>, polygon: PolygonSpec, layout: CopyLayout) -> Result<Self> {
        polygon.validate()?;
        Ok(Self {
            name: name.into(),
            polygon,
            layout,
            group_rotation: 0.0,
        })
    }

    pub fn live_demo() -> Self {
        Self {
            name: "Live Demo".to_string(),
            polygon: PolygonSpec {
                sides: 5,
                skip: 2,
                radius: 1.0,
            },
            layout: CopyLayout::new(3, 0.25, std::f64::consts::PI / 10.0),
            group_rotation: 0.0,
        }
    }

    pub fn copies(&self) -> Vec<CopyTransform> {
        self.layout.transforms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_steps_scale_and_rotation() {
        let copies = CopyLayout::new(3, 0.5, 0.1).transforms();
        assert_eq!(copies.len(), 3);
        assert_eq!(copies[2].index, 2);
        assert!((copies[2].scale - 2.0).abs() < 1e-12);
        assert!((copies[2].rotation - 0.2).abs() < 1e-12);
    }

    #[test]
    fn group_rotation_adds_to_copy_rotation() {
        let copy = CopyTransform::new(0, 1.0, std::f64::consts::FRAC_PI_4);
        let moved = copy.apply(DVec2::X, std::f64::consts::FRAC_PI_4);
        assert!(moved.distance(DVec2::Y) < 1e-12);
    }

    #[test]
    fn invalid_copies_are_flagged() {
        assert!(!CopyTransform::new(0, 0.0, 0.0).is_valid());
        assert!(!CopyTransform::new(0, 1.0, f64::NAN).is_valid());
        assert!(CopyTransform::identity().is_valid());
    }

    #[test]
    fn layer_rejects_invalid_polygon() {
        let polygon = PolygonSpec {
            sides: 2,
            skip: 1,
            radius: 1.0,
        };
        assert!(LayerDescriptor::new("bad", polygon, CopyLayout::default()).is_err());
    }

    #[test]
    fn layer_round_trips_through_json() {
        let layer = LayerDescriptor::live_demo();
        let json = serde_json::to_string(&layer).unwrap();
        let parsed: LayerDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, layer);
    }
}
