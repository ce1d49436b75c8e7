//! Layout configuration
//!
//! Static structure/pot/component transforms supplied at startup, and the
//! shape `export_config` writes back out. Omitted transform fields fall back
//! to position `(0,0,0)`, rotation `(0,0,0)` and scale `(1,1,1)`. Rotations
//! are degrees with no range limit.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::components::Transform;
use crate::error::{LayoutError, Result};
use crate::math::{self, Vec3};

/// `{ "x": .., "y": .., "z": .. }`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Xyz {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Xyz {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for Xyz {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Xyz> for Vec3 {
    fn from(v: Xyz) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// Scale as a single uniform factor or per axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleSpec {
    Uniform(f32),
    Axes(Xyz),
}

impl ScaleSpec {
    pub fn to_vec3(self) -> Vec3 {
        match self {
            ScaleSpec::Uniform(s) => Vec3::splat(s),
            ScaleSpec::Axes(xyz) => xyz.into(),
        }
    }
}

/// Transform as authored; any field may be omitted
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Xyz>,
    /// Euler angles in degrees, XYZ order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Xyz>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleSpec>,
}

impl TransformSpec {
    /// Fill omitted fields with defaults
    pub fn resolve(&self) -> TransformDescriptor {
        TransformDescriptor {
            position: self.position.map(Vec3::from).unwrap_or(Vec3::ZERO),
            rotation_degrees: self.rotation.map(Vec3::from).unwrap_or(Vec3::ZERO),
            scale: self.scale.map(ScaleSpec::to_vec3).unwrap_or(Vec3::ONE),
        }
    }

    /// Every field written out
    pub fn explicit(descriptor: &TransformDescriptor) -> Self {
        Self {
            position: Some(descriptor.position.into()),
            rotation: Some(descriptor.rotation_degrees.into()),
            scale: Some(ScaleSpec::Axes(descriptor.scale.into())),
        }
    }
}

/// Resolved transform with rotation kept in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformDescriptor {
    pub position: Vec3,
    pub rotation_degrees: Vec3,
    pub scale: Vec3,
}

impl TransformDescriptor {
    pub fn new(position: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation_degrees,
            scale,
        }
    }

    /// From gizmo values, whose rotation is in radians
    pub fn from_radians(position: Vec3, rotation_radians: Vec3, scale: Vec3) -> Self {
        Self::new(position, math::radians_to_degrees(rotation_radians), scale)
    }

    pub fn rotation_radians(&self) -> Vec3 {
        math::degrees_to_radians(self.rotation_degrees)
    }

    pub fn to_transform(&self) -> Transform {
        Transform::from_euler(self.position, self.rotation_radians(), self.scale)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation_degrees.is_finite() && self.scale.is_finite()
    }

    /// Reject NaN/infinite components; `field` names the entry in the error
    pub fn validate(&self, field: &str) -> Result<()> {
        let parts = [
            ("position", self.position),
            ("rotation", self.rotation_degrees),
            ("scale", self.scale),
        ];
        for (name, value) in parts {
            if !value.is_finite() {
                return Err(LayoutError::NonFinite {
                    field: format!("{field}.{name}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for TransformDescriptor {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE)
    }
}

/// Equipment category, for host UI grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Sensor,
    Actuator,
    Controller,
    #[default]
    Other,
}

/// One entry of the component catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: ComponentKind,
    /// Model shown at the component's placement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(flatten)]
    pub transform: TransformSpec,
}

impl ComponentSpec {
    pub fn new(id: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            label: None,
            kind,
            asset: None,
            transform: TransformSpec::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_asset(mut self, asset: impl Into<String>) -> Self {
        self.asset = Some(asset.into());
        self
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = Some(Xyz::new(x, y, z));
        self
    }

    pub fn rotated(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.rotation = Some(Xyz::new(x, y, z));
        self
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.transform.scale = Some(ScaleSpec::Uniform(scale));
        self
    }

    pub fn descriptor(&self) -> TransformDescriptor {
        self.transform.resolve()
    }
}

/// Primary structure: rotation and scale, and the world point its
/// bounding-box center is moved to (`position`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureConfig {
    pub asset: String,
    #[serde(flatten)]
    pub transform: TransformSpec,
}

/// Pot attached under the structure; its transform is local to the
/// structure's rotated frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotConfig {
    pub asset: String,
    #[serde(flatten)]
    pub transform: TransformSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub structure: StructureConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pot: Option<PotConfig>,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

impl LayoutConfig {
    /// Parse and validate layout JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Finite numbers everywhere; non-empty, unique component ids
    pub fn validate(&self) -> Result<()> {
        self.structure.transform.resolve().validate("structure")?;
        if let Some(pot) = &self.pot {
            pot.transform.resolve().validate("pot")?;
        }

        let mut seen = HashSet::new();
        for component in &self.components {
            if component.id.is_empty() {
                return Err(LayoutError::EmptyComponentId);
            }
            if !seen.insert(component.id.as_str()) {
                return Err(LayoutError::DuplicateComponent {
                    id: component.id.clone(),
                });
            }
            component
                .descriptor()
                .validate(&format!("components.{}", component.id))?;
        }
        Ok(())
    }

    /// Built-in greenhouse layout
    pub fn greenhouse_defaults() -> Self {
        use ComponentKind::*;

        Self {
            structure: StructureConfig {
                asset: "models/greenhouse.glb".to_string(),
                transform: TransformSpec {
                    position: Some(Xyz::new(0.0, 0.0, 0.0)),
                    rotation: Some(Xyz::new(-90.0, 0.0, 0.0)),
                    scale: Some(ScaleSpec::Uniform(1.0)),
                },
            },
            pot: Some(PotConfig {
                asset: "models/pot.glb".to_string(),
                transform: TransformSpec {
                    position: Some(Xyz::new(0.0, 0.15, -0.35)),
                    rotation: Some(Xyz::new(90.0, 0.0, 0.0)),
                    scale: Some(ScaleSpec::Uniform(0.6)),
                },
            }),
            components: vec![
                ComponentSpec::new("waterPump", Actuator)
                    .with_label("Water pump")
                    .with_asset("models/water_pump.glb")
                    .at(-0.7, 0.3, 0.3),
                ComponentSpec::new("fan1", Actuator)
                    .with_label("Fan 1")
                    .with_asset("models/fan.glb")
                    .at(0.8, 0.9, -0.4)
                    .rotated(0.0, -90.0, 0.0)
                    .scaled(0.5),
                ComponentSpec::new("fan2", Actuator)
                    .with_label("Fan 2")
                    .with_asset("models/fan.glb")
                    .at(0.8, 0.9, 0.4)
                    .rotated(0.0, -90.0, 0.0)
                    .scaled(0.5),
                ComponentSpec::new("growLight", Actuator)
                    .with_label("Grow light")
                    .with_asset("models/grow_light.glb")
                    .at(0.0, 1.4, 0.0),
                ComponentSpec::new("esp32", Controller)
                    .with_label("ESP32 controller")
                    .with_asset("models/esp32.glb")
                    .at(-0.75, 0.6, -0.45)
                    .rotated(0.0, 90.0, 0.0),
                ComponentSpec::new("camera", Sensor)
                    .with_label("Camera")
                    .with_asset("models/camera.glb")
                    .at(0.0, 1.2, 0.6)
                    .rotated(-30.0, 180.0, 0.0),
                ComponentSpec::new("dht22", Sensor)
                    .with_label("Temperature / humidity")
                    .with_asset("models/dht22.glb")
                    .at(-0.75, 0.9, 0.0),
                ComponentSpec::new("soilMoisture", Sensor)
                    .with_label("Soil moisture")
                    .with_asset("models/soil_probe.glb")
                    .at(0.0, 0.35, -0.25),
                ComponentSpec::new("lightSensor", Sensor)
                    .with_label("Light sensor")
                    .with_asset("models/bh1750.glb")
                    .at(0.5, 1.3, 0.0),
            ],
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::greenhouse_defaults()
    }
}
