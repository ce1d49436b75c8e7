//! Component Placement Table
//!
//! id → transform for every equipment component, in catalog order.
//! Lookups are by id only. The table is owned by the edit session, which is
//! the only code holding it mutably.

use std::collections::HashMap;

use crate::config::{ComponentKind, ComponentSpec, TransformDescriptor, TransformSpec};
use crate::error::{LayoutError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentPlacement {
    pub id: String,
    pub transform: TransformDescriptor,
    pub label: Option<String>,
    pub kind: ComponentKind,
    pub asset: Option<String>,
}

impl ComponentPlacement {
    fn from_spec(spec: &ComponentSpec) -> Self {
        Self {
            id: spec.id.clone(),
            transform: spec.descriptor(),
            label: spec.label.clone(),
            kind: spec.kind,
            asset: spec.asset.clone(),
        }
    }

    /// Catalog entry with every transform field written out
    pub fn to_spec(&self) -> ComponentSpec {
        ComponentSpec {
            id: self.id.clone(),
            label: self.label.clone(),
            kind: self.kind,
            asset: self.asset.clone(),
            transform: TransformSpec::explicit(&self.transform),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementTable {
    entries: Vec<ComponentPlacement>,
    index: HashMap<String, usize>,
}

impl PlacementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from catalog entries; ids must be non-empty and unique
    pub fn from_specs(specs: &[ComponentSpec]) -> Result<Self> {
        let mut table = Self::new();
        for spec in specs {
            if spec.id.is_empty() {
                return Err(LayoutError::EmptyComponentId);
            }
            if table.index.contains_key(&spec.id) {
                return Err(LayoutError::DuplicateComponent {
                    id: spec.id.clone(),
                });
            }
            let placement = ComponentPlacement::from_spec(spec);
            placement
                .transform
                .validate(&format!("components.{}", placement.id))?;
            table.index.insert(placement.id.clone(), table.entries.len());
            table.entries.push(placement);
        }
        Ok(table)
    }

    pub fn get(&self, id: &str) -> Option<&ComponentPlacement> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn transform(&self, id: &str) -> Option<&TransformDescriptor> {
        self.get(id).map(|placement| &placement.transform)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Entries in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &ComponentPlacement> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|placement| placement.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overwrite the transform of an existing entry
    pub fn commit(&mut self, id: &str, transform: TransformDescriptor) -> Result<()> {
        let Some(&i) = self.index.get(id) else {
            return Err(LayoutError::UnknownComponent { id: id.to_string() });
        };
        transform.validate(&format!("components.{id}"))?;
        self.entries[i].transform = transform;
        Ok(())
    }

    pub fn to_specs(&self) -> Vec<ComponentSpec> {
        self.entries.iter().map(ComponentPlacement::to_spec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn catalog() -> Vec<ComponentSpec> {
        vec![
            ComponentSpec::new("waterPump", ComponentKind::Actuator).at(-0.7, 0.3, 0.3),
            ComponentSpec::new("esp32", ComponentKind::Controller),
            ComponentSpec::new("camera", ComponentKind::Sensor).rotated(0.0, 180.0, 0.0),
        ]
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let table = PlacementTable::from_specs(&catalog()).unwrap();
        let esp32 = table.transform("esp32").unwrap();
        assert_eq!(*esp32, TransformDescriptor::default());

        let pump = table.transform("waterPump").unwrap();
        assert_eq!(pump.position, Vec3::new(-0.7, 0.3, 0.3));
        assert_eq!(pump.scale, Vec3::ONE);
    }

    #[test]
    fn test_catalog_order_preserved() {
        let table = PlacementTable::from_specs(&catalog()).unwrap();
        let ids: Vec<_> = table.ids().collect();
        assert_eq!(ids, vec!["waterPump", "esp32", "camera"]);
    }

    #[test]
    fn test_commit_overwrites() {
        let mut table = PlacementTable::from_specs(&catalog()).unwrap();
        let t = TransformDescriptor::new(Vec3::ONE, Vec3::new(0.0, 45.0, 0.0), Vec3::splat(2.0));
        table.commit("camera", t).unwrap();
        assert_eq!(table.transform("camera"), Some(&t));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_commit_unknown_id_is_rejected() {
        let mut table = PlacementTable::from_specs(&catalog()).unwrap();
        let before = table.clone();
        let err = table.commit("ghost", TransformDescriptor::default()).unwrap_err();
        assert!(matches!(err, LayoutError::UnknownComponent { .. }));
        assert_eq!(table, before);
    }

    #[test]
    fn test_commit_non_finite_is_rejected() {
        let mut table = PlacementTable::from_specs(&catalog()).unwrap();
        let bad = TransformDescriptor::new(Vec3::new(f32::INFINITY, 0.0, 0.0), Vec3::ZERO, Vec3::ONE);
        assert!(matches!(
            table.commit("esp32", bad),
            Err(LayoutError::NonFinite { .. })
        ));
        assert_eq!(*table.transform("esp32").unwrap(), TransformDescriptor::default());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut specs = catalog();
        specs.push(ComponentSpec::new("esp32", ComponentKind::Controller));
        assert!(PlacementTable::from_specs(&specs).is_err());
    }

    #[test]
    fn test_to_specs_is_explicit() {
        let table = PlacementTable::from_specs(&catalog()).unwrap();
        let specs = table.to_specs();
        assert!(specs.iter().all(|s| s.transform.position.is_some()
            && s.transform.rotation.is_some()
            && s.transform.scale.is_some()));
        assert_eq!(specs[1].descriptor(), TransformDescriptor::default());
    }
}
