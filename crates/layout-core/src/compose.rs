//! Scene Composer
//!
//! One pass places the structure, attaches the pot under it and positions
//! every placement-table entry under the scene root. Passes are cheap and
//! idempotent; the host runs one whenever the table or the asset cache changes.
//!
//! Per pass:
//! 1. structure rotation/scale from config
//! 2. structure re-centered on its configured world offset, using bounds
//!    measured after the rotation
//! 3. pot attached under the structure (once), local transform from config
//! 4. component nodes created or updated from the table

use std::collections::HashMap;

use serde::Serialize;

use crate::asset::{AssetCache, AssetState};
use crate::bounds::{Aabb, Ray};
use crate::components::Transform;
use crate::config::{PotConfig, StructureConfig};
use crate::error::Result;
use crate::math::{self, Vec3};
use crate::normalize::{NormalizedAsset, normalize};
use crate::placement::PlacementTable;
use crate::scene::{NodeId, SceneGraph};

/// Edge length of the pick box used for components without geometry
pub const MARKER_SIZE: f32 = 0.1;

/// Outcome of one composition pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeReport {
    pub structure_ready: bool,
    pub pot_attached: bool,
    pub components_placed: usize,
    /// Asset paths still waiting on the loader, sorted
    pub pending_assets: Vec<String>,
    /// Asset paths whose load failed, sorted; skipped until the host reloads them
    pub failed_assets: Vec<String>,
}

impl ComposeReport {
    /// Nothing left to wait for; failed assets do not block completion
    pub fn is_complete(&self) -> bool {
        self.pending_assets.is_empty()
    }

    fn track(&mut self, path: &str, state: &AssetState) {
        match state {
            AssetState::Pending => self.pending_assets.push(path.to_string()),
            AssetState::Failed(_) => self.failed_assets.push(path.to_string()),
            AssetState::Ready(_) => {}
        }
    }
}

#[derive(Debug)]
struct ComponentNode {
    node: NodeId,
    model: Option<NormalizedAsset>,
}

#[derive(Debug, Default)]
pub struct SceneComposer {
    structure: Option<NormalizedAsset>,
    pot: Option<NormalizedAsset>,
    pot_attached: bool,
    components: HashMap<String, ComponentNode>,
}

impl SceneComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structure(&self) -> Option<&NormalizedAsset> {
        self.structure.as_ref()
    }

    pub fn pot(&self) -> Option<&NormalizedAsset> {
        self.pot.as_ref()
    }

    pub fn is_pot_attached(&self) -> bool {
        self.pot_attached
    }

    /// Node placed at the component's table transform
    pub fn component_node(&self, id: &str) -> Option<NodeId> {
        self.components.get(id).map(|c| c.node)
    }

    /// Normalized model under the component node, once its asset loaded
    pub fn component_model(&self, id: &str) -> Option<&NormalizedAsset> {
        self.components.get(id)?.model.as_ref()
    }

    /// Run one composition pass
    pub fn compose(
        &mut self,
        graph: &mut SceneGraph,
        cache: &mut AssetCache,
        structure: &StructureConfig,
        pot: Option<&PotConfig>,
        table: &PlacementTable,
    ) -> Result<ComposeReport> {
        let mut report = ComposeReport::default();

        let structure_ready = self.place_structure(graph, cache, structure, &mut report)?;
        if let Some(pot) = pot {
            self.place_pot(graph, cache, pot, structure_ready, &mut report)?;
        }
        let components_placed = self.place_components(graph, cache, table, &mut report)?;
        report.structure_ready = structure_ready;
        report.pot_attached = self.pot_attached;
        report.components_placed = components_placed;

        report.pending_assets.sort_unstable();
        report.pending_assets.dedup();
        report.failed_assets.sort_unstable();
        report.failed_assets.dedup();
        tracing::debug!(
            structure_ready = report.structure_ready,
            pot_attached = report.pot_attached,
            components = report.components_placed,
            pending = report.pending_assets.len(),
            failed = report.failed_assets.len(),
            "compose pass"
        );
        Ok(report)
    }

    /// Steps 1 and 2; false while the structure asset is loading
    fn place_structure(
        &mut self,
        graph: &mut SceneGraph,
        cache: &mut AssetCache,
        config: &StructureConfig,
        report: &mut ComposeReport,
    ) -> Result<bool> {
        if self.structure.as_ref().is_none_or(|s| !graph.is_alive(s.wrapper())) {
            self.structure = None;
            self.pot_attached = false;
            match cache.fetch(&config.asset) {
                AssetState::Ready(asset) => {
                    self.structure = Some(normalize(graph, &asset, "structure")?);
                }
                state => report.track(&config.asset, &state),
            }
        }
        let Some(structure) = &self.structure else {
            return Ok(false);
        };

        let desc = config.transform.resolve();
        let wrapper = structure.wrapper();
        let rotated = Transform::new(
            Vec3::ZERO,
            math::quat_from_euler(desc.rotation_radians()),
            desc.scale,
        );
        graph.set_local(wrapper, rotated);

        // Content only: an attached pot must not shift the structure's center.
        let center = graph
            .world_bounds(structure.content())
            .center()
            .unwrap_or(Vec3::ZERO);
        graph.set_local(
            wrapper,
            Transform {
                position: desc.position - center,
                ..rotated
            },
        );
        Ok(true)
    }

    /// Step 3; attachment waits until the structure is centered in this pass
    fn place_pot(
        &mut self,
        graph: &mut SceneGraph,
        cache: &mut AssetCache,
        config: &PotConfig,
        structure_ready: bool,
        report: &mut ComposeReport,
    ) -> Result<()> {
        if self.pot.as_ref().is_some_and(|p| !graph.is_alive(p.wrapper())) {
            self.pot = None;
            self.pot_attached = false;
        }
        if self.pot.is_none() {
            match cache.fetch(&config.asset) {
                AssetState::Ready(asset) if structure_ready => {
                    self.pot = Some(normalize(graph, &asset, "pot")?);
                }
                AssetState::Ready(_) => {}
                state => report.track(&config.asset, &state),
            }
        }

        let (Some(structure), Some(pot)) = (&self.structure, &self.pot) else {
            return Ok(());
        };
        if !structure_ready {
            return Ok(());
        }

        if !self.pot_attached {
            graph.set_parent(pot.wrapper(), structure.wrapper())?;
            self.pot_attached = true;
            tracing::info!(pot = %pot.wrapper(), structure = %structure.wrapper(), "pot attached");
        }
        // Local to the structure's rotated frame
        graph.set_local(pot.wrapper(), config.transform.resolve().to_transform());
        Ok(())
    }

    /// Step 4; returns the number of component nodes placed
    fn place_components(
        &mut self,
        graph: &mut SceneGraph,
        cache: &mut AssetCache,
        table: &PlacementTable,
        report: &mut ComposeReport,
    ) -> Result<usize> {
        let mut placed = 0;
        for placement in table.iter() {
            let local = placement.transform.to_transform();
            let entry = self
                .components
                .entry(placement.id.clone())
                .or_insert_with(|| ComponentNode {
                    node: graph.spawn(placement.id.clone(), local),
                    model: None,
                });
            if !graph.is_alive(entry.node) {
                entry.node = graph.spawn(placement.id.clone(), local);
                entry.model = None;
            }
            graph.set_local(entry.node, local);
            placed += 1;

            let Some(path) = &placement.asset else {
                continue;
            };
            if entry.model.is_some() {
                continue;
            }
            match cache.fetch(path) {
                AssetState::Ready(asset) => {
                    let model = normalize(graph, &asset, format!("{}:model", placement.id))?;
                    graph.set_parent(model.wrapper(), entry.node)?;
                    entry.model = Some(model);
                }
                state => report.track(path, &state),
            }
        }
        Ok(placed)
    }

    /// World bounds used for picking a component
    pub fn component_bounds(&self, graph: &SceneGraph, id: &str) -> Option<Aabb> {
        let node = self.component_node(id)?;
        let bounds = graph.world_bounds(node);
        if !bounds.is_empty() {
            return Some(bounds);
        }
        let world = graph.world_transform(node)?;
        Some(Aabb::unit_cube(world.position, world.scale * MARKER_SIZE))
    }

    /// Nearest component hit by the ray, with its distance
    pub fn pick(&self, graph: &SceneGraph, ray: &Ray) -> Option<(String, f32)> {
        let mut closest: Option<(&str, f32)> = None;
        for id in self.components.keys() {
            let Some(t) = self
                .component_bounds(graph, id)
                .and_then(|bounds| ray.intersect_aabb(&bounds))
            else {
                continue;
            };
            // ties resolved by id so picking does not depend on map order
            let better = match closest {
                None => true,
                Some((best_id, best_t)) => t < best_t || (t == best_t && id.as_str() < best_id),
            };
            if better {
                closest = Some((id.as_str(), t));
            }
        }
        closest.map(|(id, t)| (id.to_string(), t))
    }
}
