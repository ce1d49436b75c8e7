//! Raw assets and the readiness gate in front of them
//!
//! A `RawAsset` is the loader's immutable node tree. The cache hands out
//! `Arc<RawAsset>` only once a load has resolved; every placement clones the
//! tree into the scene graph instead of touching the cached copy.

use std::collections::HashMap;
use std::sync::Arc;

use crate::bounds::Aabb;
use crate::components::Transform;
use crate::math::Vec3;

/// Geometry leaf: vertex positions in the owning node's local space
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub material: Option<String>,
}

impl MeshData {
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            material: None,
        }
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Build from a flat `[x, y, z, x, y, z, ...]` buffer; a trailing partial
    /// triple is dropped
    pub fn from_flat(positions: &[f32]) -> Self {
        Self::new(
            positions
                .chunks_exact(3)
                .map(|c| Vec3::new(c[0], c[1], c[2]))
                .collect(),
        )
    }

    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().copied())
    }
}

/// One node of a raw asset tree
#[derive(Debug, Clone)]
pub struct AssetNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<Arc<MeshData>>,
    pub children: Vec<usize>,
}

/// Immutable loader-supplied node tree keyed by its asset path
#[derive(Debug)]
pub struct RawAsset {
    path: String,
    nodes: Vec<AssetNode>,
}

impl RawAsset {
    /// Start building an asset; index 0 is the root node
    pub fn builder(path: impl Into<String>) -> RawAssetBuilder {
        RawAssetBuilder::new(path)
    }

    /// Asset with a single mesh on its root node
    pub fn from_mesh(path: impl Into<String>, mesh: MeshData) -> Self {
        let path = path.into();
        let mut builder = RawAssetBuilder::new(path.clone());
        builder.set_root_mesh(mesh);
        builder.build()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn root(&self) -> &AssetNode {
        &self.nodes[0]
    }

    pub fn node(&self, index: usize) -> Option<&AssetNode> {
        self.nodes.get(index)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Builder for `RawAsset`
#[derive(Debug)]
pub struct RawAssetBuilder {
    path: String,
    nodes: Vec<AssetNode>,
}

impl RawAssetBuilder {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            nodes: vec![AssetNode {
                name: path.clone(),
                transform: Transform::identity(),
                mesh: None,
                children: Vec::new(),
            }],
            path,
        }
    }

    /// Set the root node's own transform (the arbitrary authored origin)
    pub fn root_transform(&mut self, transform: Transform) -> &mut Self {
        self.nodes[0].transform = transform;
        self
    }

    pub fn set_root_mesh(&mut self, mesh: MeshData) -> &mut Self {
        self.nodes[0].mesh = Some(Arc::new(mesh));
        self
    }

    /// Add a node under `parent`; returns its index, or `None` if the parent
    /// index does not exist
    pub fn add_node(
        &mut self,
        parent: usize,
        name: impl Into<String>,
        transform: Transform,
        mesh: Option<MeshData>,
    ) -> Option<usize> {
        if parent >= self.nodes.len() {
            return None;
        }
        let index = self.nodes.len();
        self.nodes.push(AssetNode {
            name: name.into(),
            transform,
            mesh: mesh.map(Arc::new),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(index);
        Some(index)
    }

    pub fn build(self) -> RawAsset {
        RawAsset {
            path: self.path,
            nodes: self.nodes,
        }
    }
}

/// Load state of one asset path
#[derive(Debug, Clone)]
pub enum AssetState {
    Pending,
    Ready(Arc<RawAsset>),
    Failed(String),
}

impl AssetState {
    pub fn is_ready(&self) -> bool {
        matches!(self, AssetState::Ready(_))
    }
}

/// Fetch-or-cache store completed by the host loader
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<String, AssetState>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a load in flight; does nothing if the path is already known
    pub fn mark_pending(&mut self, path: impl Into<String>) {
        self.entries.entry(path.into()).or_insert(AssetState::Pending);
    }

    /// Resolve a path with a loaded asset
    pub fn insert_ready(&mut self, asset: RawAsset) -> Arc<RawAsset> {
        let asset = Arc::new(asset);
        tracing::debug!(path = asset.path(), nodes = asset.node_count(), "asset ready");
        self.entries
            .insert(asset.path().to_string(), AssetState::Ready(Arc::clone(&asset)));
        asset
    }

    pub fn mark_failed(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        let path = path.into();
        let reason = reason.into();
        tracing::warn!(%path, %reason, "asset load failed");
        self.entries.insert(path, AssetState::Failed(reason));
    }

    /// Current state; unknown paths are registered as pending
    pub fn fetch(&mut self, path: &str) -> AssetState {
        self.entries
            .entry(path.to_string())
            .or_insert(AssetState::Pending)
            .clone()
    }

    /// The asset if its load has resolved successfully
    pub fn get(&self, path: &str) -> Option<Arc<RawAsset>> {
        match self.entries.get(path)? {
            AssetState::Ready(asset) => Some(Arc::clone(asset)),
            _ => None,
        }
    }

    pub fn state(&self, path: &str) -> Option<&AssetState> {
        self.entries.get(path)
    }

    /// Paths still waiting on the loader
    pub fn pending_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, state)| matches!(state, AssetState::Pending))
            .map(|(path, _)| path.as_str())
            .collect();
        paths.sort_unstable();
        paths
    }
}
