//! Asset Normalizer
//!
//! Clones a raw asset into the scene graph under a fresh wrapper node and
//! shifts the clone so its bounding-box center sits at the wrapper origin.
//! The cached `RawAsset` is only read.

use crate::asset::{AssetCache, RawAsset};
use crate::components::Transform;
use crate::error::Result;
use crate::math::Vec3;
use crate::scene::{NodeId, SceneGraph};

/// Pivot-centered wrapper around one cloned asset instance
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAsset {
    wrapper: NodeId,
    content: NodeId,
    source_path: String,
    content_offset: Vec3,
}

impl NormalizedAsset {
    /// Node that callers position, rotate and attach
    pub fn wrapper(&self) -> NodeId {
        self.wrapper
    }

    /// Root of the cloned asset tree, child of the wrapper
    pub fn content(&self) -> NodeId {
        self.content
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Translation applied to the content (the negated original center)
    pub fn content_offset(&self) -> Vec3 {
        self.content_offset
    }
}

/// Normalize a loaded asset into `graph`; the wrapper is spawned under the scene root.
///
/// Content without vertices has no center and keeps a zero offset.
pub fn normalize(
    graph: &mut SceneGraph,
    asset: &RawAsset,
    name: impl Into<String>,
) -> Result<NormalizedAsset> {
    let wrapper = graph.spawn(name, Transform::identity());
    let content = graph.instantiate(asset, wrapper)?;

    // The authored root transform is discarded; the wrapper carries placement.
    graph.set_local(content, Transform::identity());

    let bounds = graph.bounds_in(content, wrapper);
    let content_offset = bounds.center().map(|center| -center).unwrap_or(Vec3::ZERO);
    graph.set_local(content, Transform::from_position(content_offset));

    tracing::debug!(
        path = asset.path(),
        offset = ?content_offset,
        size = ?bounds.size(),
        "normalized asset"
    );

    Ok(NormalizedAsset {
        wrapper,
        content,
        source_path: asset.path().to_string(),
        content_offset,
    })
}

/// Normalize the asset at `path` once the cache reports it ready.
/// `Ok(None)` while the load is pending or failed.
pub fn normalize_cached(
    graph: &mut SceneGraph,
    cache: &AssetCache,
    path: &str,
    name: impl Into<String>,
) -> Result<Option<NormalizedAsset>> {
    match cache.get(path) {
        Some(asset) => normalize(graph, &asset, name).map(Some),
        None => Ok(None),
    }
}
