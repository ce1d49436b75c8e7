pub mod math;
pub mod components;
pub mod bounds;
pub mod asset;
pub mod scene;
pub mod normalize;
pub mod config;
pub mod placement;
pub mod compose;
pub mod error;

// Re-exports
pub use asset::{AssetCache, AssetState, MeshData, RawAsset, RawAssetBuilder};
pub use bounds::{Aabb, Ray};
pub use components::{ModelUniform, Transform};
pub use compose::{ComposeReport, SceneComposer};
pub use config::{
    ComponentKind, ComponentSpec, LayoutConfig, PotConfig, ScaleSpec, StructureConfig,
    TransformDescriptor, TransformSpec, Xyz,
};
pub use error::LayoutError;
pub use normalize::{NormalizedAsset, normalize, normalize_cached};
pub use placement::{ComponentPlacement, PlacementTable};
pub use scene::{Node, NodeId, RenderItem, SceneGraph};

// Re-export glam types for consistent version usage
pub use glam;
