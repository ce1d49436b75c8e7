use std::num::NonZeroU32;
use std::sync::Arc;

use super::node_id::{MAX_GENERATION, NodeId};
use crate::asset::{MeshData, RawAsset};
use crate::bounds::Aabb;
use crate::components::{ModelUniform, Transform};
use crate::error::{LayoutError, Result};
use crate::math::Mat4;

/// シーンノード
/// Local transform is relative to the parent node's frame.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub local: Transform,
    pub mesh: Option<Arc<MeshData>>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(name: impl Into<String>, local: Transform, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            local,
            mesh: None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena slot
#[derive(Debug)]
struct Slot {
    generation: NonZeroU32,
    node: Option<Node>,
}

/// Mesh node ready for the host renderer
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub node: NodeId,
    pub mesh: Arc<MeshData>,
    pub model: ModelUniform,
}

/// Generational arena of scene nodes under a single root
#[derive(Debug)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    /// Reusable slot indices
    free_list: Vec<u32>,
    root: NodeId,
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId::from_parts(0, NonZeroU32::MIN);
        Self {
            slots: vec![Slot {
                generation: NonZeroU32::MIN,
                node: Some(Node::new("scene", Transform::identity(), None)),
            }],
            free_list: Vec::new(),
            root,
        }
    }

    /// The scene root; it can never be despawned or reparented
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// New node directly under the scene root
    pub fn spawn(&mut self, name: impl Into<String>, local: Transform) -> NodeId {
        let root = self.root;
        self.alloc(Node::new(name, local, Some(root)))
    }

    /// New node under `parent`
    pub fn spawn_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        local: Transform,
    ) -> Result<NodeId> {
        if !self.is_alive(parent) {
            return Err(LayoutError::DeadNode { node: parent });
        }
        Ok(self.alloc(Node::new(name, local, Some(parent))))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let parent = node.parent;
        let id = if let Some(index) = self.free_list.pop() {
            // 再利用: 世代番号をインクリメント
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.saturating_add(1);
            slot.node = Some(node);
            NodeId::from_parts(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: NonZeroU32::MIN,
                node: Some(node),
            });
            NodeId::from_parts(index, NonZeroU32::MIN)
        };

        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.push(id);
        }
        id
    }

    /// Remove a node and its whole subtree
    /// 成功時true、rootまたは既に削除済みの場合false
    pub fn despawn(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.is_alive(id) {
            return false;
        }

        if let Some(parent) = self.parent(id).and_then(|p| self.get_mut(p)) {
            parent.children.retain(|&child| child != id);
        }

        for node in self.descendants(id) {
            let slot = &mut self.slots[node.index() as usize];
            slot.node = None;
            // 世代が上限に達したスロットは再利用しない
            if slot.generation.get() < MAX_GENERATION {
                self.free_list.push(node.index());
            }
        }
        true
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index() as usize)
            .is_some_and(|slot| slot.generation == id.generation_nonzero() && slot.node.is_some())
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation_nonzero() {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation_nonzero() {
            return None;
        }
        slot.node.as_mut()
    }

    pub fn local(&self, id: NodeId) -> Option<Transform> {
        self.get(id).map(|node| node.local)
    }

    /// Overwrite a node's local transform; false for dead nodes
    pub fn set_local(&mut self, id: NodeId, local: Transform) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.local = local;
                true
            }
            None => false,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children()).unwrap_or(&[])
    }

    /// Move `child` under `parent`, keeping its local transform
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        if !self.is_alive(child) {
            return Err(LayoutError::DeadNode { node: child });
        }
        if !self.is_alive(parent) {
            return Err(LayoutError::DeadNode { node: parent });
        }
        if child == self.root || self.is_ancestor_or_self(child, parent) {
            return Err(LayoutError::HierarchyCycle { child, parent });
        }
        if self.parent(child) == Some(parent) {
            return Ok(());
        }

        if let Some(old) = self.parent(child).and_then(|p| self.get_mut(p)) {
            old.children.retain(|&c| c != child);
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// True if `ancestor` is `node` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// `id` and everything below it, in pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Parent world matrix ∘ local matrix, walking up to the root
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.get(id)?;
        let mut matrix = node.local.to_matrix();
        while let Some(parent) = node.parent.and_then(|p| self.get(p)) {
            matrix = parent.local.to_matrix() * matrix;
            node = parent;
        }
        Some(matrix)
    }

    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        self.world_matrix(id).map(Transform::from_matrix)
    }

    /// Bounds of every vertex in the subtree, in world space
    pub fn world_bounds(&self, subtree: NodeId) -> Aabb {
        self.collect_bounds(subtree, Mat4::IDENTITY)
    }

    /// Bounds of every vertex in the subtree, expressed in `frame`'s local space
    pub fn bounds_in(&self, subtree: NodeId, frame: NodeId) -> Aabb {
        match self.world_matrix(frame) {
            Some(frame_world) => self.collect_bounds(subtree, frame_world.inverse()),
            None => Aabb::EMPTY,
        }
    }

    fn collect_bounds(&self, subtree: NodeId, to_frame: Mat4) -> Aabb {
        let Some(world) = self.world_matrix(subtree) else {
            return Aabb::EMPTY;
        };
        let mut aabb = Aabb::EMPTY;
        self.visit_meshes(subtree, to_frame * world, &mut |_, mesh, matrix| {
            for &p in &mesh.positions {
                aabb.extend(matrix.transform_point3(p));
            }
        });
        aabb
    }

    /// Walk the subtree with accumulated matrices; `matrix` is the matrix of `id` itself
    fn visit_meshes(
        &self,
        id: NodeId,
        matrix: Mat4,
        f: &mut dyn FnMut(NodeId, &Arc<MeshData>, Mat4),
    ) {
        let Some(node) = self.get(id) else {
            return;
        };
        if let Some(mesh) = &node.mesh {
            f(id, mesh, matrix);
        }
        for &child in &node.children {
            if let Some(local) = self.local(child) {
                self.visit_meshes(child, matrix * local.to_matrix(), f);
            }
        }
    }

    /// Deep-clone an asset tree under `parent` and return the clone's root.
    /// Node transforms are copied; vertex data is shared read-only.
    pub fn instantiate(&mut self, asset: &RawAsset, parent: NodeId) -> Result<NodeId> {
        let root = asset.root();
        let clone_root = self.spawn_child(parent, root.name.clone(), root.transform)?;
        if let Some(node) = self.get_mut(clone_root) {
            node.mesh = root.mesh.clone();
        }

        let mut stack: Vec<(usize, NodeId)> = vec![(0, clone_root)];
        while let Some((source, target)) = stack.pop() {
            let Some(source_node) = asset.node(source) else {
                continue;
            };
            for &child_index in &source_node.children {
                let Some(child) = asset.node(child_index) else {
                    continue;
                };
                let id = self.spawn_child(target, child.name.clone(), child.transform)?;
                if let Some(node) = self.get_mut(id) {
                    node.mesh = child.mesh.clone();
                }
                stack.push((child_index, id));
            }
        }
        Ok(clone_root)
    }

    /// Every mesh reachable from the root with its world matrix
    pub fn render_list(&self) -> Vec<RenderItem> {
        let mut items = Vec::new();
        let root_matrix = self.local(self.root).map(|t| t.to_matrix()).unwrap_or(Mat4::IDENTITY);
        self.visit_meshes(self.root, root_matrix, &mut |node, mesh, matrix| {
            items.push(RenderItem {
                node,
                mesh: Arc::clone(mesh),
                model: ModelUniform::from_matrix(matrix),
            });
        });
        items
    }

    /// First node with the given name, in pre-order from the root
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&id| self.get(id).is_some_and(|node| node.name == name))
    }

    /// Number of live nodes, including the root
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use std::f32::consts::FRAC_PI_2;

    fn cube_mesh(center: Vec3, size: f32) -> MeshData {
        let h = size * 0.5;
        MeshData::new(vec![center - Vec3::splat(h), center + Vec3::splat(h)])
    }

    #[test]
    fn test_spawn_under_root() {
        let mut graph = SceneGraph::new();
        let a = graph.spawn("a", Transform::identity());
        assert_eq!(graph.parent(a), Some(graph.root()));
        assert_eq!(graph.children(graph.root()), &[a]);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_despawn_subtree_and_reuse() {
        let mut graph = SceneGraph::new();
        let a = graph.spawn("a", Transform::identity());
        let b = graph.spawn_child(a, "b", Transform::identity()).unwrap();

        assert!(graph.despawn(a));
        assert!(!graph.is_alive(a));
        assert!(!graph.is_alive(b));
        assert!(graph.children(graph.root()).is_empty());

        // 再利用: 同じindexだが世代が異なる
        let c = graph.spawn("c", Transform::identity());
        assert!(c.index() == a.index() || c.index() == b.index());
        assert!(c.generation() >= 2);
        assert!(graph.get(a).is_none());
        assert!(graph.get(b).is_none());
    }

    #[test]
    fn test_slot_retired_at_max_generation() {
        let mut graph = SceneGraph::new();
        let first = graph.spawn("a", Transform::identity());
        let mut last = first;
        while last.generation() < MAX_GENERATION {
            assert!(graph.despawn(last));
            last = graph.spawn("a", Transform::identity());
            assert_eq!(last.index(), first.index());
        }

        assert!(graph.despawn(last));
        let fresh = graph.spawn("b", Transform::identity());
        assert_ne!(fresh.index(), first.index());
        assert_eq!(fresh.generation(), 1);
        assert_ne!(fresh.to_u32(), last.to_u32());
        assert!(!graph.is_alive(last));
    }

    #[test]
    fn test_root_cannot_be_despawned() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        assert!(!graph.despawn(root));
        assert!(graph.is_alive(root));
    }

    #[test]
    fn test_dead_node_operations() {
        let mut graph = SceneGraph::new();
        let a = graph.spawn("a", Transform::identity());
        graph.despawn(a);

        assert!(!graph.set_local(a, Transform::from_position(Vec3::ONE)));
        assert!(graph.world_matrix(a).is_none());
        assert!(matches!(
            graph.spawn_child(a, "x", Transform::identity()),
            Err(LayoutError::DeadNode { .. })
        ));
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut graph = SceneGraph::new();
        let a = graph.spawn("a", Transform::identity());
        let b = graph.spawn_child(a, "b", Transform::identity()).unwrap();

        assert!(matches!(
            graph.set_parent(a, b),
            Err(LayoutError::HierarchyCycle { .. })
        ));
        assert!(matches!(
            graph.set_parent(a, a),
            Err(LayoutError::HierarchyCycle { .. })
        ));
        let root = graph.root();
        assert!(graph.set_parent(root, a).is_err());
    }

    #[test]
    fn test_set_parent_keeps_local_transform() {
        let mut graph = SceneGraph::new();
        let parent = graph.spawn(
            "parent",
            Transform::from_euler(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 0.0, FRAC_PI_2), Vec3::ONE),
        );
        let child = graph.spawn("child", Transform::from_position(Vec3::X));

        graph.set_parent(child, parent).unwrap();
        assert_eq!(graph.local(child).unwrap().position, Vec3::X);
        assert_eq!(graph.children(graph.root()), &[parent]);

        let world = graph.world_transform(child).unwrap();
        assert!(world.position.abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-5));
    }

    #[test]
    fn test_world_bounds_follow_transforms() {
        let mut graph = SceneGraph::new();
        let a = graph.spawn("a", Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));
        let b = graph.spawn_child(a, "b", Transform::from_position(Vec3::Y)).unwrap();
        graph.get_mut(b).unwrap().mesh = Some(Arc::new(cube_mesh(Vec3::ZERO, 2.0)));

        let world = graph.world_bounds(a);
        assert_eq!(world.center(), Some(Vec3::new(10.0, 1.0, 0.0)));

        let local = graph.bounds_in(b, a);
        assert_eq!(local.center(), Some(Vec3::Y));
    }

    #[test]
    fn test_instantiate_clones_tree() {
        let mut builder = RawAsset::builder("fan.glb");
        builder.root_transform(Transform::from_position(Vec3::new(5.0, 0.0, 0.0)));
        let blade = builder
            .add_node(0, "blade", Transform::from_position(Vec3::Z), Some(cube_mesh(Vec3::ZERO, 1.0)))
            .unwrap();
        builder.add_node(blade, "tip", Transform::identity(), None).unwrap();
        let asset = builder.build();

        let mut graph = SceneGraph::new();
        let root = graph.root();
        let clone = graph.instantiate(&asset, root).unwrap();

        assert_eq!(graph.descendants(clone).len(), 3);
        assert_eq!(graph.local(clone).unwrap().position, Vec3::new(5.0, 0.0, 0.0));
        let blade_id = graph.find_by_name("blade").unwrap();
        assert_eq!(graph.parent(blade_id), Some(clone));
        assert!(graph.get(blade_id).unwrap().mesh.is_some());

        // 複製の変更は元アセットに影響しない
        graph.set_local(clone, Transform::identity());
        assert_eq!(asset.root().transform.position, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_render_list_world_matrices() {
        let mut graph = SceneGraph::new();
        let a = graph.spawn("a", Transform::from_position(Vec3::new(1.0, 2.0, 3.0)));
        graph.get_mut(a).unwrap().mesh = Some(Arc::new(cube_mesh(Vec3::ZERO, 1.0)));
        graph.spawn("empty", Transform::identity());

        let items = graph.render_list();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].node, a);
        assert_eq!(items[0].model.model[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
