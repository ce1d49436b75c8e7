//! Composition root
//!
//! `LayoutEditor` owns every piece of editor state and wires events between
//! them. Hosts hold one instance and call `frame()` after feeding assets or
//! events.

use glam::Mat4;
use layout_core::{
    AssetCache, ComposeReport, LayoutConfig, NodeId, Ray, RenderItem, SceneComposer, SceneGraph,
};

use crate::camera::OrbitCamera;
use crate::drag::{DragCoordinator, GizmoTransform};
use crate::error::Result;
use crate::session::{EditSession, TransformMode};

#[derive(Debug)]
pub struct LayoutEditor {
    cache: AssetCache,
    graph: SceneGraph,
    composer: SceneComposer,
    session: EditSession,
    drag: DragCoordinator,
    camera: OrbitCamera,
    report: ComposeReport,
}

impl LayoutEditor {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        Ok(Self {
            cache: AssetCache::new(),
            graph: SceneGraph::new(),
            composer: SceneComposer::new(),
            session: EditSession::new(config)?,
            drag: DragCoordinator::new(),
            camera: OrbitCamera::new(1280.0, 720.0),
            report: ComposeReport::default(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(LayoutConfig::from_json_str(json)?)
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// The host loader completes entries here
    pub fn cache_mut(&mut self) -> &mut AssetCache {
        &mut self.cache
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn composer(&self) -> &SceneComposer {
        &self.composer
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Navigation calls on the camera respect the drag latch
    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn drag(&self) -> &DragCoordinator {
        &self.drag
    }

    /// Result of the most recent `frame()`
    pub fn report(&self) -> &ComposeReport {
        &self.report
    }

    /// One composition pass over the current table and cache
    pub fn frame(&mut self) -> Result<&ComposeReport> {
        self.report = self.composer.compose(
            &mut self.graph,
            &mut self.cache,
            self.session.structure(),
            self.session.pot(),
            self.session.table(),
        )?;
        Ok(&self.report)
    }

    pub fn enter_edit_mode(&mut self) {
        self.session.enter_edit_mode();
        self.drag.sync(&self.session, &mut self.camera);
    }

    /// Ends any drag in progress and gives the camera back
    pub fn exit_edit_mode(&mut self) {
        self.session.exit_edit_mode();
        self.drag.sync(&self.session, &mut self.camera);
    }

    pub fn select_component(&mut self, id: Option<&str>) -> bool {
        self.session.select_component(id)
    }

    pub fn set_hovered_component(&mut self, id: Option<&str>) -> bool {
        self.session.set_hovered_component(id)
    }

    pub fn set_transform_mode(&mut self, mode: TransformMode) -> bool {
        self.session.set_transform_mode(mode)
    }

    pub fn handle_key(&mut self, key: char) -> bool {
        self.session.handle_key(key)
    }

    pub fn drag_start(&mut self) -> bool {
        self.drag.drag_start(&mut self.session, &mut self.camera)
    }

    pub fn drag_update(&mut self, values: GizmoTransform) -> Result<bool> {
        self.drag
            .drag_update(&mut self.session, &mut self.camera, values)
    }

    pub fn drag_end(&mut self, values: Option<GizmoTransform>) -> Result<bool> {
        self.drag.drag_end(&mut self.session, &mut self.camera, values)
    }

    pub fn commit_transform(&mut self, id: &str, values: GizmoTransform) -> Result<()> {
        self.session
            .commit_transform(id, values.position, values.rotation_radians, values.scale)
    }

    pub fn reset_component(&mut self, id: &str) -> Result<()> {
        self.session.reset_component(id)
    }

    pub fn export_config(&self) -> Result<String> {
        self.session.export_config()
    }

    pub fn snapshot(&self) -> LayoutConfig {
        self.session.snapshot()
    }

    /// Gizmo start values for the selected component
    pub fn selected_gizmo(&self) -> Option<GizmoTransform> {
        let id = self.session.selected()?;
        self.session
            .table()
            .transform(id)
            .map(GizmoTransform::from_descriptor)
    }

    /// Nearest component under the ray
    pub fn pick(&self, ray: &Ray) -> Option<String> {
        self.composer.pick(&self.graph, ray).map(|(id, _)| id)
    }

    /// Select what the pointer hits, or clear on a miss
    pub fn pointer_down(&mut self, ray: &Ray) -> Option<String> {
        if !self.session.is_edit_mode() || self.session.is_dragging() {
            return None;
        }
        let hit = self.pick(ray);
        self.session.select_component(hit.as_deref());
        hit
    }

    pub fn pointer_move(&mut self, ray: &Ray) -> Option<String> {
        if !self.session.is_edit_mode() {
            return None;
        }
        let hit = self.pick(ray);
        self.session.set_hovered_component(hit.as_deref());
        hit
    }

    pub fn screen_to_ray(&self, screen_x: f32, screen_y: f32) -> Ray {
        self.camera.screen_to_ray(screen_x, screen_y)
    }

    pub fn component_node(&self, id: &str) -> Option<NodeId> {
        self.composer.component_node(id)
    }

    pub fn world_matrix(&self, node: NodeId) -> Option<Mat4> {
        self.graph.world_matrix(node)
    }

    pub fn render_list(&self) -> Vec<RenderItem> {
        self.graph.render_list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraNavigation;
    use glam::Vec3;
    use layout_core::{MeshData, RawAsset};
    use proptest::prelude::*;

    fn editor() -> LayoutEditor {
        LayoutEditor::new(LayoutConfig::greenhouse_defaults()).unwrap()
    }

    fn load_all(editor: &mut LayoutEditor) {
        let paths: Vec<String> = editor.report().pending_assets.clone();
        for path in paths {
            let mesh = MeshData::new(vec![Vec3::splat(-0.05), Vec3::splat(0.05)]);
            editor.cache_mut().insert_ready(RawAsset::from_mesh(path, mesh));
        }
    }

    #[test]
    fn test_frame_reports_pending_then_completes() {
        let mut editor = editor();
        let report = editor.frame().unwrap().clone();
        assert!(!report.structure_ready);
        assert!(report.pending_assets.contains(&"models/greenhouse.glb".to_string()));
        assert_eq!(report.components_placed, 9);

        // the pot is requested only once the structure is centered
        let mut report = report;
        for _ in 0..3 {
            load_all(&mut editor);
            report = editor.frame().unwrap().clone();
        }
        assert!(report.structure_ready);
        assert!(report.pot_attached);
        assert!(report.is_complete());
    }

    #[test]
    fn test_pointer_down_selects_and_clears() {
        let mut editor = editor();
        editor.frame().unwrap();
        editor.enter_edit_mode();

        let pump = editor.component_node("waterPump").unwrap();
        let at = editor.graph().world_transform(pump).unwrap().position;
        let ray = Ray::new(at + Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(editor.pointer_down(&ray).as_deref(), Some("waterPump"));
        assert_eq!(editor.session().selected(), Some("waterPump"));

        let miss = Ray::new(Vec3::splat(50.0), Vec3::Y);
        assert_eq!(editor.pointer_down(&miss), None);
        assert_eq!(editor.session().selected(), None);
    }

    #[test]
    fn test_pointer_ignored_outside_edit_mode() {
        let mut editor = editor();
        editor.frame().unwrap();
        let pump = editor.component_node("waterPump").unwrap();
        let at = editor.graph().world_transform(pump).unwrap().position;
        let ray = Ray::new(at + Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);

        assert_eq!(editor.pointer_down(&ray), None);
        assert_eq!(editor.pointer_move(&ray), None);
        assert_eq!(editor.session().hovered(), None);
    }

    #[test]
    fn test_drag_commit_moves_node_on_next_frame() {
        let mut editor = editor();
        editor.frame().unwrap();
        editor.enter_edit_mode();
        editor.select_component(Some("growLight"));
        assert!(editor.drag_start());

        let target = Vec3::new(0.2, 1.1, -0.3);
        editor
            .drag_end(Some(GizmoTransform::new(target, Vec3::ZERO, Vec3::ONE)))
            .unwrap();
        editor.frame().unwrap();

        let node = editor.component_node("growLight").unwrap();
        let world = editor.world_matrix(node).unwrap();
        assert!(world.w_axis.truncate().abs_diff_eq(target, 1e-6));
    }

    #[test]
    fn test_exit_edit_mode_ends_drag() {
        let mut editor = editor();
        editor.enter_edit_mode();
        editor.select_component(Some("fan1"));
        editor.drag_start();
        assert!(!editor.camera().navigation_enabled());

        editor.exit_edit_mode();
        assert!(editor.camera().navigation_enabled());
        assert!(!editor.session().is_dragging());
        assert!(editor.drag().target().is_none());
    }

    #[test]
    fn test_selected_gizmo_in_radians() {
        let mut editor = editor();
        editor.enter_edit_mode();
        editor.select_component(Some("esp32"));
        let gizmo = editor.selected_gizmo().unwrap();
        assert!((gizmo.rotation_radians.y - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[derive(Debug, Clone)]
    enum Event {
        Enter,
        Exit,
        Select(Option<&'static str>),
        DragStart,
        DragUpdate,
        DragEnd,
        Orbit,
    }

    fn arb_event() -> impl Strategy<Value = Event> {
        prop_oneof![
            Just(Event::Enter),
            Just(Event::Exit),
            prop::sample::select(vec![None, Some("fan1"), Some("esp32"), Some("ghost")])
                .prop_map(Event::Select),
            Just(Event::DragStart),
            Just(Event::DragUpdate),
            Just(Event::DragEnd),
            Just(Event::Orbit),
        ]
    }

    proptest! {
        #[test]
        fn prop_navigation_iff_not_dragging(events in prop::collection::vec(arb_event(), 1..40)) {
            let mut editor = editor();
            let values = GizmoTransform::new(Vec3::ONE, Vec3::ZERO, Vec3::ONE);
            for event in events {
                match event {
                    Event::Enter => editor.enter_edit_mode(),
                    Event::Exit => editor.exit_edit_mode(),
                    Event::Select(id) => {
                        editor.select_component(id);
                    }
                    Event::DragStart => {
                        editor.drag_start();
                    }
                    Event::DragUpdate => {
                        editor.drag_update(values).unwrap();
                    }
                    Event::DragEnd => {
                        editor.drag_end(Some(values)).unwrap();
                    }
                    Event::Orbit => {
                        let moved = editor.camera_mut().orbit(0.1, 0.0);
                        prop_assert_eq!(moved, !editor.session().is_dragging());
                    }
                }
                prop_assert_eq!(
                    editor.camera().navigation_enabled(),
                    !editor.session().is_dragging()
                );
                prop_assert!(editor.session().selected().is_none() || editor.session().is_edit_mode());
            }
        }
    }
}
