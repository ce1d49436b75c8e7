//! Drag/Camera Coordinator
//!
//! Latch between orbit navigation and the transform gizmo: while a drag is
//! active the camera ignores input. Values come straight from the gizmo
//! callback; nothing here reads back scene nodes.

use glam::Vec3;
use layout_core::TransformDescriptor;

use crate::camera::CameraNavigation;
use crate::error::Result;
use crate::session::EditSession;

/// Transform as reported by the gizmo; rotation in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoTransform {
    pub position: Vec3,
    pub rotation_radians: Vec3,
    pub scale: Vec3,
}

impl GizmoTransform {
    pub fn new(position: Vec3, rotation_radians: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation_radians,
            scale,
        }
    }

    /// Where the gizmo starts for a stored placement
    pub fn from_descriptor(descriptor: &TransformDescriptor) -> Self {
        Self::new(
            descriptor.position,
            descriptor.rotation_radians(),
            descriptor.scale,
        )
    }

    /// `[px, py, pz, rx, ry, rz, sx, sy, sz]`
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        let &[px, py, pz, rx, ry, rz, sx, sy, sz] = values else {
            return None;
        };
        Some(Self::new(
            Vec3::new(px, py, pz),
            Vec3::new(rx, ry, rz),
            Vec3::new(sx, sy, sz),
        ))
    }

    pub fn to_array(&self) -> [f32; 9] {
        let [px, py, pz] = self.position.to_array();
        let [rx, ry, rz] = self.rotation_radians.to_array();
        let [sx, sy, sz] = self.scale.to_array();
        [px, py, pz, rx, ry, rz, sx, sy, sz]
    }
}

#[derive(Debug, Default)]
pub struct DragCoordinator {
    /// Component captured at drag start
    target: Option<String>,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Begin dragging the selected component; needs edit mode and a selection
    pub fn drag_start(
        &mut self,
        session: &mut EditSession,
        camera: &mut impl CameraNavigation,
    ) -> bool {
        if !session.begin_drag() {
            return false;
        }
        self.target = session.selected().map(str::to_string);
        camera.set_navigation_enabled(false);
        tracing::debug!(component = ?self.target, "drag started");
        true
    }

    /// Live preview commit; ignored when no drag is active.
    ///
    /// A drag the session has already ended (edit mode left without `sync`)
    /// is dropped here and the camera is released.
    pub fn drag_update(
        &mut self,
        session: &mut EditSession,
        camera: &mut impl CameraNavigation,
        values: GizmoTransform,
    ) -> Result<bool> {
        if !session.is_dragging() {
            self.sync(session, camera);
            return Ok(false);
        }
        let Some(id) = &self.target else {
            return Ok(false);
        };
        commit(session, id, values)?;
        Ok(true)
    }

    /// Finish the drag and commit the final values.
    ///
    /// Navigation is restored before the commit, so a rejected commit still
    /// leaves the camera usable.
    pub fn drag_end(
        &mut self,
        session: &mut EditSession,
        camera: &mut impl CameraNavigation,
        values: Option<GizmoTransform>,
    ) -> Result<bool> {
        let target = self.target.take().filter(|_| session.is_dragging());
        session.end_drag();
        camera.set_navigation_enabled(true);

        let Some(id) = target else {
            return Ok(false);
        };
        tracing::debug!(%id, "drag ended");
        if let Some(values) = values {
            commit(session, &id, values)?;
        }
        Ok(true)
    }

    /// Re-establish navigation ⇔ not dragging after any session transition
    pub fn sync(&mut self, session: &EditSession, camera: &mut impl CameraNavigation) {
        let dragging = session.is_dragging() && self.target.is_some();
        if !dragging {
            self.target = None;
        }
        camera.set_navigation_enabled(!dragging);
    }
}

fn commit(session: &mut EditSession, id: &str, values: GizmoTransform) -> Result<()> {
    session.commit_transform(id, values.position, values.rotation_radians, values.scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;
    use layout_core::LayoutConfig;

    #[derive(Debug)]
    struct Nav(bool);

    impl CameraNavigation for Nav {
        fn navigation_enabled(&self) -> bool {
            self.0
        }

        fn set_navigation_enabled(&mut self, enabled: bool) {
            self.0 = enabled;
        }
    }

    fn setup() -> (EditSession, DragCoordinator, Nav) {
        let mut session = EditSession::new(LayoutConfig::greenhouse_defaults()).unwrap();
        session.enter_edit_mode();
        (session, DragCoordinator::new(), Nav(true))
    }

    #[test]
    fn test_drag_disables_then_restores_navigation() {
        let (mut session, mut drag, mut nav) = setup();
        session.select_component(Some("fan1"));

        assert!(drag.drag_start(&mut session, &mut nav));
        assert!(!nav.0);
        assert!(session.is_dragging());

        let end = GizmoTransform::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::ONE);
        assert!(drag.drag_end(&mut session, &mut nav, Some(end)).unwrap());
        assert!(nav.0);
        assert!(!session.is_dragging());
        assert_eq!(
            session.table().transform("fan1").unwrap().position,
            Vec3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn test_drag_without_selection_is_refused() {
        let (mut session, mut drag, mut nav) = setup();
        assert!(!drag.drag_start(&mut session, &mut nav));
        assert!(nav.0);
        assert!(drag.target().is_none());
    }

    #[test]
    fn test_live_updates_commit() {
        let (mut session, mut drag, mut nav) = setup();
        session.select_component(Some("esp32"));
        let values = GizmoTransform::new(Vec3::splat(0.5), Vec3::ZERO, Vec3::ONE);

        assert!(!drag.drag_update(&mut session, &mut nav, values).unwrap());
        drag.drag_start(&mut session, &mut nav);
        assert!(drag.drag_update(&mut session, &mut nav, values).unwrap());
        assert_eq!(session.table().transform("esp32").unwrap().position, Vec3::splat(0.5));
    }

    #[test]
    fn test_rejected_commit_still_restores_camera() {
        let (mut session, mut drag, mut nav) = setup();
        session.select_component(Some("camera"));
        drag.drag_start(&mut session, &mut nav);

        let bad = GizmoTransform::new(Vec3::new(f32::INFINITY, 0.0, 0.0), Vec3::ZERO, Vec3::ONE);
        let err = drag.drag_end(&mut session, &mut nav, Some(bad)).unwrap_err();
        assert!(matches!(err, EditError::NonFinite { .. }));
        assert!(nav.0);
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_sync_after_exit_edit_mode() {
        let (mut session, mut drag, mut nav) = setup();
        session.select_component(Some("fan2"));
        drag.drag_start(&mut session, &mut nav);

        session.exit_edit_mode();
        drag.sync(&session, &mut nav);
        assert!(nav.0);
        assert!(drag.target().is_none());
    }

    #[test]
    fn test_stale_drag_does_not_commit_after_exit() {
        let (mut session, mut drag, mut nav) = setup();
        session.select_component(Some("fan1"));
        let before = session.table().transform("fan1").unwrap().position;
        drag.drag_start(&mut session, &mut nav);

        // session left edit mode without the coordinator hearing about it
        session.exit_edit_mode();
        let moved = GizmoTransform::new(Vec3::splat(9.0), Vec3::ZERO, Vec3::ONE);
        assert!(!drag.drag_update(&mut session, &mut nav, moved).unwrap());
        assert!(nav.0);
        assert!(drag.target().is_none());
        assert_eq!(session.table().transform("fan1").unwrap().position, before);
    }

    #[test]
    fn test_stale_drag_end_is_ignored() {
        let (mut session, mut drag, mut nav) = setup();
        session.select_component(Some("esp32"));
        let before = session.table().transform("esp32").unwrap().position;
        drag.drag_start(&mut session, &mut nav);

        session.exit_edit_mode();
        let moved = GizmoTransform::new(Vec3::splat(9.0), Vec3::ZERO, Vec3::ONE);
        assert!(!drag.drag_end(&mut session, &mut nav, Some(moved)).unwrap());
        assert!(nav.0);
        assert_eq!(session.table().transform("esp32").unwrap().position, before);
    }

    #[test]
    fn test_gizmo_from_slice() {
        let values = [1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 1.0, 1.0, 2.0];
        let gizmo = GizmoTransform::from_slice(&values).unwrap();
        assert_eq!(gizmo.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(gizmo.scale, Vec3::new(1.0, 1.0, 2.0));
        assert_eq!(gizmo.to_array(), values);
        assert!(GizmoTransform::from_slice(&values[..8]).is_none());
    }
}
