pub mod camera;
pub mod drag;
pub mod editor;
pub mod error;
pub mod session;

// Re-exports
pub use camera::{CameraNavigation, OrbitCamera, OrbitCameraBounds};
pub use drag::{DragCoordinator, GizmoTransform};
pub use editor::LayoutEditor;
pub use error::EditError;
pub use session::{EditSession, EditSessionState, TransformMode};
