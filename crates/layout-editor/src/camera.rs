//! オービットカメラ
//!
//! Spherical camera around a target point (Y up). Navigation input is
//! dropped while `navigation_enabled` is false, which is how the drag
//! coordinator keeps the camera still during a gizmo drag.

use glam::{Mat4, Vec3, Vec4};
use layout_core::Ray;

/// Something whose user navigation can be switched off
pub trait CameraNavigation {
    fn navigation_enabled(&self) -> bool;
    fn set_navigation_enabled(&mut self, enabled: bool);
}

/// 距離・ピッチの制限
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCameraBounds {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: 0.5,
            max_distance: 20.0,
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.01,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.01,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub bounds: OrbitCameraBounds,
    viewport: (f32, f32),
    navigation_enabled: bool,
}

impl OrbitCamera {
    /// デフォルト値で新しいカメラを作成
    pub fn new(width: f32, height: f32) -> Self {
        let mut camera = Self {
            target: Vec3::new(0.0, 0.5, 0.0),
            distance: 3.0,
            yaw: 0.6,
            pitch: 0.45,
            fov: 45.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
            bounds: OrbitCameraBounds::default(),
            viewport: (1.0, 1.0),
            navigation_enabled: true,
        };
        camera.resize(width, height);
        camera
    }

    /// 視点位置
    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + Vec3::new(
                sin_yaw * cos_pitch,
                sin_pitch,
                cos_yaw * cos_pitch,
            ) * self.distance
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        let width = width.max(1.0);
        let height = height.max(1.0);
        self.viewport = (width, height);
        self.aspect = width / height;
    }

    /// Rotate around the target; ignored while navigation is disabled
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) -> bool {
        if !self.navigation_enabled {
            return false;
        }
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        true
    }

    /// Move the target in the view plane, scaled by distance
    pub fn pan(&mut self, dx: f32, dy: f32) -> bool {
        if !self.navigation_enabled {
            return false;
        }
        let forward = (self.target - self.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        self.target += (right * dx + up * dy) * self.distance * 0.1;
        true
    }

    /// Positive delta moves closer
    pub fn zoom(&mut self, delta: f32) -> bool {
        if !self.navigation_enabled {
            return false;
        }
        self.distance = (self.distance * (1.0 - delta * 0.1))
            .clamp(self.bounds.min_distance, self.bounds.max_distance);
        true
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// View-Projection行列を構築
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// スクリーン座標（ピクセル、左上原点）からワールド空間のレイを生成
    pub fn screen_to_ray(&self, screen_x: f32, screen_y: f32) -> Ray {
        let (width, height) = self.viewport;
        let ndc_x = screen_x / width * 2.0 - 1.0;
        let ndc_y = 1.0 - screen_y / height * 2.0;

        let inverse = self.view_projection().inverse();
        let unproject = |z: f32| {
            let p = inverse * Vec4::new(ndc_x, ndc_y, z, 1.0);
            p.truncate() / p.w
        };
        // perspective_rh の深度範囲は [0, 1]
        let near = unproject(0.0);
        let far = unproject(1.0);
        Ray::new(near, far - near)
    }
}

impl CameraNavigation for OrbitCamera {
    fn navigation_enabled(&self) -> bool {
        self.navigation_enabled
    }

    fn set_navigation_enabled(&mut self, enabled: bool) {
        self.navigation_enabled = enabled;
    }
}
