// crates/layout-wasm/src/lib.rs

use glam::Vec3;
use js_sys::Function;
use wasm_bindgen::prelude::*;

use layout_core::{LayoutConfig, MeshData, RawAsset};
use layout_editor::{GizmoTransform, LayoutEditor, TransformMode};

mod subscription;
mod utils;

use subscription::{SubscriptionManager, Topic, calculate_hash};
use utils::{console_log, matrix_to_vec, to_js_error};

// パニック時のスタックトレース表示
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn gizmo_from(values: &[f32]) -> Result<GizmoTransform, JsValue> {
    GizmoTransform::from_slice(values)
        .ok_or_else(|| JsValue::from_str("expected 9 values: position, rotation (rad), scale"))
}

/// LayoutEngine構造体
/// LayoutEditorをラップし、JSから操作可能なAPIを提供
#[wasm_bindgen]
pub struct LayoutEngine {
    editor: LayoutEditor,
    subscriptions: SubscriptionManager,
}

#[wasm_bindgen]
impl LayoutEngine {
    /// レイアウトJSONから作成（省略時は組み込みの温室レイアウト）
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<LayoutEngine, JsValue> {
        let config = match config_json {
            Some(json) => LayoutConfig::from_json_str(&json).map_err(to_js_error)?,
            None => LayoutConfig::greenhouse_defaults(),
        };
        let editor = LayoutEditor::new(config).map_err(to_js_error)?;
        console_log!(
            "LayoutEngine created ({} components)",
            editor.session().table().len()
        );
        Ok(Self {
            editor,
            subscriptions: SubscriptionManager::new(),
        })
    }

    /// ロード待ちのアセットパス
    pub fn pending_assets(&self) -> Vec<String> {
        self.editor
            .cache()
            .pending_paths()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// ロード済みアセットを登録（頂点座標 xyz のフラット配列）
    pub fn load_asset(&mut self, path: &str, positions: &[f32]) {
        let mesh = MeshData::from_flat(positions);
        let vertices = mesh.positions.len();
        self.editor
            .cache_mut()
            .insert_ready(RawAsset::from_mesh(path, mesh));
        console_log!("Asset loaded: {} ({} vertices)", path, vertices);
    }

    pub fn mark_asset_pending(&mut self, path: &str) {
        self.editor.cache_mut().mark_pending(path);
    }

    pub fn mark_asset_failed(&mut self, path: &str, reason: &str) {
        console_log!("Asset failed: {} ({})", path, reason);
        self.editor.cache_mut().mark_failed(path, reason);
    }

    /// 合成パスを1回実行し、結果を返す
    pub fn frame(&mut self) -> Result<JsValue, JsValue> {
        let report = self.editor.frame().map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(report).map_err(to_js_error)
    }

    pub fn enter_edit_mode(&mut self) {
        self.editor.enter_edit_mode();
        self.notify();
    }

    pub fn exit_edit_mode(&mut self) {
        self.editor.exit_edit_mode();
        self.notify();
    }

    pub fn is_edit_mode(&self) -> bool {
        self.editor.session().is_edit_mode()
    }

    /// 選択（nullで解除）
    pub fn select_component(&mut self, id: Option<String>) -> bool {
        let changed = self.editor.select_component(id.as_deref());
        self.notify();
        changed
    }

    pub fn hover_component(&mut self, id: Option<String>) -> bool {
        let changed = self.editor.set_hovered_component(id.as_deref());
        self.notify();
        changed
    }

    pub fn selected_component(&self) -> Option<String> {
        self.editor.session().selected().map(str::to_string)
    }

    /// "translate" | "rotate" | "scale"
    pub fn set_transform_mode(&mut self, mode: &str) -> Result<bool, JsValue> {
        let mode: TransformMode = mode.parse().map_err(to_js_error)?;
        let changed = self.editor.set_transform_mode(mode);
        self.notify();
        Ok(changed)
    }

    pub fn transform_mode(&self) -> String {
        self.editor.session().transform_mode().to_string()
    }

    /// キーボードショートカット（w / e / r）
    pub fn handle_key(&mut self, key: &str) -> bool {
        let handled = key
            .chars()
            .next()
            .is_some_and(|c| self.editor.handle_key(c));
        self.notify();
        handled
    }

    pub fn drag_start(&mut self) -> bool {
        let started = self.editor.drag_start();
        self.notify();
        started
    }

    /// ドラッグ中のプレビュー値 `[px,py,pz, rx,ry,rz, sx,sy,sz]`
    pub fn drag_update(&mut self, values: &[f32]) -> Result<bool, JsValue> {
        let updated = self
            .editor
            .drag_update(gizmo_from(values)?)
            .map_err(to_js_error)?;
        self.notify();
        Ok(updated)
    }

    /// ドラッグ終了、最終値をコミット
    pub fn drag_end(&mut self, values: Option<Vec<f32>>) -> Result<bool, JsValue> {
        let values = values.as_deref().map(gizmo_from).transpose()?;
        let result = self.editor.drag_end(values).map_err(to_js_error);
        // 失敗時もカメラ状態は戻っている
        self.notify();
        result
    }

    pub fn commit_transform(&mut self, id: &str, values: &[f32]) -> Result<(), JsValue> {
        self.editor
            .commit_transform(id, gizmo_from(values)?)
            .map_err(to_js_error)?;
        self.notify();
        Ok(())
    }

    pub fn reset_component(&mut self, id: &str) -> Result<(), JsValue> {
        self.editor.reset_component(id).map_err(to_js_error)?;
        self.notify();
        Ok(())
    }

    /// 選択中コンポーネントのGizmo初期値
    pub fn selected_gizmo(&self) -> Option<Vec<f32>> {
        self.editor
            .selected_gizmo()
            .map(|gizmo| gizmo.to_array().to_vec())
    }

    pub fn export_config(&self) -> Result<String, JsValue> {
        self.editor.export_config().map_err(to_js_error)
    }

    /// セッション状態（JSオブジェクト）
    pub fn session_state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.editor.session().state()).map_err(to_js_error)
    }

    pub fn camera_navigation_enabled(&self) -> bool {
        use layout_editor::CameraNavigation;
        self.editor.camera().navigation_enabled()
    }

    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) -> bool {
        self.editor.camera_mut().orbit(delta_yaw, delta_pitch)
    }

    pub fn pan(&mut self, dx: f32, dy: f32) -> bool {
        self.editor.camera_mut().pan(dx, dy)
    }

    pub fn zoom(&mut self, delta: f32) -> bool {
        self.editor.camera_mut().zoom(delta)
    }

    /// Canvasリサイズ
    pub fn resize(&mut self, width: f32, height: f32) {
        self.editor.camera_mut().resize(width, height);
    }

    pub fn camera_position(&self) -> Vec<f32> {
        self.editor.camera().position().to_array().to_vec()
    }

    pub fn set_camera_target(&mut self, x: f32, y: f32, z: f32) {
        self.editor.camera_mut().target = Vec3::new(x, y, z);
    }

    /// View-Projection行列（列優先）
    pub fn view_projection(&self) -> Vec<f32> {
        matrix_to_vec(self.editor.camera().view_projection())
    }

    /// クリック位置のコンポーネントを選択
    pub fn pointer_down(&mut self, screen_x: f32, screen_y: f32) -> Option<String> {
        let ray = self.editor.screen_to_ray(screen_x, screen_y);
        let hit = self.editor.pointer_down(&ray);
        self.notify();
        hit
    }

    pub fn pointer_move(&mut self, screen_x: f32, screen_y: f32) -> Option<String> {
        let ray = self.editor.screen_to_ray(screen_x, screen_y);
        let hit = self.editor.pointer_move(&ray);
        self.notify();
        hit
    }

    /// コンポーネントのワールド行列（列優先16要素）
    pub fn component_world_matrix(&self, id: &str) -> Option<Vec<f32>> {
        let node = self.editor.component_node(id)?;
        self.editor.world_matrix(node).map(matrix_to_vec)
    }

    /// 描画対象のモデル行列を連結して返す（16要素 × 件数）
    pub fn render_matrices(&self) -> Vec<f32> {
        self.editor
            .render_list()
            .iter()
            .flat_map(|item| item.model.to_cols_array())
            .collect()
    }

    /// 変更通知を購読（"session" | "layout"）
    pub fn subscribe(&mut self, topic: &str, callback: Function) -> Result<u32, JsValue> {
        let topic: Topic = topic.parse().map_err(|e: String| JsValue::from_str(&e))?;
        let hash = self.topic_hash(topic);
        Ok(self.subscriptions.subscribe(topic, callback, hash))
    }

    pub fn unsubscribe(&mut self, id: u32) -> bool {
        self.subscriptions.unsubscribe(id)
    }
}

impl LayoutEngine {
    fn topic_hash(&self, topic: Topic) -> u64 {
        match topic {
            Topic::Session => calculate_hash(self.editor.session().state()),
            Topic::Layout => calculate_hash(&self.editor.snapshot()),
        }
    }

    fn topic_value(&self, topic: Topic) -> Result<JsValue, serde_wasm_bindgen::Error> {
        match topic {
            Topic::Session => serde_wasm_bindgen::to_value(self.editor.session().state()),
            Topic::Layout => serde_wasm_bindgen::to_value(&self.editor.snapshot()),
        }
    }

    /// 変化した購読のコールバックを呼び出す
    fn notify(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        let session_hash = self.topic_hash(Topic::Session);
        let layout_hash = self.topic_hash(Topic::Layout);

        let mut changed = Vec::new();
        for subscription in self.subscriptions.iter_mut() {
            let hash = match subscription.topic {
                Topic::Session => session_hash,
                Topic::Layout => layout_hash,
            };
            if hash != subscription.last_hash {
                subscription.last_hash = hash;
                changed.push((subscription.topic, subscription.callback.clone()));
            }
        }

        for (topic, callback) in changed {
            let value = match self.topic_value(topic) {
                Ok(value) => value,
                Err(err) => {
                    console_log!("Subscription serialize error: {}", err);
                    continue;
                }
            };
            if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                console_log!("Subscription callback error: {:?}", err);
            }
        }
    }
}
