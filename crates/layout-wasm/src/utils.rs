//! ユーティリティモジュール
//!
//! console_log マクロ、JS 変換ヘルパー

use glam::Mat4;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);
}

/// コンソールにログ出力するマクロ
macro_rules! console_log {
    ($($t:tt)*) => (crate::utils::log(&format_args!($($t)*).to_string()))
}
pub(crate) use console_log;

/// エラーを JS の文字列値に変換
pub fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// 列優先の 16 要素配列に変換
pub fn matrix_to_vec(matrix: Mat4) -> Vec<f32> {
    matrix.to_cols_array().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_matrix_to_vec_is_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let v = matrix_to_vec(m);
        assert_eq!(v.len(), 16);
        assert_eq!(&v[12..15], &[1.0, 2.0, 3.0]);
    }
}
