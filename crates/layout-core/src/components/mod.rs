pub mod transform;
pub mod model_uniform;

pub use transform::Transform;
pub use model_uniform::ModelUniform;
