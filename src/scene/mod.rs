//! Scene-side state owned by the renderer:
//! - FlyCamera: first-person camera and its uniforms
//! - SceneObject: GPU buffers of one drawable (optionally instanced)

pub mod camera;
pub mod object;

pub use camera::{CameraUniforms, FlyCamera};
pub use object::{ObjectBindings, ObjectId, SceneObject};
