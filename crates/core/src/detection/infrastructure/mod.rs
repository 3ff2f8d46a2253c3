pub mod execution_provider;
pub mod model_cache;
pub mod onnx_face_detector;
