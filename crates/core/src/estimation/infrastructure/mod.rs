pub mod execution_provider;
pub mod model_resolver;
pub mod onnx_movenet_estimator;
pub mod skip_frame_estimator;
