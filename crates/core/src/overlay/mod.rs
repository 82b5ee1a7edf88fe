pub mod marker_renderer;
