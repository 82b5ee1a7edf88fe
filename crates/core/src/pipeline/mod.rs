pub mod frame_sink;
pub mod infrastructure;
pub mod monitor;
pub mod monitor_logger;
