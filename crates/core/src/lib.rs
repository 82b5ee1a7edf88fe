pub mod capture;
pub mod estimation;
pub mod monitoring;
pub mod overlay;
pub mod pipeline;
pub mod shared;
