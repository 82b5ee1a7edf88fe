pub mod pose;
pub mod pose_estimator;
