pub mod angle;
pub mod anomaly;
pub mod frame;
pub mod root_finding;
