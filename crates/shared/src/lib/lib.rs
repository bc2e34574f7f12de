pub mod fixed_point;
pub mod settlement;
