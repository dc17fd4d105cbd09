pub mod common;
pub mod order;
pub mod params;
pub mod rate;
