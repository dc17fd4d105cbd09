pub mod order;
pub mod rate;
