pub mod board;
pub mod eval_constants;
pub mod flow;
pub mod generator;
pub mod opening;
