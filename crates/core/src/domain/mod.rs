pub mod indicators;
pub mod recommendation;
pub mod symbol;
