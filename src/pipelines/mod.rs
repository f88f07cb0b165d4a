pub mod basic;
pub mod overlay;
