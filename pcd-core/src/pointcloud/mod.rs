pub mod chunk;
pub mod point;
