//! Application services

pub mod algebra;

pub use algebra::AlgebraService;
