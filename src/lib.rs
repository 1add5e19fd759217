//! Quadrature rules and linear shape functions for low-order triangular and
//! quadrilateral finite elements.

pub mod config;
pub mod element;
pub mod error;
pub mod prelude;

pub use error::{QuadratureError, Result};
