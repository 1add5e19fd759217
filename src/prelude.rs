pub use itertools::{iproduct, izip, Itertools};

//------------------------------------------------------------------------------
// Types
//------------------------------------------------------------------------------

/// Matrix (2 x 2)
pub type Matrix2 = nalgebra::Matrix2<f64>;

/// Row of shape function values (1 x Nodes)
pub type Matrix1xX = nalgebra::Matrix1xX<f64>;

/// Shape function gradients (2 x Nodes)
pub type Matrix2xX = nalgebra::Matrix2xX<f64>;

pub type Vector2 = nalgebra::Vector2<f64>;

pub type Point2 = nalgebra::Point2<f64>;

//------------------------------------------------------------------------------
// Traits
//------------------------------------------------------------------------------

pub trait BarycentricExt {
    fn barycentric_to_cartesian(&self, corners: &[Point2; 3]) -> Point2;
}

impl BarycentricExt for Vector2 {
    /// Treats `self` as the weights of the second and third corner; the first
    /// corner takes the remainder.
    fn barycentric_to_cartesian(&self, corners: &[Point2; 3]) -> Point2 {
        let l0 = 1. - self[0] - self[1];
        Point2::from(
            corners[0].coords * l0 + corners[1].coords * self[0] + corners[2].coords * self[1],
        )
    }
}
