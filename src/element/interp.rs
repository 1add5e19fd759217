#![allow(non_snake_case)]

use crate::error::{QuadratureError, Result};
use crate::prelude::*;

use super::{node::Node, quadrature::QuadPoint};

//------------------------------------------------------------------------------
// Shape Functions
//------------------------------------------------------------------------------

/// Corners of the reference triangle.
pub fn reference_triangle() -> [Point2; 3] {
    [Point2::new(0., 0.), Point2::new(1., 0.), Point2::new(0., 1.)]
}

/// Nodal basis families with an implemented evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFunctions {
    /// `N1 = 1 - x - y`, `N2 = x`, `N3 = y`
    LinearTriangle,
}

impl ShapeFunctions {
    pub fn new(n_functions: usize) -> Result<Self> {
        match n_functions {
            3 => Ok(ShapeFunctions::LinearTriangle),
            arity => Err(QuadratureError::UnsupportedShapeFunctionArity { arity }),
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            ShapeFunctions::LinearTriangle => 3,
        }
    }

    pub fn values(&self, X: &Point2) -> Matrix1xX {
        match self {
            ShapeFunctions::LinearTriangle => {
                Matrix1xX::from_row_slice(&[1. - X.x - X.y, X.x, X.y])
            }
        }
    }

    pub fn gradients(&self, _X: &Point2) -> Matrix2xX {
        match self {
            ShapeFunctions::LinearTriangle => Matrix2xX::from_row_slice(&[
                -1., 1., 0., // d/dx
                -1., 0., 1., // d/dy
            ]),
        }
    }
}


//------------------------------------------------------------------------------
// Interpolation to Quadrature Points
//------------------------------------------------------------------------------

/// Shape function gradients with respect to physical coordinates, using the
/// element Jacobian `J = gradN * X^T` built from the node positions.
pub fn physical_gradients(qp: &QuadPoint, nodes: &[Node]) -> Result<Matrix2xX> {
    let gradN = qp.shape_gradients()?;
    if gradN.ncols() != nodes.len() {
        return Err(QuadratureError::NodeCountMismatch {
            expected: gradN.ncols(),
            found: nodes.len(),
        });
    }

    let X = Matrix2xX::from_iterator(
        nodes.len(),
        nodes.iter().flat_map(|n| [n.position.x, n.position.y]),
    );
    let J: Matrix2 = gradN * X.transpose();

    // Relative to element size so small elements stay valid
    if J.determinant().abs() <= f64::EPSILON * J.norm_squared() {
        return Err(QuadratureError::DegenerateElement);
    }
    let J_inv = J.try_inverse().ok_or(QuadratureError::DegenerateElement)?;
    Ok(J_inv * gradN)
}

/// Value and physical gradient of the nodal solution `u` at a quadrature point.
pub fn interpolate_solution(qp: &QuadPoint, nodes: &[Node]) -> Result<(f64, Vector2)> {
    let N = qp.shape_values()?;
    let dN = physical_gradients(qp, nodes)?;

    let u: f64 = izip!(N.iter(), nodes.iter())
        .map(|(Ni, node)| Ni * node.u)
        .sum();
    let grad_u = dN
        .column_iter()
        .zip(nodes.iter())
        .fold(Vector2::zeros(), |acc, (dNi, node)| acc + dNi * node.u);
    Ok((u, grad_u))
}
