use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum BoundaryCondition {
    #[default]
    None,
    Dirichlet(f64),
    Neumann(f64),
}

/// Mesh node supplying coordinates and solution values to an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: usize,
    pub position: Point2,
    pub u: f64,
    pub grad_u: Vector2,
    pub bc: BoundaryCondition,
}

impl Node {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Node {
            id,
            position: Point2::new(x, y),
            u: 0.,
            grad_u: Vector2::zeros(),
            bc: BoundaryCondition::None,
        }
    }

    pub fn with_bc(mut self, bc: BoundaryCondition) -> Self {
        if let BoundaryCondition::Dirichlet(value) = bc {
            self.u = value;
        }
        self.bc = bc;
        self
    }
}
