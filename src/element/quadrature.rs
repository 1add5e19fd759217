#![allow(non_snake_case)]

use std::{fs, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{QuadratureError, Result};
use crate::prelude::*;

use super::interp::{reference_triangle, ShapeFunctions};

pub mod file;

//------------------------------------------------------------------------------
// Quadrature Point
//------------------------------------------------------------------------------

/// One integration point of a rule, with shape function data once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQuadPoint")]
pub struct QuadPoint {
    pub weight: f64,
    pub coordinates: Vector2,
    N: Option<Matrix1xX>,
    gradN: Option<Matrix2xX>,
}

impl QuadPoint {
    pub fn new(weight: f64, x: f64, y: f64) -> Self {
        QuadPoint {
            weight,
            coordinates: Vector2::new(x, y),
            N: None,
            gradN: None,
        }
    }

    /// Shape function values (1 x nodes).
    pub fn shape_values(&self) -> Result<&Matrix1xX> {
        self.N
            .as_ref()
            .ok_or(QuadratureError::ShapeFunctionsUninitialized)
    }

    /// Shape function gradients with respect to the reference coordinates (2 x nodes).
    pub fn shape_gradients(&self) -> Result<&Matrix2xX> {
        self.gradN
            .as_ref()
            .ok_or(QuadratureError::ShapeFunctionsUninitialized)
    }
}

//------------------------------------------------------------------------------
// Quadrature Table
//------------------------------------------------------------------------------

/// An ordered set of integration points on a reference element.
///
/// Triangle rules live on the unit triangle, quadrilateral rules on
/// `[-1,1]x[-1,1]`, and segment rules on `[-1,1]` with the second
/// coordinate unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQuadratureTable")]
pub struct QuadratureTable {
    points: Vec<QuadPoint>,
    dim: usize,
    total_weight: f64,
}

impl QuadratureTable {
    /// Lumped rule with one unit-weight point at each node of the element.
    pub fn lumped(num_nodes: usize) -> Result<Self> {
        let points = match num_nodes {
            3 => vec![
                QuadPoint::new(1., 0., 0.),
                QuadPoint::new(1., 1., 0.),
                QuadPoint::new(1., 0., 1.),
            ],
            4 => vec![
                QuadPoint::new(1., -1., -1.),
                QuadPoint::new(1., 1., -1.),
                QuadPoint::new(1., 1., 1.),
                QuadPoint::new(1., -1., 1.),
            ],
            6 => vec![
                QuadPoint::new(1., 0., 0.),
                QuadPoint::new(1., 1., 0.),
                QuadPoint::new(1., 0., 1.),
                QuadPoint::new(1., 0.5, 0.),
                QuadPoint::new(1., 0.5, 0.5),
                QuadPoint::new(1., 0., 0.5),
            ],
            // TODO: bi-quadratic (9 node) lumped rule
            nodes => return Err(QuadratureError::UnsupportedElementKind { nodes }),
        };
        debug!("built lumped rule for {num_nodes} nodes");
        Ok(Self::from_points(points, 2))
    }

    /// Reads the first block of `path` declaring at least `min_points` points.
    pub fn from_file<P: AsRef<Path>>(path: P, min_points: usize) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| QuadratureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&text, min_points)?;
        debug!(
            "loaded {} point rule from {}",
            table.point_count(),
            path.display()
        );
        Ok(table)
    }

    /// Same as [`QuadratureTable::from_file`] on text already in memory.
    pub fn parse(text: &str, min_points: usize) -> Result<Self> {
        let block = file::parse_rule(text, min_points)?;
        Ok(Self::from_points(block.points, block.dim))
    }

    /// Gauss-Legendre segment rule on `[-1,1]`, points in ascending order.
    pub fn gauss_legendre(order: usize) -> Result<Self> {
        let points = match order {
            0 => return Err(QuadratureError::NoSuitableQuadrature { requested: order }),
            1 => vec![QuadPoint::new(2., 0., 0.)],
            _ => {
                let gl_rule = gauss_quad::GaussLegendre::init(order);
                izip!(
                    gl_rule.nodes.into_iter().rev(),
                    gl_rule.weights.into_iter().rev()
                )
                .map(|(x, w)| QuadPoint::new(w, x, 0.))
                .collect_vec()
            }
        };
        debug!("built {order} point Gauss-Legendre rule");
        Ok(Self::from_points(points, 1))
    }

    fn from_points(points: Vec<QuadPoint>, dim: usize) -> Self {
        QuadratureTable {
            points,
            dim,
            total_weight: 0.,
        }
    }

    /// Turns a segment rule of `m` points into the `m*m` point tensor-product
    /// rule on the square. Point `(i, j)` has weight `w_i * w_j` and
    /// coordinates `(x_i, x_j)`, `i` varying slowest.
    ///
    /// Shape functions must be initialized again afterwards.
    pub fn square(&mut self) -> Result<()> {
        if self.dim != 1 {
            return Err(QuadratureError::NotASegmentRule { dim: self.dim });
        }
        let points = iproduct!(self.points.iter(), self.points.iter())
            .map(|(qi, qj)| {
                QuadPoint::new(
                    qi.weight * qj.weight,
                    qi.coordinates[0],
                    qj.coordinates[0],
                )
            })
            .collect_vec();
        debug!(
            "squared {} point segment rule into {} points",
            self.points.len(),
            points.len()
        );
        self.points = points;
        self.dim = 2;
        self.total_weight = 0.;
        Ok(())
    }

    /// Computes shape function values and gradients at every point and the
    /// total weight of the rule.
    pub fn initialize_shape_functions(&mut self, n_functions: usize) -> Result<()> {
        let shape = ShapeFunctions::new(n_functions)?;
        let corners = reference_triangle();

        self.total_weight = 0.;
        for qp in self.points.iter_mut() {
            self.total_weight += qp.weight;

            let X = qp.coordinates.barycentric_to_cartesian(&corners);
            qp.N = Some(shape.values(&X));
            qp.gradN = Some(shape.gradients(&X));
        }
        debug!(
            "initialized {n_functions} shape functions at {} points, total weight {}",
            self.points.len(),
            self.total_weight
        );
        Ok(())
    }

    /// Weighted sum of `f` over the points of the rule.
    pub fn integrate<F>(&self, f: F) -> f64
    where
        F: Fn(&QuadPoint) -> f64,
    {
        self.points.iter().map(|qp| qp.weight * f(qp)).sum()
    }

    pub fn points(&self) -> &[QuadPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuadPoint> {
        self.points.iter()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// 1 for segment rules, 2 for planar rules.
    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// Sum of the weights, valid once shape functions are initialized.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }
}

//------------------------------------------------------------------------------
// Deserialization
//------------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawQuadPoint {
    weight: f64,
    coordinates: Vector2,
    N: Option<Matrix1xX>,
    gradN: Option<Matrix2xX>,
}

impl TryFrom<RawQuadPoint> for QuadPoint {
    type Error = QuadratureError;

    fn try_from(raw: RawQuadPoint) -> Result<Self> {
        match (&raw.N, &raw.gradN) {
            (None, None) => {}
            (Some(N), Some(gradN)) if N.ncols() == gradN.ncols() => {}
            (Some(N), Some(gradN)) => {
                return Err(QuadratureError::InvalidTable {
                    reason: format!(
                        "{} shape values but {} gradients",
                        N.ncols(),
                        gradN.ncols()
                    ),
                })
            }
            _ => {
                return Err(QuadratureError::InvalidTable {
                    reason: "shape values and gradients must be given together".to_string(),
                })
            }
        }
        Ok(QuadPoint {
            weight: raw.weight,
            coordinates: raw.coordinates,
            N: raw.N,
            gradN: raw.gradN,
        })
    }
}

#[derive(Deserialize)]
struct RawQuadratureTable {
    points: Vec<QuadPoint>,
    dim: usize,
    total_weight: f64,
}

impl TryFrom<RawQuadratureTable> for QuadratureTable {
    type Error = QuadratureError;

    fn try_from(raw: RawQuadratureTable) -> Result<Self> {
        if raw.dim != 1 && raw.dim != 2 {
            return Err(QuadratureError::InvalidTable {
                reason: format!("dimension {} is not 1 or 2", raw.dim),
            });
        }

        // Either every point carries shape functions of one arity, or none do
        let arities = raw
            .points
            .iter()
            .map(|qp| qp.N.as_ref().map(|N| N.ncols()))
            .unique()
            .collect_vec();
        if arities.len() > 1 {
            return Err(QuadratureError::InvalidTable {
                reason: "points carry inconsistent shape functions".to_string(),
            });
        }
        if let Some(Some(arity)) = arities.first() {
            ShapeFunctions::new(*arity)?;
        }

        Ok(QuadratureTable {
            points: raw.points,
            dim: raw.dim,
            total_weight: raw.total_weight,
        })
    }
}

impl<'a> IntoIterator for &'a QuadratureTable {
    type Item = &'a QuadPoint;
    type IntoIter = std::slice::Iter<'a, QuadPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}



#[cfg(test)]
mod test_shape_functions {

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_partition_of_unity() {
        let mut table = QuadratureTable::parse(
            "n = 3\n\
             0.1666666666666667\t0.1666666666666667\t0.1666666666666667\n\
             0.1666666666666667\t0.6666666666666667\t0.1666666666666667\n\
             0.1666666666666667\t0.1666666666666667\t0.6666666666666667\n",
            3,
        )
        .unwrap();
        table.initialize_shape_functions(3).unwrap();

        let raw: f64 = table.iter().map(|qp| qp.weight).sum();
        assert_eq!(table.total_weight(), raw);
        assert_relative_eq!(table.total_weight(), 0.5, epsilon = 1e-15);

        for qp in &table {
            let N = qp.shape_values().unwrap();
            assert_eq!(N.ncols(), 3);
            assert_relative_eq!(N.sum(), 1., epsilon = 1e-15);
            assert_relative_eq!(N[1], qp.coordinates[0]);
            assert_relative_eq!(N[2], qp.coordinates[1]);
        }

        // Each linear shape function integrates to 1/6 over the triangle
        for k in 0..3 {
            let integral = table.integrate(|qp| qp.shape_values().unwrap()[k]);
            assert_relative_eq!(integral, 1. / 6., epsilon = 1e-15);
        }
    }

    #[test]
    fn test_gradients() {
        let mut table = QuadratureTable::lumped(3).unwrap();
        table.initialize_shape_functions(3).unwrap();
        let expected = Matrix2xX::from_row_slice(&[
            -1., 1., 0., // d/dx
            -1., 0., 1., // d/dy
        ]);
        for qp in &table {
            assert_eq!(qp.shape_gradients().unwrap(), &expected);
        }
        assert_eq!(table.total_weight(), 3.);
    }

    #[test]
    fn test_uninitialized() {
        let table = QuadratureTable::lumped(3).unwrap();
        let qp = &table.points()[0];
        assert!(matches!(
            qp.shape_values(),
            Err(QuadratureError::ShapeFunctionsUninitialized)
        ));
        assert!(matches!(
            qp.shape_gradients(),
            Err(QuadratureError::ShapeFunctionsUninitialized)
        ));
    }

    #[test]
    fn test_unsupported_arity() {
        let mut table = QuadratureTable::lumped(4).unwrap();
        assert!(matches!(
            table.initialize_shape_functions(4),
            Err(QuadratureError::UnsupportedShapeFunctionArity { arity: 4 })
        ));
        assert!(table.points()[0].shape_values().is_err());
    }
}

#[cfg(test)]
mod test_serde {

    use serde_json::json;

    use super::*;

    fn initialized() -> serde_json::Value {
        let mut table = QuadratureTable::lumped(3).unwrap();
        table.initialize_shape_functions(3).unwrap();
        serde_json::to_value(&table).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let value = initialized();
        let table: QuadratureTable = serde_json::from_value(value).unwrap();
        assert_eq!(table.total_weight(), 3.);
        assert!(table.points()[2].shape_gradients().is_ok());
    }

    #[test]
    fn test_rejects_bad_dimension() {
        let mut value = initialized();
        value["dim"] = json!(3);
        assert!(serde_json::from_value::<QuadratureTable>(value)
            .unwrap_err()
            .to_string()
            .contains("dimension 3"));
    }

    #[test]
    fn test_rejects_inconsistent_shape_functions() {
        // Values without gradients
        let mut value = initialized();
        value["points"][0]["gradN"] = json!(null);
        assert!(serde_json::from_value::<QuadratureTable>(value).is_err());

        // One point left uninitialized
        let mut value = initialized();
        value["points"][1]["N"] = json!(null);
        value["points"][1]["gradN"] = json!(null);
        assert!(serde_json::from_value::<QuadratureTable>(value)
            .unwrap_err()
            .to_string()
            .contains("inconsistent"));

        // Gradients of a different width than the values
        let mut value = initialized();
        let narrow = serde_json::to_value(Matrix2xX::zeros(2)).unwrap();
        value["points"][0]["gradN"] = narrow;
        assert!(serde_json::from_value::<QuadratureTable>(value)
            .unwrap_err()
            .to_string()
            .contains("3 shape values but 2 gradients"));
    }

    #[test]
    fn test_uninitialized_table_accepted() {
        let table = QuadratureTable::gauss_legendre(2).unwrap();
        let value = serde_json::to_value(&table).unwrap();
        let restored: QuadratureTable = serde_json::from_value(value).unwrap();
        assert_eq!(restored, table);
    }
}
