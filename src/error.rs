//! Error types for quadrature construction and shape function evaluation.

use std::path::PathBuf;

use thiserror::Error;

/// A specialized `Result` type for quadrature operations.
pub type Result<T> = std::result::Result<T, QuadratureError>;

/// Errors that can occur while building or evaluating a quadrature table.
#[derive(Debug, Error)]
pub enum QuadratureError {
    /// No built-in lumped rule exists for this node count.
    #[error("unsupported element kind: {nodes} nodes (only linear and quadratic, triangular and quadrilateral elements are allowed)")]
    UnsupportedElementKind { nodes: usize },

    /// The quadrature data file could not be read.
    #[error("failed to load quadrature data file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No block in the data declares enough points.
    #[error("no quadrature with at least {requested} points found")]
    NoSuitableQuadrature { requested: usize },

    /// A block ended before its declared number of rows.
    #[error("quadrature block (n = {declared}) has fewer points than indicated")]
    TruncatedBlock { declared: usize },

    /// A block has more rows than it declared.
    #[error("quadrature block (n = {declared}) has more points than indicated")]
    OversizedBlock { declared: usize },

    /// A data row could not be read as `weight<TAB>x[<TAB>y]`.
    #[error("malformed quadrature row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// A block header whose count is not an integer.
    #[error("malformed block header at line {line}")]
    MalformedHeader { line: usize },

    /// Shape functions are only implemented for some arities.
    #[error("unsupported shape function arity: {arity}")]
    UnsupportedShapeFunctionArity { arity: usize },

    /// Shape values or gradients were read before they were computed.
    #[error("shape functions have not been initialized")]
    ShapeFunctionsUninitialized,

    /// Squaring needs a segment rule.
    #[error("cannot square a rule of dimension {dim}, expected a segment rule")]
    NotASegmentRule { dim: usize },

    /// Nodal data does not match the number of shape functions.
    #[error("expected {expected} nodes, found {found}")]
    NodeCountMismatch { expected: usize, found: usize },

    /// The element Jacobian is singular.
    #[error("degenerate element: singular Jacobian")]
    DegenerateElement,

    /// A serialized table is internally inconsistent.
    #[error("invalid quadrature table: {reason}")]
    InvalidTable { reason: String },

    /// The quadrature configuration could not be decoded.
    #[error("invalid quadrature configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl QuadratureError {
    /// Returns `true` if the error comes from reading tabulated data.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            QuadratureError::TruncatedBlock { .. }
                | QuadratureError::OversizedBlock { .. }
                | QuadratureError::MalformedRow { .. }
                | QuadratureError::MalformedHeader { .. }
        )
    }

    /// Returns `true` if the request names something not implemented.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            QuadratureError::UnsupportedElementKind { .. }
                | QuadratureError::UnsupportedShapeFunctionArity { .. }
        )
    }
}
