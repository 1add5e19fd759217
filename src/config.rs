//! Declarative description of how an element obtains its quadrature table.
//!
//! A relative `path` in a file source is taken relative to the directory of
//! the configuration file when loaded with
//! [`QuadratureConfig::from_json_file`], and relative to the working directory
//! otherwise.
//!
//! ```json
//! {
//!     "source": { "kind": "file", "path": "gauss.txt", "min_points": 3 },
//!     "square": true,
//!     "shape_functions": 3
//! }
//! ```

use std::{fs, path::{Path, PathBuf}};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::element::quadrature::QuadratureTable;
use crate::error::{QuadratureError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSource {
    /// Built-in rule with one point per node.
    Lumped { nodes: usize },
    /// First block of a tabulated file with at least `min_points` points.
    File { path: PathBuf, min_points: usize },
    /// Gauss-Legendre segment rule.
    GaussLegendre { order: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadratureConfig {
    pub source: RuleSource,
    /// Square a segment rule into a rule on the reference square.
    #[serde(default)]
    pub square: bool,
    /// Number of nodal shape functions to evaluate at each point.
    #[serde(default)]
    pub shape_functions: Option<usize>,
}

impl QuadratureConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| QuadratureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&json)?;
        if let (RuleSource::File { path: rules, .. }, Some(dir)) = (&mut config.source, path.parent())
        {
            if rules.is_relative() {
                *rules = dir.join(&*rules);
            }
        }
        Ok(config)
    }

    /// Builds the table, squares it if requested, then initializes shape
    /// functions if requested.
    pub fn build(&self) -> Result<QuadratureTable> {
        let mut table = match &self.source {
            RuleSource::Lumped { nodes } => QuadratureTable::lumped(*nodes)?,
            RuleSource::File { path, min_points } => {
                QuadratureTable::from_file(path, *min_points)?
            }
            RuleSource::GaussLegendre { order } => QuadratureTable::gauss_legendre(*order)?,
        };
        if self.square {
            table.square()?;
        }
        if let Some(n_functions) = self.shape_functions {
            table.initialize_shape_functions(n_functions)?;
        }
        debug!("built quadrature table from {:?}", self.source);
        Ok(table)
    }
}
