//! Reader for tabulated quadrature rules.
//!
//! A file holds a sequence of blocks. Each block starts with a header line
//! `n = <count>` followed by `count` rows of `weight<TAB>x[<TAB>y]`. Blank
//! lines are ignored.

use log::{debug, trace};

use crate::error::{QuadratureError, Result};
use crate::prelude::*;

use super::QuadPoint;

/// The rows of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub declared: usize,
    pub points: Vec<QuadPoint>,
    /// 1 if every row has a single coordinate, 2 otherwise.
    pub dim: usize,
}

/// Returns the first block in `text` declaring at least `min_points` points.
pub fn parse_rule(text: &str, min_points: usize) -> Result<Block> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    // Searching for start of block
    let declared = loop {
        match lines.next() {
            None => {
                return Err(QuadratureError::NoSuitableQuadrature {
                    requested: min_points,
                })
            }
            Some((line, header)) if is_header(header) => {
                let n = parse_header(line, header)?;
                if n >= min_points {
                    break n;
                }
                trace!("skipping quadrature block (n = {n}) at line {line}");
            }
            Some(_) => {}
        }
    };

    let mut points = Vec::with_capacity(declared);
    let mut dim = 1;
    for _ in 0..declared {
        let (line, row) = match lines.next() {
            Some((line, row)) if !is_header(row) => (line, row),
            _ => return Err(QuadratureError::TruncatedBlock { declared }),
        };
        let (qp, fields) = parse_row(line, row)?;
        if fields == 3 {
            dim = 2;
        }
        points.push(qp);
    }

    // Checking if all points were read
    match lines.next() {
        Some((_, row)) if !is_header(row) => Err(QuadratureError::OversizedBlock { declared }),
        _ => {
            debug!("read quadrature block (n = {declared}, dim = {dim})");
            Ok(Block {
                declared,
                points,
                dim,
            })
        }
    }
}

fn is_header(line: &str) -> bool {
    line.starts_with('n')
}

fn parse_header(line: usize, header: &str) -> Result<usize> {
    header
        .split_once('=')
        .and_then(|(_, count)| count.trim().parse::<usize>().ok())
        .ok_or(QuadratureError::MalformedHeader { line })
}

fn parse_row(line: usize, row: &str) -> Result<(QuadPoint, usize)> {
    let fields = row.split('\t').map(str::trim).collect_vec();
    if fields.len() < 2 || fields.len() > 3 {
        return Err(QuadratureError::MalformedRow {
            line,
            reason: format!(
                "expected 2 or 3 tab separated fields, found {}",
                fields.len()
            ),
        });
    }
    let values = fields
        .iter()
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|e| QuadratureError::MalformedRow {
                    line,
                    reason: format!("invalid number {field:?}: {e}"),
                })
        })
        .collect::<Result<Vec<f64>>>()?;

    let y = values.get(2).copied().unwrap_or(0.);
    Ok((QuadPoint::new(values[0], values[1], y), fields.len()))
}

#[cfg(test)]
mod tests {

    use super::*;

    const RULES: &str = "n = 3\n\
        0.5\t-0.5\n\
        1.0\t0.0\n\
        0.5\t0.5\n\
        n = 4\n\
        0.25\t0.1\t0.2\n\
        0.25\t0.3\t0.4\n\
        0.25\t0.5\t0.6\n\
        0.25\t0.7\t0.8\n";

    #[test]
    fn test_first_block() {
        let block = parse_rule(RULES, 2).unwrap();
        assert_eq!(block.declared, 3);
        assert_eq!(block.dim, 1);
        assert_eq!(block.points[0], QuadPoint::new(0.5, -0.5, 0.));
        assert_eq!(block.points[2], QuadPoint::new(0.5, 0.5, 0.));
    }

    #[test]
    fn test_skips_small_blocks() {
        let block = parse_rule(RULES, 4).unwrap();
        assert_eq!(block.declared, 4);
        assert_eq!(block.dim, 2);
        assert_eq!(block.points.len(), 4);
        assert_eq!(block.points[0], QuadPoint::new(0.25, 0.1, 0.2));
        assert_eq!(block.points[3], QuadPoint::new(0.25, 0.7, 0.8));
    }

    #[test]
    fn test_no_suitable_block() {
        assert!(matches!(
            parse_rule(RULES, 5),
            Err(QuadratureError::NoSuitableQuadrature { requested: 5 })
        ));
        assert!(matches!(
            parse_rule("", 1),
            Err(QuadratureError::NoSuitableQuadrature { requested: 1 })
        ));
    }

    #[test]
    fn test_truncated_block() {
        let text = "n = 3\n1\t0\n1\t1\nn = 4\n1\t0\n";
        assert!(matches!(
            parse_rule(text, 3),
            Err(QuadratureError::TruncatedBlock { declared: 3 })
        ));

        // Ends before the block is complete
        assert!(matches!(
            parse_rule("n = 2\n1\t0\n", 2),
            Err(QuadratureError::TruncatedBlock { declared: 2 })
        ));
    }

    #[test]
    fn test_oversized_block() {
        let text = "n = 2\n1\t-0.5\n1\t0.5\n1\t0.0\nn = 3\n";
        assert!(matches!(
            parse_rule(text, 2),
            Err(QuadratureError::OversizedBlock { declared: 2 })
        ));
    }

    #[test]
    fn test_malformed_rows() {
        assert!(matches!(
            parse_rule("n = 1\n1\n", 1),
            Err(QuadratureError::MalformedRow { line: 2, .. })
        ));
        assert!(matches!(
            parse_rule("n = 1\n1\t0\t0\t0\n", 1),
            Err(QuadratureError::MalformedRow { line: 2, .. })
        ));
        assert!(matches!(
            parse_rule("n = 1\n1\tabc\n", 1),
            Err(QuadratureError::MalformedRow { line: 2, .. })
        ));
        assert!(matches!(
            parse_rule("n = x\n1\t0\n", 1),
            Err(QuadratureError::MalformedHeader { line: 1 })
        ));
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let text = "\r\nn = 2\r\n1\t-0.5\r\n\r\n1\t0.5\r\n\r\n";
        let block = parse_rule(text, 1).unwrap();
        assert_eq!(block.points.len(), 2);
        assert_eq!(block.points[1], QuadPoint::new(1., 0.5, 0.));
    }
}
