/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Readers producing raw arc lists.

use crate::dist::DistVec;
use anyhow::{bail, ensure, Context, Result};
use std::io::BufRead;
use std::path::Path;

/// Reads an arc list from a file in Matrix Market coordinate format.
///
/// See [`parse_matrix_market`].
pub fn read_matrix_market(
    path: impl AsRef<Path>,
    num_locales: usize,
) -> Result<(DistVec<i64>, DistVec<i64>)> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open {}", path.display()))?;
    parse_matrix_market(std::io::BufReader::new(file), num_locales)
        .with_context(|| format!("Could not parse {}", path.display()))
}

/// Parses an arc list in Matrix Market coordinate format.
///
/// Leading `%`-comment lines are skipped; the first non-comment line must
/// provide the `rows cols entries` counts; each of the following `entries`
/// lines provides an arc as `u v`, or `u v w` for weighted matrices. The
/// weight is parsed and discarded, as the visits of this crate do not
/// consult it.
pub fn parse_matrix_market(
    reader: impl BufRead,
    num_locales: usize,
) -> Result<(DistVec<i64>, DistVec<i64>)> {
    let mut lines = reader.lines().enumerate();

    let (header_line, header) = loop {
        match lines.next() {
            Some((line, text)) => {
                let text = text.with_context(|| format!("Could not read line {}", line + 1))?;
                if !text.starts_with('%') {
                    break (line, text);
                }
            }
            None => bail!("Malformed Matrix Market header: no size line"),
        }
    };
    let mut fields = header.split_whitespace();
    let mut count = || -> Result<usize> {
        fields
            .next()
            .with_context(|| {
                format!("Malformed Matrix Market header at line {}", header_line + 1)
            })?
            .parse::<usize>()
            .with_context(|| {
                format!("Malformed Matrix Market header at line {}", header_line + 1)
            })
    };
    let (_rows, _cols, entries) = (count()?, count()?, count()?);

    let mut src = Vec::with_capacity(entries);
    let mut dst = Vec::with_capacity(entries);
    for (line, text) in &mut lines {
        if src.len() == entries {
            break;
        }
        let text = text.with_context(|| format!("Could not read line {}", line + 1))?;
        if text.starts_with('%') || text.trim().is_empty() {
            continue;
        }
        let mut fields = text.split_whitespace();
        let mut vertex = || -> Result<i64> {
            fields
                .next()
                .with_context(|| format!("Missing vertex at line {}", line + 1))?
                .parse::<i64>()
                .with_context(|| format!("Malformed vertex at line {}", line + 1))
        };
        src.push(vertex()?);
        dst.push(vertex()?);
        if let Some(weight) = fields.next() {
            weight
                .parse::<f64>()
                .with_context(|| format!("Malformed weight at line {}", line + 1))?;
        }
        ensure!(
            fields.next().is_none(),
            "Trailing fields at line {}",
            line + 1
        );
    }
    ensure!(
        src.len() == entries,
        "The file declares {} entries but provides {}",
        entries,
        src.len()
    );

    Ok((
        DistVec::from_vec(src, num_locales),
        DistVec::from_vec(dst, num_locales),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<(DistVec<i64>, DistVec<i64>)> {
        parse_matrix_market(text.as_bytes(), 2)
    }

    #[test]
    fn test_unweighted() {
        let (src, dst) = parse(
            "%%MatrixMarket matrix coordinate pattern general\n\
             % a comment\n\
             3 3 2\n\
             1 2\n\
             2 3\n",
        )
        .unwrap();
        assert_eq!(src.to_vec(), vec![1, 2]);
        assert_eq!(dst.to_vec(), vec![2, 3]);
    }

    #[test]
    fn test_weighted() {
        let (src, dst) = parse("2 2 1\n1 2 0.5\n").unwrap();
        assert_eq!(src.to_vec(), vec![1]);
        assert_eq!(dst.to_vec(), vec![2]);
    }

    #[test]
    fn test_malformed() {
        assert!(parse("").is_err());
        assert!(parse("% only comments\n").is_err());
        assert!(parse("3 3\n").is_err());
        assert!(parse("x y z\n").is_err());
        assert!(parse("2 2 2\n1 2\n").is_err());
        assert!(parse("2 2 1\n1\n").is_err());
        assert!(parse("2 2 1\n1 2 0.5 9\n").is_err());
    }
}
