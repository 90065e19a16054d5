// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gauss-Jordan elimination with partial pivoting. The solver takes ownership
// of the coefficient matrix and right-hand side, augments them, and reduces
// in place — callers never alias the working storage.

use cardlens_core::error::{CardlensError, Result};

/// Pivot magnitudes below this are treated as singular.
const PIVOT_EPSILON: f64 = 1e-9;

/// Solve `A·x = b` for square `A` by Gauss-Jordan elimination.
///
/// For each pivot column the row with the largest absolute value in that
/// column is swapped into place (partial pivoting). A pivot below `1e-9`
/// means the system is singular or near-singular and yields
/// [`CardlensError::SingularSystem`].
pub fn solve(matrix: Vec<Vec<f64>>, rhs: Vec<f64>) -> Result<Vec<f64>> {
    let n = matrix.len();
    if n == 0 || rhs.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(CardlensError::InvalidInput(format!(
            "expected a square {n}×{n} system with a matching result vector"
        )));
    }

    // Augment: each row carries its right-hand-side value as column n.
    let mut rows: Vec<Vec<f64>> = matrix
        .into_iter()
        .zip(rhs)
        .map(|(mut row, b)| {
            row.push(b);
            row
        })
        .collect();

    for col in 0..n {
        // Partial pivoting: bring the largest-magnitude entry of this column
        // (at or below the diagonal) onto the diagonal.
        let pivot_row = (col..n)
            .max_by(|&a, &b| {
                rows[a][col]
                    .abs()
                    .partial_cmp(&rows[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        rows.swap(col, pivot_row);

        let pivot = rows[col][col];
        if pivot.abs() < PIVOT_EPSILON {
            return Err(CardlensError::SingularSystem);
        }

        // Normalize the pivot row.
        for value in rows[col].iter_mut() {
            *value /= pivot;
        }

        // Eliminate the pivot column from every other row.
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = rows[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..=n {
                let pivot_value = rows[col][k];
                rows[row][k] -= factor * pivot_value;
            }
        }
    }

    Ok(rows.into_iter().map(|row| row[n]).collect())
}
