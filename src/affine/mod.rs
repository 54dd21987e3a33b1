mod simplex;

use num_rational::BigRational;
use num_traits::Zero;
use thiserror::Error;

use simplex::LpOutcome;

/// A rational affine subspace `{x : A x = y}`, together with the feasibility
/// tests the Boshernitzan criterion needs against the non-negative orthant.
///
/// The reference library answers these via an external polyhedral library;
/// none of the crates available here bind one, so feasibility is decided
/// directly over [`BigRational`] with a small exact simplex engine.
pub struct RationalAffineSubspace {
    equations: Vec<Vec<BigRational>>,
    y: Vec<BigRational>,
    dim: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AffineSubspaceError {
    #[error("hasNonZeroNonNegativeVector is only defined for a homogeneous system")]
    InhomogeneousSystem,
}

impl RationalAffineSubspace {
    /// `{x : equations * x = y}`. Every row of `equations` must have the same
    /// number of columns, matching `y`'s length in row count.
    pub fn new(equations: Vec<Vec<BigRational>>, y: Vec<BigRational>) -> Self {
        assert_eq!(equations.len(), y.len(), "one right-hand side value per equation");
        let dim = equations.first().map(|row| row.len()).unwrap_or(0);
        for row in &equations {
            assert_eq!(row.len(), dim, "every equation must have the same number of variables");
        }
        RationalAffineSubspace { equations, y, dim }
    }

    /// `{x : equations * x = 0}`, the linear subspace through the origin.
    pub fn from_generators(equations: Vec<Vec<BigRational>>) -> Self {
        let dim = equations.first().map(|row| row.len()).unwrap_or(0);
        let y = vec![BigRational::zero(); equations.len()];
        RationalAffineSubspace::new(equations, y)
    }

    /// Whether the subspace contains a non-zero vector with every coordinate
    /// `>= 0`. Only defined when the subspace passes through the origin.
    pub fn has_non_zero_non_negative_vector(&self) -> Result<bool, AffineSubspaceError> {
        if self.y.iter().any(|v| !v.is_zero()) {
            return Err(AffineSubspaceError::InhomogeneousSystem);
        }
        if self.dim == 0 {
            return Ok(false);
        }
        let costs = vec![BigRational::from_integer(1.into()); self.dim];
        Ok(matches!(simplex::maximize(&self.equations, &self.y, &costs), LpOutcome::Unbounded))
    }

    /// Whether the subspace contains a vector with every coordinate `> 0`.
    pub fn has_positive_vector(&self) -> bool {
        if self.dim == 0 {
            return self.y.iter().all(|v| v.is_zero());
        }
        let mut augmented = Vec::with_capacity(self.equations.len());
        for row in &self.equations {
            let mut widened = row.clone();
            let row_sum: BigRational = row.iter().cloned().sum();
            widened.push(row_sum);
            augmented.push(widened);
        }
        let mut costs = vec![BigRational::zero(); self.dim];
        costs.push(BigRational::from_integer(1.into()));
        match simplex::maximize(&augmented, &self.y, &costs) {
            LpOutcome::Infeasible => false,
            LpOutcome::Unbounded => true,
            LpOutcome::Optimal(value) => value > BigRational::zero(),
        }
    }

    /// Whether the subspace contains a vector with every coordinate `>= 0`.
    pub fn has_non_negative_vector(&self) -> bool {
        if self.dim == 0 {
            return self.y.iter().all(|v| v.is_zero());
        }
        simplex::feasible(&self.equations, &self.y, self.dim)
    }

    /// Swaps the roles of variables `i` and `j` in every equation.
    pub fn swap(&mut self, i: usize, j: usize) {
        for row in &mut self.equations {
            row.swap(i, j);
        }
    }

    /// Replaces equation `i` with `equation[i] + c * equation[j]`.
    pub fn elementary_transformation(&mut self, i: usize, j: usize, c: &BigRational) {
        let addition: Vec<BigRational> = self.equations[j].iter().map(|v| v * c).collect();
        for (dst, add) in self.equations[i].iter_mut().zip(addition) {
            *dst += add;
        }
        self.y[i] = &self.y[i] + c * &self.y[j];
    }
}
