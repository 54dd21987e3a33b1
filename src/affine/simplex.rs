use num_rational::BigRational;
use num_traits::{One, Zero};

/// Outcome of maximizing a linear objective over `{x >= 0 : Ax = b}`.
pub(crate) enum LpOutcome {
    Infeasible,
    Unbounded,
    Optimal(BigRational),
}

/// Dense simplex tableau. Columns `0..n_real` are the caller's variables,
/// eligible to enter the basis; columns `n_real..n` are phase-one artificials,
/// which are only ever pivoted out, never back in.
struct Tableau {
    rows: Vec<Vec<BigRational>>,
    objective: Vec<BigRational>,
    basis: Vec<usize>,
    n: usize,
    n_real: usize,
}

impl Tableau {
    fn pivot(&mut self, row: usize, col: usize) {
        let pivot_val = self.rows[row][col].clone();
        for x in self.rows[row].iter_mut() {
            *x /= pivot_val.clone();
        }
        for r in 0..self.rows.len() {
            if r == row {
                continue;
            }
            let factor = self.rows[r][col].clone();
            if !factor.is_zero() {
                for c in 0..=self.n {
                    let term = factor.clone() * self.rows[row][c].clone();
                    self.rows[r][c] -= term;
                }
            }
        }
        let factor = self.objective[col].clone();
        if !factor.is_zero() {
            for c in 0..=self.n {
                let term = factor.clone() * self.rows[row][c].clone();
                self.objective[c] -= term;
            }
        }
        self.basis[row] = col;
    }

    /// Runs simplex pivots with Bland's rule until optimal or unbounded.
    /// Returns `true` on reaching an optimum, `false` if unbounded.
    fn run(&mut self) -> bool {
        loop {
            let entering = (0..self.n_real).find(|&c| self.objective[c] > BigRational::zero());
            let entering = match entering {
                Some(c) => c,
                None => return true,
            };

            let mut leaving: Option<usize> = None;
            let mut best_ratio: Option<BigRational> = None;
            for r in 0..self.rows.len() {
                let a_rc = &self.rows[r][entering];
                if *a_rc > BigRational::zero() {
                    let ratio = self.rows[r][self.n].clone() / a_rc.clone();
                    let better = match &best_ratio {
                        None => true,
                        Some(best) => {
                            ratio < *best || (ratio == *best && self.basis[r] < self.basis[leaving.unwrap()])
                        }
                    };
                    if better {
                        best_ratio = Some(ratio);
                        leaving = Some(r);
                    }
                }
            }

            match leaving {
                None => return false,
                Some(r) => self.pivot(r, entering),
            }
        }
    }

    fn objective_value(&self) -> BigRational {
        -self.objective[self.n].clone()
    }
}

/// Builds the phase-one tableau for `Ax = b, x >= 0` with one artificial
/// variable per row, and drives the artificials to zero.
fn phase_one(a: &[Vec<BigRational>], b: &[BigRational], n_real: usize) -> Option<Tableau> {
    let m = a.len();
    let n = n_real + m;
    let mut rows = Vec::with_capacity(m);
    let mut basis = Vec::with_capacity(m);

    for i in 0..m {
        let mut row = vec![BigRational::zero(); n + 1];
        let negate = b[i] < BigRational::zero();
        let sign = if negate { -BigRational::one() } else { BigRational::one() };
        for j in 0..n_real {
            row[j] = &sign * &a[i][j];
        }
        row[n_real + i] = BigRational::one();
        row[n] = &sign * &b[i];
        rows.push(row);
        basis.push(n_real + i);
    }

    let mut objective = vec![BigRational::zero(); n + 1];
    for j in 0..n {
        let c_j = if j >= n_real { -BigRational::one() } else { BigRational::zero() };
        let z_j: BigRational = (0..m).map(|i| -BigRational::one() * &rows[i][j]).sum();
        objective[j] = &c_j - &z_j;
    }
    let z_rhs: BigRational = (0..m).map(|i| -BigRational::one() * &rows[i][n]).sum();
    objective[n] = -z_rhs;

    let mut tableau = Tableau { rows, objective, basis, n, n_real };
    tableau.run();

    for i in 0..m {
        if tableau.basis[i] >= n_real && !tableau.rows[i][n].is_zero() {
            return None;
        }
    }
    Some(tableau)
}

/// Maximizes `sum(real_costs[j] * x[j])` over `{x >= 0 : a x = b}`, restricting
/// entry to the first `real_costs.len()` columns (the artificials introduced
/// to find a starting basic feasible solution are never re-entered).
pub(crate) fn maximize(a: &[Vec<BigRational>], b: &[BigRational], real_costs: &[BigRational]) -> LpOutcome {
    let n_real = real_costs.len();
    let mut tableau = match phase_one(a, b, n_real) {
        None => return LpOutcome::Infeasible,
        Some(t) => t,
    };

    for j in 0..n_real {
        let c_j = real_costs[j].clone();
        let z_j: BigRational = (0..tableau.rows.len())
            .map(|i| {
                let basis_cost = if tableau.basis[i] < n_real {
                    real_costs[tableau.basis[i]].clone()
                } else {
                    BigRational::zero()
                };
                basis_cost * &tableau.rows[i][j]
            })
            .sum();
        tableau.objective[j] = &c_j - &z_j;
    }
    for j in n_real..tableau.n {
        tableau.objective[j] = BigRational::zero();
    }
    let z_rhs: BigRational = (0..tableau.rows.len())
        .map(|i| {
            let basis_cost = if tableau.basis[i] < n_real {
                real_costs[tableau.basis[i]].clone()
            } else {
                BigRational::zero()
            };
            basis_cost * &tableau.rows[i][tableau.n]
        })
        .sum();
    tableau.objective[tableau.n] = -z_rhs;

    if tableau.run() {
        LpOutcome::Optimal(tableau.objective_value())
    } else {
        LpOutcome::Unbounded
    }
}

/// Plain feasibility of `{x >= 0 : a x = b}`, without optimizing anything.
pub(crate) fn feasible(a: &[Vec<BigRational>], b: &[BigRational], n_real: usize) -> bool {
    phase_one(a, b, n_real).is_some()
}
