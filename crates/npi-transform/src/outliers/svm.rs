//! One-class SVM with an RBF kernel, trained by sequential minimal
//! optimization.
//!
//! Solves `min 1/2 a'Qa` subject to `0 <= a_i <= 1`, `sum a = nu * l`, with
//! the libsvm second-order working set selection. Kernel rows are computed
//! on demand so memory stays linear in the group size.

use tracing::warn;

/// Floor for a non-positive curvature along the working pair.
const TAU: f64 = 1e-12;
/// Upper bound of every multiplier.
const UPPER: f64 = 1.0;

struct Problem<'a> {
    values: &'a [f64],
    gamma: f64,
}

impl Problem<'_> {
    fn kernel(&self, i: usize, j: usize) -> f64 {
        let diff = self.values[i] - self.values[j];
        (-self.gamma * diff * diff).exp()
    }

    fn row(&self, i: usize) -> Vec<f64> {
        (0..self.values.len()).map(|j| self.kernel(i, j)).collect()
    }
}

/// Solution of the dual problem.
struct Solution {
    /// Gradient `Qa`, which is also the kernel expansion at each training point.
    gradient: Vec<f64>,
    rho: f64,
}

fn solve(problem: &Problem<'_>, nu: f64, tolerance: f64) -> Solution {
    let l = problem.values.len();
    let total = nu * l as f64;

    // Feasible start: the first floor(nu * l) multipliers at the bound.
    let mut alpha = vec![0.0; l];
    let full = (total.floor() as usize).min(l);
    alpha[..full].fill(UPPER);
    if full < l {
        alpha[full] = total - full as f64;
    }

    let mut gradient = vec![0.0; l];
    for (i, a) in alpha.iter().enumerate() {
        if *a > 0.0 {
            for (g, q) in gradient.iter_mut().zip(problem.row(i)) {
                *g += a * q;
            }
        }
    }

    let max_iterations = (100 * l).max(100_000);
    let mut iterations = 0;
    while iterations < max_iterations {
        let Some((i, j)) = select_working_set(problem, &alpha, &gradient, tolerance) else {
            break;
        };
        iterations += 1;

        let q_i = problem.row(i);
        let q_j = problem.row(j);
        let old_i = alpha[i];
        let old_j = alpha[j];

        let curvature = (2.0 - 2.0 * q_i[j]).max(TAU);
        let delta = (gradient[i] - gradient[j]) / curvature;
        let sum = old_i + old_j;
        let mut new_i = old_i - delta;
        let mut new_j = old_j + delta;

        if sum > UPPER {
            if new_i > UPPER {
                new_i = UPPER;
                new_j = sum - UPPER;
            }
        } else if new_j < 0.0 {
            new_j = 0.0;
            new_i = sum;
        }
        if sum > UPPER {
            if new_j > UPPER {
                new_j = UPPER;
                new_i = sum - UPPER;
            }
        } else if new_i < 0.0 {
            new_i = 0.0;
            new_j = sum;
        }

        alpha[i] = new_i;
        alpha[j] = new_j;
        let delta_i = new_i - old_i;
        let delta_j = new_j - old_j;
        for (k, g) in gradient.iter_mut().enumerate() {
            *g += q_i[k] * delta_i + q_j[k] * delta_j;
        }
    }
    if iterations >= max_iterations {
        warn!(iterations, "one-class SVM reached the iteration limit");
    }

    let rho = compute_rho(&alpha, &gradient);
    Solution { gradient, rho }
}

/// Maximal violating pair with second-order choice of `j`; `None` once the
/// optimality gap is below `tolerance`.
fn select_working_set(
    problem: &Problem<'_>,
    alpha: &[f64],
    gradient: &[f64],
    tolerance: f64,
) -> Option<(usize, usize)> {
    let mut g_max = f64::NEG_INFINITY;
    let mut i_best = None;
    for (t, (a, g)) in alpha.iter().zip(gradient).enumerate() {
        if *a < UPPER && -g >= g_max {
            g_max = -g;
            i_best = Some(t);
        }
    }
    let i = i_best?;

    let q_i = problem.row(i);
    let mut g_max2 = f64::NEG_INFINITY;
    let mut j_best = None;
    let mut best_objective = f64::INFINITY;
    for (t, (a, g)) in alpha.iter().zip(gradient).enumerate() {
        if *a <= 0.0 {
            continue;
        }
        g_max2 = g_max2.max(*g);
        let grad_diff = g_max + g;
        if grad_diff > 0.0 {
            let curvature = (2.0 - 2.0 * q_i[t]).max(TAU);
            let objective = -(grad_diff * grad_diff) / curvature;
            if objective <= best_objective {
                best_objective = objective;
                j_best = Some(t);
            }
        }
    }

    if g_max + g_max2 < tolerance {
        return None;
    }
    j_best.map(|j| (i, j))
}

/// Offset of the decision function: mean gradient over free multipliers,
/// or the midpoint of the bound-derived interval when none is free.
fn compute_rho(alpha: &[f64], gradient: &[f64]) -> f64 {
    let mut upper_bound = f64::INFINITY;
    let mut lower_bound = f64::NEG_INFINITY;
    let mut free_sum = 0.0;
    let mut free_count = 0usize;

    for (a, g) in alpha.iter().zip(gradient) {
        if *a >= UPPER {
            lower_bound = lower_bound.max(*g);
        } else if *a <= 0.0 {
            upper_bound = upper_bound.min(*g);
        } else {
            free_sum += g;
            free_count += 1;
        }
    }

    if free_count > 0 {
        free_sum / free_count as f64
    } else {
        (upper_bound + lower_bound) / 2.0
    }
}

/// Flag values whose decision value `sum a_i K(x_i, x) - rho` is not positive.
pub fn one_class_svm_outliers(values: &[f64], nu: f64, gamma: f64, tolerance: f64) -> Vec<bool> {
    if values.is_empty() {
        return Vec::new();
    }
    let problem = Problem { values, gamma };
    let Solution { gradient, rho } = solve(&problem, nu, tolerance);
    gradient.iter().map(|g| g - rho <= 0.0).collect()
}
