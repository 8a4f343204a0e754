use crate::core::validate_step;
use crate::error::{SearchError, SearchResult};
use rand::Rng;

/// `d + 1` vertices in `d` dimensions
#[derive(Clone, Debug, PartialEq)]
pub struct Simplex {
    vertices: Vec<Vec<f64>>,
}

impl Simplex {
    /// Build a simplex, rejecting anything that is not `(d + 1) x d`.
    pub fn new(vertices: Vec<Vec<f64>>) -> SearchResult<Self> {
        let rows = vertices.len();
        let cols = vertices.first().map_or(0, Vec::len);

        if cols == 0 || rows != cols + 1 {
            return Err(SearchError::SimplexShape { rows, cols });
        }
        if let Some(row) = vertices.iter().find(|row| row.len() != cols) {
            return Err(SearchError::DimensionMismatch {
                expected: cols,
                found: row.len(),
            });
        }
        if vertices.iter().flatten().any(|v| !v.is_finite()) {
            return Err(SearchError::InvalidConfig(
                "simplex vertices must be finite".into(),
            ));
        }

        Ok(Self { vertices })
    }

    pub fn dimension(&self) -> usize {
        self.vertices.len() - 1
    }

    pub fn vertices(&self) -> &[Vec<f64>] {
        &self.vertices
    }
}

/// Column mean of all vertices except `index` (usually the worst one).
pub fn centroid_without(vertices: &[Vec<f64>], index: usize) -> Vec<f64> {
    let dim = vertices.first().map_or(0, Vec::len);
    let mut centroid = vec![0.0; dim];
    let mut count = 0usize;

    for (_, vertex) in vertices.iter().enumerate().filter(|(i, _)| *i != index) {
        for (c, v) in centroid.iter_mut().zip(vertex) {
            *c += v;
        }
        count += 1;
    }

    if count > 0 {
        for c in centroid.iter_mut() {
            *c /= count as f64;
        }
    }
    centroid
}

/// Move every vertex toward `vertices[best]` by `sigma`; the best vertex stays put.
pub fn shrink_towards(vertices: &[Vec<f64>], best: usize, sigma: f64) -> Vec<Vec<f64>> {
    let anchor = &vertices[best];
    vertices
        .iter()
        .map(|row| {
            anchor
                .iter()
                .zip(row)
                .map(|(b, x)| b + sigma * (x - b))
                .collect()
        })
        .collect()
}

/// Affine combination `a * x + b * y`, used for reflection/expansion/contraction.
pub fn combine(a: f64, x: &[f64], b: f64, y: &[f64]) -> Vec<f64> {
    x.iter().zip(y).map(|(xi, yi)| a * xi + b * yi).collect()
}

/// Sample standard deviation with `n - 1` degrees of freedom.
///
/// Any infinite value makes the result NaN, which callers read as "not
/// converged".
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

/// Constructors for starting simplices
#[derive(Debug, Clone, Copy)]
pub struct InitialSimplex {
    parameters_to_optimize: usize,
}

impl InitialSimplex {
    const USUAL_DELTA: f64 = 0.05;
    const ZERO_TERM_DELTA: f64 = 0.00025;

    pub fn new(parameters_to_optimize: usize) -> Self {
        Self {
            parameters_to_optimize,
        }
    }

    /// Axis-aligned simplex around `start`: vertex `i` scales coordinate `i`
    /// by 5 %, or sets it to 0.00025 if it is zero.
    pub fn gao_han(&self, start: &[f64]) -> SearchResult<Simplex> {
        if start.len() != self.parameters_to_optimize {
            return Err(SearchError::DimensionMismatch {
                expected: self.parameters_to_optimize,
                found: start.len(),
            });
        }

        let mut vertices = Vec::with_capacity(start.len() + 1);
        vertices.push(start.to_vec());
        for i in 0..start.len() {
            let mut vertex = start.to_vec();
            vertex[i] = if vertex[i] != 0.0 {
                (1.0 + Self::USUAL_DELTA) * vertex[i]
            } else {
                Self::ZERO_TERM_DELTA
            };
            vertices.push(vertex);
        }

        Simplex::new(vertices)
    }

    /// Random simplex: theta ~ U(0, max_theta), Lyapunov exponents ~ U(1, max_l).
    pub fn uniform_dist<R: Rng + ?Sized>(
        &self,
        max_theta: f64,
        max_l: f64,
        rng: &mut R,
    ) -> SearchResult<Simplex> {
        validate_step("max_theta", max_theta)?;
        if self.parameters_to_optimize > 1 && !(max_l.is_finite() && max_l > 1.0) {
            return Err(SearchError::InvalidStep {
                name: "max_l",
                value: max_l,
                reason: "Lyapunov exponents are drawn from (1, max_l), so max_l must exceed 1",
            });
        }

        let n = self.parameters_to_optimize;
        let vertices = (0..=n)
            .map(|_| {
                let mut row = Vec::with_capacity(n);
                row.push(rng.gen_range(0.0..max_theta));
                for _ in 1..n {
                    row.push(rng.gen_range(1.0..max_l));
                }
                row
            })
            .collect();

        Simplex::new(vertices)
    }
}
