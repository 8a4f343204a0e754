use crate::error::{SearchError, SearchResult};

/// Two coordinates closer than this are considered equal.
pub const EPSILON: f64 = 1e-9;

pub fn is_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Validate a per-dimension interval list
///
/// Every interval must be finite with `lo < hi`. An empty list is rejected
/// as well since there is nothing to search.
pub fn validate_bounds(bounds: &[(f64, f64)]) -> SearchResult<()> {
    if bounds.is_empty() {
        return Err(SearchError::EmptyStart);
    }

    for (dim, &(lo, hi)) in bounds.iter().enumerate() {
        if !lo.is_finite() || !hi.is_finite() {
            return Err(SearchError::InvalidBounds {
                dim,
                lo,
                hi,
                reason: "interval ends must be finite",
            });
        }
        if lo >= hi {
            return Err(SearchError::InvalidBounds {
                dim,
                lo,
                hi,
                reason: "lower bound must be below upper bound",
            });
        }
    }

    Ok(())
}

/// Step sizes, tolerances and radii must be finite and strictly positive.
pub fn validate_step(name: &'static str, value: f64) -> SearchResult<()> {
    if !value.is_finite() {
        return Err(SearchError::InvalidStep {
            name,
            value,
            reason: "must be finite",
        });
    }
    if value <= 0.0 {
        return Err(SearchError::InvalidStep {
            name,
            value,
            reason: "must be positive",
        });
    }
    Ok(())
}

/// A starting point needs at least one coordinate and only finite entries.
pub fn validate_start(start: &[f64]) -> SearchResult<()> {
    if start.is_empty() {
        return Err(SearchError::EmptyStart);
    }
    if let Some(&bad) = start.iter().find(|v| !v.is_finite()) {
        return Err(SearchError::InvalidStep {
            name: "start",
            value: bad,
            reason: "starting coordinates must be finite",
        });
    }
    Ok(())
}

/// Dimensions whose coordinate sits on either end of its interval
pub fn boundary_hits(params: &[f64], bounds: &[(f64, f64)]) -> Vec<usize> {
    params
        .iter()
        .zip(bounds)
        .enumerate()
        .filter(|(_, (x, (lo, hi)))| is_equal(**x, *lo) || is_equal(**x, *hi))
        .map(|(dim, _)| dim)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_interval_is_rejected() {
        let err = validate_bounds(&[(0.1, 4.0), (2.0, 1.0)]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidBounds { dim: 1, .. }));
    }

    #[test]
    fn degenerate_interval_is_rejected() {
        assert!(validate_bounds(&[(1.0, 1.0)]).is_err());
    }

    #[test]
    fn non_positive_step_is_rejected() {
        assert!(validate_step("delta", 0.0).is_err());
        assert!(validate_step("delta", -0.5).is_err());
        assert!(validate_step("delta", f64::NAN).is_err());
        assert!(validate_step("delta", 0.1).is_ok());
    }

    #[test]
    fn boundary_hits_reports_both_ends() {
        let bounds = [(0.0, 5.0), (1.0, 2.0), (0.0, 1.0)];
        let hits = boundary_hits(&[0.0, 1.5, 1.0 - 1e-12], &bounds);
        assert_eq!(hits, vec![0, 2]);
    }
}
