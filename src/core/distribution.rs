use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// Binned 1-D distribution with per-bin statistical errors.
///
/// Bin edges are strictly increasing and shared operations (`add`, `divide`)
/// require identical binning on both operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    edges: Vec<f64>,
    contents: Vec<f64>,
    errors: Vec<f64>,
}

impl Distribution {
    pub fn new(edges: Vec<f64>, contents: Vec<f64>, errors: Vec<f64>) -> PlotResult<Self> {
        if edges.len() < 2 {
            return Err(PlotError::InvalidData(
                "distribution needs at least one bin".to_owned(),
            ));
        }
        if contents.len() + 1 != edges.len() || errors.len() != contents.len() {
            return Err(PlotError::InvalidData(format!(
                "inconsistent bin counts: {} edges, {} contents, {} errors",
                edges.len(),
                contents.len(),
                errors.len()
            )));
        }
        if edges.iter().any(|edge| !edge.is_finite()) {
            return Err(PlotError::InvalidData(
                "bin edges must be finite".to_owned(),
            ));
        }
        if edges.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(PlotError::InvalidData(
                "bin edges must be strictly increasing".to_owned(),
            ));
        }
        if contents.iter().any(|value| !value.is_finite()) {
            return Err(PlotError::InvalidData(
                "bin contents must be finite".to_owned(),
            ));
        }
        if errors.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(PlotError::InvalidData(
                "bin errors must be finite and >= 0".to_owned(),
            ));
        }
        Ok(Self {
            edges,
            contents,
            errors,
        })
    }

    /// Builds a distribution over `n_bins` equal-width bins spanning `[lo, hi]`.
    ///
    /// Errors default to zero for each bin.
    pub fn with_uniform_bins(n_bins: usize, lo: f64, hi: f64, contents: Vec<f64>) -> PlotResult<Self> {
        if n_bins == 0 || contents.len() != n_bins {
            return Err(PlotError::InvalidData(format!(
                "expected {n_bins} bin contents, got {}",
                contents.len()
            )));
        }
        if !lo.is_finite() || !hi.is_finite() || hi <= lo {
            return Err(PlotError::InvalidData(
                "bin range must be finite and non-empty".to_owned(),
            ));
        }
        let width = (hi - lo) / n_bins as f64;
        let edges = (0..=n_bins)
            .map(|i| if i == n_bins { hi } else { lo + i as f64 * width })
            .collect();
        let errors = vec![0.0; n_bins];
        Self::new(edges, contents, errors)
    }

    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.contents.len()
    }

    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    #[must_use]
    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    #[must_use]
    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    #[must_use]
    pub fn x_min(&self) -> f64 {
        self.edges[0]
    }

    #[must_use]
    pub fn x_max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    pub fn bin_width(&self, bin: usize) -> PlotResult<f64> {
        self.check_bin(bin)?;
        Ok(self.edges[bin + 1] - self.edges[bin])
    }

    pub fn bin_content(&self, bin: usize) -> PlotResult<f64> {
        self.check_bin(bin)?;
        Ok(self.contents[bin])
    }

    pub fn bin_error(&self, bin: usize) -> PlotResult<f64> {
        self.check_bin(bin)?;
        Ok(self.errors[bin])
    }

    pub fn set_bin_content(&mut self, bin: usize, value: f64) -> PlotResult<()> {
        self.check_bin(bin)?;
        if !value.is_finite() {
            return Err(PlotError::InvalidData(
                "bin content must be finite".to_owned(),
            ));
        }
        self.contents[bin] = value;
        Ok(())
    }

    pub fn set_bin_error(&mut self, bin: usize, value: f64) -> PlotResult<()> {
        self.check_bin(bin)?;
        if !value.is_finite() || value < 0.0 {
            return Err(PlotError::InvalidData(
                "bin error must be finite and >= 0".to_owned(),
            ));
        }
        self.errors[bin] = value;
        Ok(())
    }

    /// Zeroes every per-bin error, turning the distribution into an exact
    /// reference for ratio building.
    pub fn clear_errors(&mut self) {
        self.errors.fill(0.0);
    }

    #[must_use]
    pub fn min_content(&self) -> f64 {
        self.contents
            .iter()
            .copied()
            .min_by_key(|value| OrderedFloat(*value))
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn max_content(&self) -> f64 {
        self.contents
            .iter()
            .copied()
            .max_by_key(|value| OrderedFloat(*value))
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Bin-wise sum. Errors combine in quadrature.
    pub fn add(&mut self, other: &Self) -> PlotResult<()> {
        self.check_same_binning(other)?;
        for bin in 0..self.contents.len() {
            self.contents[bin] += other.contents[bin];
            self.errors[bin] = self.errors[bin].hypot(other.errors[bin]);
        }
        Ok(())
    }

    /// Bin-wise ratio with standard error propagation.
    ///
    /// Bins with a zero denominator yield content 0 and error 0.
    pub fn divide(&mut self, denominator: &Self) -> PlotResult<()> {
        self.check_same_binning(denominator)?;
        for bin in 0..self.contents.len() {
            let a = self.contents[bin];
            let b = denominator.contents[bin];
            if b == 0.0 {
                self.contents[bin] = 0.0;
                self.errors[bin] = 0.0;
                continue;
            }
            let ea = self.errors[bin];
            let eb = denominator.errors[bin];
            self.contents[bin] = a / b;
            self.errors[bin] = ((ea * b).hypot(eb * a)) / (b * b);
        }
        Ok(())
    }

    /// Divides each bin content and error by its own bin width.
    pub fn divide_by_bin_width(&mut self) {
        for bin in 0..self.contents.len() {
            let width = self.edges[bin + 1] - self.edges[bin];
            self.contents[bin] /= width;
            self.errors[bin] /= width;
        }
    }

    fn check_bin(&self, bin: usize) -> PlotResult<()> {
        if bin >= self.contents.len() {
            return Err(PlotError::InvalidData(format!(
                "bin index {bin} out of range for {} bins",
                self.contents.len()
            )));
        }
        Ok(())
    }

    fn check_same_binning(&self, other: &Self) -> PlotResult<()> {
        if self.edges.len() != other.edges.len() {
            return Err(PlotError::InvalidData(format!(
                "bin count mismatch: {} vs {}",
                self.n_bins(),
                other.n_bins()
            )));
        }
        let span = self.x_max() - self.x_min();
        let tolerance = span.abs() * 1e-9;
        for (own, theirs) in self.edges.iter().zip(&other.edges) {
            if (own - theirs).abs() > tolerance {
                return Err(PlotError::InvalidData(
                    "bin edges do not match".to_owned(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Distribution;

    fn sample() -> Distribution {
        Distribution::new(
            vec![0.0, 1.0, 2.0, 4.0],
            vec![2.0, 6.0, 4.0],
            vec![1.0, 2.0, 1.0],
        )
        .expect("valid distribution")
    }

    #[test]
    fn rejects_non_monotonic_edges() {
        let result = Distribution::new(vec![0.0, 2.0, 1.0], vec![1.0, 1.0], vec![0.0, 0.0]);
        assert!(result.is_err());
    }

    #[test]
    fn add_combines_errors_in_quadrature() {
        let mut lhs = sample();
        let rhs = sample();
        lhs.add(&rhs).expect("same binning");
        assert_eq!(lhs.contents(), &[4.0, 12.0, 8.0]);
        assert!((lhs.errors()[0] - 2.0_f64.sqrt()).abs() <= 1e-12);
    }

    #[test]
    fn divide_by_zero_denominator_bins_yields_zero() {
        let mut numerator = sample();
        let denominator = Distribution::new(
            vec![0.0, 1.0, 2.0, 4.0],
            vec![2.0, 0.0, 4.0],
            vec![0.0, 0.0, 0.0],
        )
        .expect("valid denominator");
        numerator.divide(&denominator).expect("same binning");
        assert_eq!(numerator.contents(), &[1.0, 0.0, 1.0]);
        assert_eq!(numerator.errors()[1], 0.0);
    }

    #[test]
    fn self_ratio_is_unity() {
        let mut dist = sample();
        let mut denominator = dist.clone();
        denominator.clear_errors();
        dist.divide(&denominator).expect("same binning");
        assert_eq!(dist.contents(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn width_division_is_recoverable() {
        let mut dist = sample();
        let original = dist.clone();
        dist.divide_by_bin_width();
        for bin in 0..dist.n_bins() {
            let width = dist.bin_width(bin).expect("bin in range");
            let rate = dist.bin_content(bin).expect("bin in range") * width;
            let expected = original.bin_content(bin).expect("bin in range");
            assert!((rate - expected).abs() <= 1e-12);
        }
    }

    #[test]
    fn uniform_bins_cover_exact_range() {
        let dist = Distribution::with_uniform_bins(4, 0.0, 2.0, vec![1.0; 4]).expect("valid");
        assert_eq!(dist.x_min(), 0.0);
        assert_eq!(dist.x_max(), 2.0);
        assert!((dist.bin_width(1).expect("bin in range") - 0.5).abs() <= 1e-12);
    }
}
