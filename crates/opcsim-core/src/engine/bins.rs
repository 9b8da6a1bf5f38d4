use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative slack allowed when checking that adjacent bins share an edge.
const EDGE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum BinError {
    #[error("A bin table needs at least one bin")]
    Empty,

    #[error("Bin span must satisfy 0 < dmin < dmax, got ({0}, {1})")]
    InvalidSpan(f64, f64),

    #[error("Bin {index} is not strictly increasing (lower < midpoint < upper)")]
    NotIncreasing { index: usize },

    #[error("Bin {index} and its successor do not share an edge (gap or overlap)")]
    Discontiguous { index: usize },
}

/// One instrument size bin: left edge, midpoint, and right edge in µm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub lower: f64,
    pub midpoint: f64,
    pub upper: f64,
}

impl Bin {
    /// Build a bin from its edges with the midpoint placed at the log-mean
    /// (geometric mean), the convention for log-spaced instrument bins.
    pub fn from_edges(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            midpoint: (lower * upper).sqrt(),
            upper,
        }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// An OPC's ordered bin table: strictly increasing, contiguous bins with no
/// gaps or overlaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinTable {
    bins: Vec<Bin>,
}

impl BinTable {
    /// Generate `n_bins` bins spaced log-uniformly between `dmin` and
    /// `dmax`.
    pub fn from_bounds(dmin: f64, dmax: f64, n_bins: usize) -> Result<Self, BinError> {
        if n_bins == 0 {
            return Err(BinError::Empty);
        }
        if !(dmin > 0.0 && dmin < dmax) {
            return Err(BinError::InvalidSpan(dmin, dmax));
        }

        let step = (dmax.log10() - dmin.log10()) / n_bins as f64;
        let bins = (0..n_bins)
            .map(|i| {
                let lower = 10f64.powf(dmin.log10() + step * i as f64);
                let upper = 10f64.powf(dmin.log10() + step * (i + 1) as f64);
                Bin::from_edges(lower, upper)
            })
            .collect();

        Self::from_bins(bins)
    }

    /// Build a table from a flat, increasing list of bin edges; midpoints
    /// are placed at the log-mean of each pair.
    pub fn from_edges(edges: &[f64]) -> Result<Self, BinError> {
        if edges.len() < 2 {
            return Err(BinError::Empty);
        }

        let bins = edges
            .windows(2)
            .map(|w| Bin::from_edges(w[0], w[1]))
            .collect();

        Self::from_bins(bins)
    }

    /// Build a table from explicit (lower, midpoint, upper) triples,
    /// enforcing the ordering and contiguity invariants.
    pub fn from_bins(bins: Vec<Bin>) -> Result<Self, BinError> {
        if bins.is_empty() {
            return Err(BinError::Empty);
        }

        for (index, bin) in bins.iter().enumerate() {
            if !(bin.lower > 0.0 && bin.lower < bin.midpoint && bin.midpoint < bin.upper) {
                return Err(BinError::NotIncreasing { index });
            }
        }

        for (index, pair) in bins.windows(2).enumerate() {
            if (pair[0].upper - pair[1].lower).abs() > EDGE_TOLERANCE * pair[1].lower {
                return Err(BinError::Discontiguous { index });
            }
        }

        Ok(Self { bins })
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn dmin(&self) -> f64 {
        self.bins[0].lower
    }

    pub fn dmax(&self) -> f64 {
        self.bins[self.bins.len() - 1].upper
    }

    /// The n+1 bin-boundary diameters.
    pub fn boundaries(&self) -> Vec<f64> {
        let mut edges: Vec<f64> = self.bins.iter().map(|b| b.lower).collect();
        edges.push(self.dmax());
        edges
    }

    pub fn midpoints(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.midpoint).collect()
    }

    /// Log-weighted bin widths, Δlog10 Dp.
    pub fn dlogdp(&self) -> Vec<f64> {
        self.bins
            .iter()
            .map(|b| b.upper.log10() - b.lower.log10())
            .collect()
    }

    /// Linear bin widths, ΔDp in µm.
    pub fn ddp(&self) -> Vec<f64> {
        self.bins.iter().map(Bin::width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn generated_bins_are_equal_in_log_space() {
        let table = BinTable::from_bounds(0.5, 2.5, 2).unwrap();
        let widths = table.dlogdp();

        assert_eq!(table.len(), 2);
        assert!(f64_approx_equal(widths[0], widths[1]));
        assert!(f64_approx_equal(table.dmin(), 0.5));
        assert!(f64_approx_equal(table.dmax(), 2.5));
    }

    #[test]
    fn edge_list_places_midpoints_at_the_log_mean() {
        let table = BinTable::from_edges(&[0.5, 2.5]).unwrap();

        assert_eq!(table.len(), 1);
        // sqrt(0.5 * 2.5) = 1.118...
        assert!((table.midpoints()[0] - 1.118).abs() < 1e-3);
    }

    #[test]
    fn boundaries_cover_all_edges() {
        let table = BinTable::from_edges(&[0.38, 0.54, 0.78, 1.05, 1.5, 2.5]).unwrap();

        assert_eq!(table.len(), 5);
        assert_eq!(table.boundaries(), vec![0.38, 0.54, 0.78, 1.05, 1.5, 2.5]);
    }

    #[test]
    fn rejects_gapped_or_overlapping_bins() {
        let gapped = vec![Bin::from_edges(0.5, 1.0), Bin::from_edges(1.2, 2.5)];
        assert_eq!(
            BinTable::from_bins(gapped).unwrap_err(),
            BinError::Discontiguous { index: 0 }
        );

        let overlapping = vec![Bin::from_edges(0.5, 1.0), Bin::from_edges(0.9, 2.5)];
        assert!(BinTable::from_bins(overlapping).is_err());
    }

    #[test]
    fn rejects_unordered_triples() {
        let bad = vec![Bin {
            lower: 1.0,
            midpoint: 0.9,
            upper: 2.0,
        }];
        assert_eq!(
            BinTable::from_bins(bad).unwrap_err(),
            BinError::NotIncreasing { index: 0 }
        );
    }

    #[test]
    fn rejects_degenerate_spans() {
        assert!(BinTable::from_bounds(2.5, 0.5, 5).is_err());
        assert!(BinTable::from_bounds(0.0, 2.5, 5).is_err());
        assert!(BinTable::from_bounds(0.5, 2.5, 0).is_err());
        assert!(BinTable::from_edges(&[1.0]).is_err());
    }
}
