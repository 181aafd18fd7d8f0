// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Radial Binning
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Mapping radii to profile bins under linear or logarithmic spacing.
//!
//! Linear bin `b` covers `[b*dr, (b+1)*dr)`. Logarithmic bin 0 covers
//! `[0, dr)` and bin `n >= 1` covers `[dr*ratio^(n-1), dr*ratio^n)`.
//! The realized maximum radius is the right edge of the last allocated
//! bin, which in general differs from the requested maximum; callers
//! must range-check against the realized value.

use granule_types::error::{GranuleError, GranuleResult};

/// Tolerance for snapping near-integer bin boundaries before
/// truncation, so that a realized maximum radius fed back through
/// [`RadialBinning::bin_count`] reproduces the same bin count.
const BOUNDARY_SNAP_RTOL: f64 = 1.0e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadialBinning {
    Linear { dr: f64 },
    Log { dr: f64, ratio: f64 },
}

fn snap(t: f64) -> f64 {
    let nearest = t.round();
    if (t - nearest).abs() < BOUNDARY_SNAP_RTOL {
        nearest
    } else {
        t
    }
}

impl RadialBinning {
    pub fn linear(dr: f64) -> GranuleResult<Self> {
        if !dr.is_finite() || dr <= 0.0 {
            return Err(GranuleError::ConfigError(format!(
                "Linear binning requires finite dr > 0, got {dr}"
            )));
        }
        Ok(Self::Linear { dr })
    }

    pub fn log(dr: f64, ratio: f64) -> GranuleResult<Self> {
        if !dr.is_finite() || dr <= 0.0 {
            return Err(GranuleError::ConfigError(format!(
                "Log binning requires finite dr > 0, got {dr}"
            )));
        }
        if !ratio.is_finite() || ratio <= 1.0 {
            return Err(GranuleError::ConfigError(format!(
                "Log binning requires ratio > 1, got {ratio}"
            )));
        }
        Ok(Self::Log { dr, ratio })
    }

    pub fn is_log(&self) -> bool {
        matches!(self, Self::Log { .. })
    }

    /// Width of the innermost bin.
    pub fn min_bin_width(&self) -> f64 {
        match *self {
            Self::Linear { dr } | Self::Log { dr, .. } => dr,
        }
    }

    /// Ratio of adjacent bin widths (1 for linear spacing).
    pub fn bin_ratio(&self) -> f64 {
        match *self {
            Self::Linear { .. } => 1.0,
            Self::Log { ratio, .. } => ratio,
        }
    }

    /// Bin index of radius `r >= 0`. The index is unclamped; callers
    /// compare against the allocated bin count and drop out-of-range
    /// indices.
    pub fn bin_index(&self, r: f64) -> usize {
        match *self {
            Self::Linear { dr } => (r / dr) as usize,
            Self::Log { dr, ratio } => {
                if r < dr {
                    0
                } else {
                    snap((r / dr).ln() / ratio.ln()) as usize + 1
                }
            }
        }
    }

    /// Number of bins needed to cover the requested maximum radius.
    pub fn bin_count(&self, r_max: f64) -> GranuleResult<usize> {
        if !r_max.is_finite() || r_max <= 0.0 {
            return Err(GranuleError::ConfigError(format!(
                "Bin count requires finite r_max > 0, got {r_max}"
            )));
        }
        match *self {
            Self::Linear { dr } => Ok((snap(r_max / dr).ceil() as usize).max(1)),
            Self::Log { dr, ratio } => {
                // With r_max below the innermost bin width the formula
                // would yield a nonpositive count.
                if r_max < dr {
                    return Err(GranuleError::ConfigError(format!(
                        "Log binning cannot cover r_max={r_max} with innermost bin width {dr}"
                    )));
                }
                let n = snap((r_max / dr).ln() / ratio.ln()).floor() as usize + 1;
                Ok(n)
            }
        }
    }

    /// Right edge of the last of `nbin` bins.
    pub fn realized_max_radius(&self, nbin: usize) -> f64 {
        match *self {
            Self::Linear { dr } => nbin as f64 * dr,
            Self::Log { dr, ratio } => dr * ratio.powi(nbin as i32 - 1),
        }
    }

    /// Representative radius of bin `b` for reporting.
    pub fn bin_radius(&self, b: usize) -> f64 {
        match *self {
            Self::Linear { dr } => (b as f64 + 0.5) * dr,
            Self::Log { dr, ratio } => dr * ratio.powf(b as f64 - 0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_bin_index_is_floor() {
        let bins = RadialBinning::linear(0.5).expect("linear");
        assert_eq!(bins.bin_index(0.0), 0);
        assert_eq!(bins.bin_index(0.49), 0);
        assert_eq!(bins.bin_index(0.5), 1);
        assert_eq!(bins.bin_index(1.74), 3);
    }

    #[test]
    fn test_log_bin_index_covers_inner_bin() {
        let bins = RadialBinning::log(1.0, 2.0).expect("log");
        assert_eq!(bins.bin_index(0.0), 0);
        assert_eq!(bins.bin_index(0.999), 0);
        // Bin n >= 1 covers [ratio^(n-1), ratio^n).
        assert_eq!(bins.bin_index(1.0), 1);
        assert_eq!(bins.bin_index(1.999), 1);
        assert_eq!(bins.bin_index(2.0), 2);
        assert_eq!(bins.bin_index(7.9), 3);
    }

    #[test]
    fn test_linear_bin_count_and_realized_radius() {
        let bins = RadialBinning::linear(1.0).expect("linear");
        assert_eq!(bins.bin_count(10.0).expect("count"), 10);
        assert_eq!(bins.bin_count(10.2).expect("count"), 11);
        assert!((bins.realized_max_radius(11) - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_bin_count_round_trip() {
        let bins = RadialBinning::log(0.1, 1.3).expect("log");
        for r_max in [0.15, 0.7, 3.0, 42.0] {
            let nbin = bins.bin_count(r_max).expect("count");
            let realized = bins.realized_max_radius(nbin);
            assert_eq!(
                bins.bin_count(realized).expect("count"),
                nbin,
                "Round trip unstable for r_max={r_max}"
            );
        }
    }

    #[test]
    fn test_log_bin_count_rejects_tiny_radius() {
        let bins = RadialBinning::log(1.0, 2.0).expect("log");
        let err = bins.bin_count(0.5).expect_err("r_max below dr must fail");
        match err {
            GranuleError::ConfigError(msg) => assert!(msg.contains("cannot cover")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bin_radius_reporting() {
        let lin = RadialBinning::linear(2.0).expect("linear");
        assert!((lin.bin_radius(0) - 1.0).abs() < 1e-12);
        assert!((lin.bin_radius(3) - 7.0).abs() < 1e-12);

        let log = RadialBinning::log(1.0, 4.0).expect("log");
        assert!((log.bin_radius(1) - 2.0).abs() < 1e-12);
        assert!((log.bin_radius(2) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_constructors_reject_bad_parameters() {
        assert!(RadialBinning::linear(0.0).is_err());
        assert!(RadialBinning::linear(f64::NAN).is_err());
        assert!(RadialBinning::log(1.0, 1.0).is_err());
        assert!(RadialBinning::log(-1.0, 2.0).is_err());
    }
}
