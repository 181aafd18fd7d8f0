// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Radial Profile Containers
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Radial profile containers shared by the statistics pipeline.

use crate::error::{GranuleError, GranuleResult};

/// Binned radial profile accumulated around a fixed center.
///
/// `data` holds the weighted sum during accumulation and the weighted
/// average after root-rank normalization; `weight` holds the summed
/// cell volumes and `ncell` the contributing cell counts. All four
/// per-bin vectors always share the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub center: [f64; 3],
    /// Realized maximum radius covered by the allocated bins.
    pub max_radius: f64,
    pub log_bin: bool,
    /// Ratio between adjacent bin widths; only meaningful when
    /// `log_bin` is set.
    pub log_bin_ratio: f64,
    pub radius: Vec<f64>,
    pub data: Vec<f64>,
    pub weight: Vec<f64>,
    pub ncell: Vec<i64>,
}

impl Profile {
    /// Zero-filled profile with `nbin` bins.
    pub fn allocate(
        center: [f64; 3],
        max_radius: f64,
        log_bin: bool,
        log_bin_ratio: f64,
        nbin: usize,
    ) -> GranuleResult<Self> {
        if nbin == 0 {
            return Err(GranuleError::ConfigError(
                "Profile allocation requires nbin >= 1".to_string(),
            ));
        }
        Ok(Self {
            center,
            max_radius,
            log_bin,
            log_bin_ratio,
            radius: vec![0.0; nbin],
            data: vec![0.0; nbin],
            weight: vec![0.0; nbin],
            ncell: vec![0; nbin],
        })
    }

    pub fn nbin(&self) -> usize {
        self.radius.len()
    }
}

/// Reference profile of per-bin mean and dispersion estimates, sampled
/// on a uniform radial grid starting at `dr/2`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileWithSigma {
    pub max_radius: f64,
    pub radius: Vec<f64>,
    pub mean: Vec<f64>,
    pub sigma: Vec<f64>,
}

impl ProfileWithSigma {
    /// Build a uniformly binned reference profile.
    ///
    /// Bin `b` is centered at `(b + 0.5) * dr`; `mean` and `sigma`
    /// must both have length `nbin`.
    pub fn linear(nbin: usize, dr: f64, mean: Vec<f64>, sigma: Vec<f64>) -> GranuleResult<Self> {
        if nbin == 0 {
            return Err(GranuleError::ConfigError(
                "Reference profile requires nbin >= 1".to_string(),
            ));
        }
        if !dr.is_finite() || dr <= 0.0 {
            return Err(GranuleError::ConfigError(format!(
                "Reference profile bin width must be finite > 0, got {dr}"
            )));
        }
        if mean.len() != nbin || sigma.len() != nbin {
            return Err(GranuleError::ConfigError(format!(
                "Reference profile length mismatch: nbin={nbin}, mean={}, sigma={}",
                mean.len(),
                sigma.len()
            )));
        }
        let radius: Vec<f64> = (0..nbin).map(|b| (b as f64 + 0.5) * dr).collect();
        Ok(Self {
            max_radius: nbin as f64 * dr,
            radius,
            mean,
            sigma,
        })
    }

    pub fn nbin(&self) -> usize {
        self.radius.len()
    }

    /// Uniform bin width of the reference grid.
    pub fn dr(&self) -> f64 {
        2.0 * self.radius[0]
    }
}
