// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Reference Profile Interpolation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Linear interpolation of per-bin mean and dispersion values from a
//! uniformly binned reference profile.

use granule_types::error::{GranuleError, GranuleResult};
use granule_types::profile::ProfileWithSigma;

/// Interpolate per-field mean and dispersion at radius `r`.
///
/// `bin` is the caller's estimate of the enclosing bin under the
/// reference profile's uniform spacing (`floor(r / dr)`); the estimate
/// is assumed linear regardless of the caller's own binning mode. When
/// `r` sits strictly beyond the center of bin `bin`, values are
/// blended with the right neighbor; below the center of bin 0 the
/// profile is extrapolated flat; otherwise the left neighbor supplies
/// the second sample, so a radius exactly at a bin center returns that
/// bin's stored values. An interpolation fraction outside `[0, 1]`
/// means the bin
/// estimate is inconsistent with `r` and is reported as a range error.
pub fn interpolate_mean_std(
    references: &[&ProfileWithSigma],
    bin: usize,
    r: f64,
    mean_out: &mut [f64],
    std_out: &mut [f64],
) -> GranuleResult<()> {
    let first = references.first().ok_or_else(|| {
        GranuleError::ConfigError("Interpolation requires at least one reference profile".to_string())
    })?;
    let nbin = first.nbin();
    if mean_out.len() != references.len() || std_out.len() != references.len() {
        return Err(GranuleError::ConfigError(format!(
            "Interpolation output length mismatch: {} profiles, mean={}, std={}",
            references.len(),
            mean_out.len(),
            std_out.len()
        )));
    }
    if bin >= nbin {
        return Err(GranuleError::NumericRange(format!(
            "Bin estimate {bin} out of range for reference profile with {nbin} bins (r = {r:.7e})"
        )));
    }

    if r > first.radius[bin] {
        if bin + 1 >= nbin {
            return Err(GranuleError::NumericRange(format!(
                "Radius {r:.7e} beyond the last reference bin center {:.7e}",
                first.radius[bin]
            )));
        }
        let delta_r = first.radius[bin + 1] - first.radius[bin];
        let x = (r - first.radius[bin]) / delta_r;
        check_fraction(x, bin, r, first.radius[bin], first.radius[bin + 1])?;
        for (i, prof) in references.iter().enumerate() {
            mean_out[i] = prof.mean[bin] * (1.0 - x) + prof.mean[bin + 1] * x;
            std_out[i] = prof.sigma[bin] * (1.0 - x) + prof.sigma[bin + 1] * x;
        }
    } else if bin == 0 {
        // No left neighbor; extrapolate flat.
        for (i, prof) in references.iter().enumerate() {
            mean_out[i] = prof.mean[0];
            std_out[i] = prof.sigma[0];
        }
    } else {
        let delta_r = first.radius[bin] - first.radius[bin - 1];
        let x = (r - first.radius[bin - 1]) / delta_r;
        check_fraction(x, bin, r, first.radius[bin - 1], first.radius[bin])?;
        for (i, prof) in references.iter().enumerate() {
            mean_out[i] = prof.mean[bin - 1] * (1.0 - x) + prof.mean[bin] * x;
            std_out[i] = prof.sigma[bin - 1] * (1.0 - x) + prof.sigma[bin] * x;
        }
    }
    Ok(())
}

fn check_fraction(x: f64, bin: usize, r: f64, left: f64, right: f64) -> GranuleResult<()> {
    if !(0.0..=1.0).contains(&x) {
        return Err(GranuleError::NumericRange(format!(
            "Interpolation fraction {x:.7e} outside [0, 1]: bin estimate = {bin}, r = {r:.7e}, \
             left-hand point = {left:.7e}, right-hand point = {right:.7e}"
        )));
    }
    Ok(())
}
