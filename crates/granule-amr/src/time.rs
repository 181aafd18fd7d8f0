// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Field Buffer Time Resolution
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Resolving which field buffer slot(s) represent a target physical
//! time.
//!
//! Each level double-buffers its field data; the two slots carry
//! snapshots at different times. A consumer asking for data at an
//! arbitrary time either hits one slot exactly (within a relative
//! tolerance) or blends both linearly.

use crate::hierarchy::Level;
use granule_types::error::{GranuleError, GranuleResult};

/// Relative tolerance for treating a requested time as an exact slot
/// match.
const TIME_MATCH_RTOL: f64 = 1.0e-10;

/// How to read field data for one target time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeInterp {
    /// Single slot, no blending.
    Slot(usize),
    /// Linear blend of two slots: `weight * slot(sg) +
    /// weight_int * slot(sg_int)`.
    Blend {
        sg: usize,
        sg_int: usize,
        weight: f64,
        weight_int: f64,
    },
}

impl TimeInterp {
    /// Slot whose data drives the read (the blend's primary slot).
    pub fn primary_slot(&self) -> usize {
        match *self {
            Self::Slot(sg) => sg,
            Self::Blend { sg, .. } => sg,
        }
    }
}

fn times_match(a: f64, b: f64) -> bool {
    // Non-finite slot times never match anything.
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= TIME_MATCH_RTOL * a.abs().max(b.abs())
}

/// Resolve the slot(s) representing `prep_time` on `level`.
///
/// A negative `prep_time` disables temporal interpolation and selects
/// the primary slot unconditionally. Otherwise the requested time must
/// either match one slot or fall between the two slot times; blending
/// against an unpopulated slot or extrapolating beyond the stored
/// snapshots is an error.
pub fn resolve_time_interp(level: &Level, prep_time: f64) -> GranuleResult<TimeInterp> {
    let sg0 = level.active_sg;
    if sg0 > 1 {
        return Err(GranuleError::ConfigError(format!(
            "Primary buffer slot {sg0} out of range"
        )));
    }
    if prep_time < 0.0 {
        return Ok(TimeInterp::Slot(sg0));
    }

    let t0 = level.sg_time[sg0];
    let t1 = level.sg_time[1 - sg0];
    if times_match(prep_time, t0) {
        return Ok(TimeInterp::Slot(sg0));
    }
    if times_match(prep_time, t1) {
        return Ok(TimeInterp::Slot(1 - sg0));
    }

    if !t0.is_finite() || !t1.is_finite() {
        return Err(GranuleError::NumericRange(format!(
            "Cannot blend to time {prep_time:.7e}: slot times ({t0:.7e}, {t1:.7e}) \
             include an unpopulated slot"
        )));
    }
    if times_match(t0, t1) {
        return Err(GranuleError::NumericRange(format!(
            "Cannot blend to time {prep_time:.7e}: both slots hold time {t0:.7e}"
        )));
    }

    let weight = (prep_time - t1) / (t0 - t1);
    let weight_int = (t0 - prep_time) / (t0 - t1);
    if !(0.0..=1.0).contains(&weight) {
        return Err(GranuleError::NumericRange(format!(
            "Requested time {prep_time:.7e} outside the stored snapshot range \
             [{:.7e}, {:.7e}]",
            t0.min(t1),
            t0.max(t1)
        )));
    }

    Ok(TimeInterp::Blend {
        sg: sg0,
        sg_int: 1 - sg0,
        weight,
        weight_int,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::PatchHierarchy;
    use granule_types::config::{FieldLayout, SolverScheme};
    use granule_types::geometry::DomainGeometry;

    fn level_with_times(active_sg: usize, t_active: f64, t_other: f64) -> Level {
        let geo = DomainGeometry::new([32.0; 3], [true; 3], [32; 3], 1).expect("geometry");
        let hier = PatchHierarchy::new(
            geo,
            FieldLayout {
                n_intrinsic: 1,
                n_passive: 0,
            },
            SolverScheme::Fluid,
        )
        .expect("hierarchy");
        let mut level = hier.levels[0].clone();
        level.active_sg = active_sg;
        level.sg_time[active_sg] = t_active;
        level.sg_time[1 - active_sg] = t_other;
        level
    }

    #[test]
    fn test_negative_time_uses_primary_slot() {
        let level = level_with_times(1, 2.0, 1.0);
        assert_eq!(
            resolve_time_interp(&level, -1.0).expect("resolve"),
            TimeInterp::Slot(1)
        );
    }

    #[test]
    fn test_exact_match_selects_matching_slot() {
        let level = level_with_times(0, 2.0, 1.0);
        assert_eq!(
            resolve_time_interp(&level, 2.0).expect("resolve"),
            TimeInterp::Slot(0)
        );
        assert_eq!(
            resolve_time_interp(&level, 1.0).expect("resolve"),
            TimeInterp::Slot(1)
        );
    }

    #[test]
    fn test_intermediate_time_blends_linearly() {
        let level = level_with_times(0, 2.0, 1.0);
        match resolve_time_interp(&level, 1.25).expect("resolve") {
            TimeInterp::Blend {
                sg,
                sg_int,
                weight,
                weight_int,
            } => {
                assert_eq!(sg, 0);
                assert_eq!(sg_int, 1);
                assert!((weight - 0.25).abs() < 1e-12);
                assert!((weight_int - 0.75).abs() < 1e-12);
                assert!((weight + weight_int - 1.0).abs() < 1e-12);
            }
            other => panic!("Expected blend, got {other:?}"),
        }
    }

    #[test]
    fn test_extrapolation_is_a_range_error() {
        let level = level_with_times(0, 2.0, 1.0);
        let err = resolve_time_interp(&level, 3.0).expect_err("extrapolation must fail");
        match err {
            GranuleError::NumericRange(msg) => assert!(msg.contains("snapshot range")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unpopulated_secondary_slot_is_a_range_error() {
        // Fresh levels hold NEG_INFINITY in the inactive slot.
        let level = level_with_times(0, 2.0, f64::NEG_INFINITY);
        let err = resolve_time_interp(&level, 1.5).expect_err("unpopulated slot must fail");
        match err {
            GranuleError::NumericRange(msg) => assert!(msg.contains("unpopulated slot")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }
}
