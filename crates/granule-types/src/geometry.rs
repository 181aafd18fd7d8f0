// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Domain Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Global domain geometry shared by every level of the patch hierarchy.
//!
//! Integer patch corners are expressed in finest-cell scale units:
//! one cell at level `lv` spans `cell_scale(lv) = 2^(max_level - lv)`
//! units, so corner arithmetic stays exact across levels.

use crate::constants::PATCH_SIZE;
use crate::error::{GranuleError, GranuleResult};

/// Relative tolerance for the cubic-cell isotropy check.
const ISOTROPY_RTOL: f64 = 1.0e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct DomainGeometry {
    /// Physical box extent per axis.
    pub box_size: [f64; 3],
    /// Per-axis periodic boundary condition.
    pub periodic: [bool; 3],
    /// Level-0 cell count per axis; each must be a positive multiple of
    /// `PATCH_SIZE` so level 0 tiles exactly into patches.
    pub base_cells: [usize; 3],
    /// Deepest refinement level (level 0 is the base grid).
    pub max_level: usize,
}

impl DomainGeometry {
    pub fn new(
        box_size: [f64; 3],
        periodic: [bool; 3],
        base_cells: [usize; 3],
        max_level: usize,
    ) -> GranuleResult<Self> {
        for d in 0..3 {
            if !box_size[d].is_finite() || box_size[d] <= 0.0 {
                return Err(GranuleError::ConfigError(format!(
                    "box_size[{d}] ({}) must be finite and > 0",
                    box_size[d]
                )));
            }
            if base_cells[d] == 0 || base_cells[d] % PATCH_SIZE != 0 {
                return Err(GranuleError::ConfigError(format!(
                    "base_cells[{d}] ({}) must be a positive multiple of {PATCH_SIZE}",
                    base_cells[d]
                )));
            }
        }
        if max_level >= 32 {
            return Err(GranuleError::ConfigError(format!(
                "max_level ({max_level}) must be < 32"
            )));
        }

        // Cells must be cubic: every axis must yield the same base width.
        let dh0 = box_size[0] / base_cells[0] as f64;
        for d in 1..3 {
            let dh = box_size[d] / base_cells[d] as f64;
            if (dh - dh0).abs() > ISOTROPY_RTOL * dh0 {
                return Err(GranuleError::ConfigError(format!(
                    "anisotropic cells: axis 0 width {dh0:.15e} vs axis {d} width {dh:.15e}"
                )));
            }
        }

        Ok(Self {
            box_size,
            periodic,
            base_cells,
            max_level,
        })
    }

    /// Physical cell width at `level`.
    pub fn cell_width(&self, level: usize) -> f64 {
        self.box_size[0] / self.base_cells[0] as f64 / (1u64 << level) as f64
    }

    /// Finest-level cell width; one corner unit spans this distance.
    pub fn finest_cell_width(&self) -> f64 {
        self.cell_width(self.max_level)
    }

    /// Finest-cell units spanned by one cell at `level`.
    pub fn cell_scale(&self, level: usize) -> i64 {
        1i64 << (self.max_level - level)
    }

    /// Box extent per axis in finest-cell units.
    pub fn box_scale(&self) -> [i64; 3] {
        let s = self.cell_scale(0);
        [
            self.base_cells[0] as i64 * s,
            self.base_cells[1] as i64 * s,
            self.base_cells[2] as i64 * s,
        ]
    }

    pub fn box_center(&self) -> [f64; 3] {
        [
            0.5 * self.box_size[0],
            0.5 * self.box_size[1],
            0.5 * self.box_size[2],
        ]
    }

    pub fn half_box(&self) -> [f64; 3] {
        self.box_center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_width_halves_per_level() {
        let geo = DomainGeometry::new([32.0; 3], [true; 3], [32; 3], 3).expect("valid geometry");
        assert!((geo.cell_width(0) - 1.0).abs() < 1e-14);
        assert!((geo.cell_width(1) - 0.5).abs() < 1e-14);
        assert!((geo.cell_width(3) - 0.125).abs() < 1e-14);
        assert!((geo.finest_cell_width() - geo.cell_width(3)).abs() < 1e-14);
    }

    #[test]
    fn test_cell_scale_is_power_of_two() {
        let geo = DomainGeometry::new([32.0; 3], [false; 3], [32; 3], 3).expect("valid geometry");
        assert_eq!(geo.cell_scale(0), 8);
        assert_eq!(geo.cell_scale(2), 2);
        assert_eq!(geo.cell_scale(3), 1);
        assert_eq!(geo.box_scale(), [256, 256, 256]);
    }

    #[test]
    fn test_rejects_cells_not_multiple_of_patch_size() {
        let err = DomainGeometry::new([32.0; 3], [true; 3], [32, 20, 32], 1)
            .expect_err("non-multiple base cells must error");
        match err {
            GranuleError::ConfigError(msg) => assert!(msg.contains("base_cells[1]")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_anisotropic_cells() {
        let err = DomainGeometry::new([32.0, 16.0, 32.0], [true; 3], [32; 3], 1)
            .expect_err("anisotropic cells must error");
        match err {
            GranuleError::ConfigError(msg) => assert!(msg.contains("anisotropic")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_non_positive_box() {
        for bad in [0.0, -1.0, f64::NAN] {
            let err = DomainGeometry::new([bad, 32.0, 32.0], [true; 3], [32; 3], 1)
                .expect_err("bad box extent must error");
            match err {
                GranuleError::ConfigError(msg) => assert!(msg.contains("box_size[0]")),
                other => panic!("Unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_anisotropic_cell_counts_with_matching_widths_accepted() {
        // Non-cubic box is fine as long as the cells stay cubic.
        let geo = DomainGeometry::new([64.0, 32.0, 32.0], [true; 3], [64, 32, 32], 2)
            .expect("cubic cells in a non-cubic box");
        assert_eq!(geo.box_scale(), [256, 128, 128]);
        assert!((geo.half_box()[0] - 32.0).abs() < 1e-14);
    }
}
