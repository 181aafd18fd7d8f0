// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Hierarchy Store
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-level patch storage and bookkeeping.
//!
//! Patches are indexed by (level, local id). Each level carries a
//! marker table of category boundaries into its patch list; real
//! patches occupy `[0, markers[REAL_MARKER])` and buffer categories
//! follow. Levels created here hold real patches only, so committing a
//! level fills every marker slot with the same count.

use crate::patch::Patch;
use granule_types::config::{FieldLayout, SolverScheme};
use granule_types::constants::{PATCH_MARKERS, PATCH_SIZE, REAL_MARKER, SON_NONE};
use granule_types::error::{GranuleError, GranuleResult};
use granule_types::geometry::DomainGeometry;

/// One refinement level of the hierarchy.
#[derive(Debug, Clone)]
pub struct Level {
    pub patches: Vec<Patch>,
    /// Patch-category boundary markers; `markers[REAL_MARKER]` is the
    /// number of real patches.
    pub markers: [usize; PATCH_MARKERS],
    /// Level-global wave-representation flag of the hybrid scheme.
    /// Sticky: once set for a level it stays set.
    pub use_wave_flag: bool,
    /// Primary field buffer slot.
    pub active_sg: usize,
    /// Physical time of each field buffer slot.
    pub sg_time: [f64; 2],
}

impl Level {
    fn empty(use_wave_flag: bool) -> Self {
        Self {
            patches: Vec::new(),
            markers: [0; PATCH_MARKERS],
            use_wave_flag,
            active_sg: 0,
            sg_time: [0.0, f64::NEG_INFINITY],
        }
    }

    pub fn n_real(&self) -> usize {
        self.markers[REAL_MARKER]
    }

    pub fn n_total(&self) -> usize {
        self.patches.len()
    }
}

/// The octree patch hierarchy of one rank.
#[derive(Debug, Clone)]
pub struct PatchHierarchy {
    pub geometry: DomainGeometry,
    pub layout: FieldLayout,
    pub scheme: SolverScheme,
    pub levels: Vec<Level>,
}

impl PatchHierarchy {
    /// Empty hierarchy with `max_level + 1` levels. A pure wave run
    /// marks every level as wave from the start; hybrid runs start
    /// fluid everywhere and promote levels during refinement.
    pub fn new(
        geometry: DomainGeometry,
        layout: FieldLayout,
        scheme: SolverScheme,
    ) -> GranuleResult<Self> {
        if layout.n_intrinsic == 0 {
            return Err(GranuleError::ConfigError(
                "Field layout requires at least one intrinsic component".to_string(),
            ));
        }
        let wave_everywhere = scheme == SolverScheme::Wave;
        let levels = (0..=geometry.max_level)
            .map(|_| Level::empty(wave_everywhere))
            .collect();
        Ok(Self {
            geometry,
            layout,
            scheme,
            levels,
        })
    }

    pub fn top_level(&self) -> usize {
        self.geometry.max_level
    }

    pub fn level(&self, lv: usize) -> GranuleResult<&Level> {
        self.levels.get(lv).ok_or_else(|| {
            GranuleError::ConfigError(format!(
                "Level {lv} out of range (top level = {})",
                self.geometry.max_level
            ))
        })
    }

    pub fn level_mut(&mut self, lv: usize) -> GranuleResult<&mut Level> {
        let top = self.geometry.max_level;
        self.levels.get_mut(lv).ok_or_else(|| {
            GranuleError::ConfigError(format!("Level {lv} out of range (top level = {top})"))
        })
    }

    /// Patch edge length on `lv` in finest-cell scale units.
    pub fn patch_scale(&self, lv: usize) -> i64 {
        PATCH_SIZE as i64 * self.geometry.cell_scale(lv)
    }

    /// Append one patch on `lv` at `corner` (finest-cell scale units),
    /// computing its physical edges and optionally allocating field
    /// storage. Returns the new local id.
    pub fn new_patch(
        &mut self,
        lv: usize,
        corner: [i64; 3],
        father: i64,
        alloc_data: bool,
    ) -> GranuleResult<usize> {
        let box_scale = self.geometry.box_scale();
        let pscale = self.patch_scale(lv);
        for d in 0..3 {
            if corner[d] < 0 || corner[d] + pscale > box_scale[d] {
                return Err(GranuleError::ConfigError(format!(
                    "Patch corner {corner:?} with scale {pscale} outside box scale {box_scale:?} \
                     on level {lv}"
                )));
            }
        }
        let finest = self.geometry.finest_cell_width();
        let width = PATCH_SIZE as f64 * self.geometry.cell_width(lv);
        let mut edge_lo = [0.0; 3];
        let mut edge_hi = [0.0; 3];
        for d in 0..3 {
            edge_lo[d] = corner[d] as f64 * finest;
            edge_hi[d] = edge_lo[d] + width;
        }
        let ncomp = self.layout.total();
        let level = self.level_mut(lv)?;
        let mut patch = Patch::new(corner, edge_lo, edge_hi, father);
        if alloc_data {
            patch.allocate_field(ncomp)?;
        }
        level.patches.push(patch);
        Ok(level.patches.len() - 1)
    }

    /// Finalize a freshly built level: every category marker is set to
    /// the current patch count (the level holds real patches only).
    pub fn commit_level(&mut self, lv: usize) -> GranuleResult<()> {
        let level = self.level_mut(lv)?;
        let n = level.patches.len();
        for m in 1..PATCH_MARKERS {
            level.markers[m] = n;
        }
        Ok(())
    }

    /// Tile level 0 with patches covering the whole base grid, with
    /// field storage allocated. Patch order is x-fastest.
    pub fn init_uniform_base(&mut self) -> GranuleResult<()> {
        if self.levels[0].n_total() != 0 {
            return Err(GranuleError::ConfigError(format!(
                "Base level already holds {} patches",
                self.levels[0].n_total()
            )));
        }
        let blocks = [
            self.geometry.base_cells[0] / PATCH_SIZE,
            self.geometry.base_cells[1] / PATCH_SIZE,
            self.geometry.base_cells[2] / PATCH_SIZE,
        ];
        let pscale = self.patch_scale(0);
        for bz in 0..blocks[2] {
            for by in 0..blocks[1] {
                for bx in 0..blocks[0] {
                    let corner = [
                        bx as i64 * pscale,
                        by as i64 * pscale,
                        bz as i64 * pscale,
                    ];
                    self.new_patch(0, corner, SON_NONE, true)?;
                }
            }
        }
        self.commit_level(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use granule_types::constants::DENSITY;

    fn hierarchy() -> PatchHierarchy {
        let geo = DomainGeometry::new([32.0; 3], [true; 3], [32; 3], 2).expect("geometry");
        PatchHierarchy::new(
            geo,
            FieldLayout {
                n_intrinsic: 1,
                n_passive: 1,
            },
            SolverScheme::Hybrid,
        )
        .expect("hierarchy")
    }

    #[test]
    fn test_uniform_base_tiles_the_box() {
        let mut hier = hierarchy();
        hier.init_uniform_base().expect("base");
        let base = hier.level(0).expect("level 0");
        // 32 cells per side / 8 per patch = 4^3 patches.
        assert_eq!(base.n_total(), 64);
        assert_eq!(base.n_real(), 64);
        assert!(base.patches.iter().all(|p| p.is_leaf()));
        assert!(base.patches.iter().all(|p| p.has_field()));
    }

    #[test]
    fn test_patch_edges_follow_corner_scale() {
        let mut hier = hierarchy();
        let pscale = hier.patch_scale(0);
        let pid = hier
            .new_patch(0, [pscale, 0, pscale], SON_NONE, false)
            .expect("patch");
        let patch = &hier.level(0).expect("level").patches[pid];
        // Level-0 patch width: 8 cells of width 1.
        assert!((patch.edge_lo[0] - 8.0).abs() < 1e-12);
        assert!((patch.edge_lo[1] - 0.0).abs() < 1e-12);
        assert!((patch.edge_hi[2] - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_patch_scale_halves_per_level() {
        let hier = hierarchy();
        assert_eq!(hier.patch_scale(0), 2 * hier.patch_scale(1));
        assert_eq!(hier.patch_scale(1), 2 * hier.patch_scale(2));
        // Finest level: one scale unit per cell.
        assert_eq!(hier.patch_scale(2), PATCH_SIZE as i64);
    }

    #[test]
    fn test_new_patch_rejects_out_of_box_corner() {
        let mut hier = hierarchy();
        let box_scale = hier.geometry.box_scale();
        let err = hier
            .new_patch(0, [box_scale[0], 0, 0], SON_NONE, false)
            .expect_err("corner outside box");
        match err {
            GranuleError::ConfigError(msg) => assert!(msg.contains("outside box scale")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_wave_scheme_marks_all_levels() {
        let geo = DomainGeometry::new([32.0; 3], [true; 3], [32; 3], 2).expect("geometry");
        let hier = PatchHierarchy::new(
            geo,
            FieldLayout {
                n_intrinsic: 1,
                n_passive: 0,
            },
            SolverScheme::Wave,
        )
        .expect("hierarchy");
        assert!(hier.levels.iter().all(|l| l.use_wave_flag));
    }

    #[test]
    fn test_field_component_layout_roundtrip() {
        let mut hier = hierarchy();
        hier.init_uniform_base().expect("base");
        let passive = hier.layout.passive_index(0);
        {
            let level = hier.level_mut(0).expect("level");
            let block = level.patches[0].field_mut(0).expect("slot 0");
            block.fill_component(DENSITY, 2.0);
            block.fill_component(passive, 3.0);
        }
        let block = hier.level(0).expect("level").patches[0]
            .field(0)
            .expect("slot 0");
        assert_eq!(block.value(DENSITY, 1, 2, 3), 2.0);
        assert_eq!(block.value(passive, 1, 2, 3), 3.0);
    }
}
