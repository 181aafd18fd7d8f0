// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Patch
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! A single cubical grid block and its double-buffered field storage.

use granule_types::constants::{PATCH_SIZE, SON_NONE};
use granule_types::error::{GranuleError, GranuleResult};
use ndarray::Array4;

/// Field storage of one patch: `(component, k, j, i)` over an
/// 8×8×8 cell block.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBlock {
    data: Array4<f64>,
}

impl FieldBlock {
    /// Zero-filled block with `ncomp` field components.
    pub fn zeros(ncomp: usize) -> GranuleResult<Self> {
        if ncomp == 0 {
            return Err(GranuleError::ConfigError(
                "Field block requires at least one component".to_string(),
            ));
        }
        Ok(Self {
            data: Array4::zeros((ncomp, PATCH_SIZE, PATCH_SIZE, PATCH_SIZE)),
        })
    }

    pub fn n_components(&self) -> usize {
        self.data.shape()[0]
    }

    #[inline]
    pub fn value(&self, comp: usize, k: usize, j: usize, i: usize) -> f64 {
        self.data[[comp, k, j, i]]
    }

    #[inline]
    pub fn value_mut(&mut self, comp: usize, k: usize, j: usize, i: usize) -> &mut f64 {
        &mut self.data[[comp, k, j, i]]
    }

    /// Fill one component with a uniform value.
    pub fn fill_component(&mut self, comp: usize, value: f64) {
        self.data
            .index_axis_mut(ndarray::Axis(0), comp)
            .fill(value);
    }
}

/// One patch of the hierarchy.
///
/// `corner` is the left-lower corner in finest-cell scale units;
/// `edge_lo`/`edge_hi` are the corresponding physical coordinates.
/// `son` follows the first-of-eight convention: [`SON_NONE`] for a
/// leaf, otherwise the index of the first of the eight children on the
/// next level. Field data is double-buffered over two slots.
#[derive(Debug, Clone)]
pub struct Patch {
    pub corner: [i64; 3],
    pub edge_lo: [f64; 3],
    pub edge_hi: [f64; 3],
    pub father: i64,
    pub son: i64,
    pub flag: bool,
    /// Mid-transition marker of the hybrid scheme: this patch switches
    /// to the wave representation on the next refinement.
    pub switch_to_wave: bool,
    data: [Option<FieldBlock>; 2],
}

impl Patch {
    pub fn new(corner: [i64; 3], edge_lo: [f64; 3], edge_hi: [f64; 3], father: i64) -> Self {
        Self {
            corner,
            edge_lo,
            edge_hi,
            father,
            son: SON_NONE,
            flag: false,
            switch_to_wave: false,
            data: [None, None],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.son == SON_NONE
    }

    /// Allocate zero-filled field storage in both buffer slots.
    pub fn allocate_field(&mut self, ncomp: usize) -> GranuleResult<()> {
        self.data = [Some(FieldBlock::zeros(ncomp)?), Some(FieldBlock::zeros(ncomp)?)];
        Ok(())
    }

    pub fn has_field(&self) -> bool {
        self.data[0].is_some()
    }

    /// Field data in buffer slot `sg`.
    pub fn field(&self, sg: usize) -> GranuleResult<&FieldBlock> {
        self.data
            .get(sg)
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| {
                GranuleError::ConfigError(format!(
                    "Patch has no field data in buffer slot {sg}"
                ))
            })
    }

    pub fn field_mut(&mut self, sg: usize) -> GranuleResult<&mut FieldBlock> {
        self.data
            .get_mut(sg)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| {
                GranuleError::ConfigError(format!(
                    "Patch has no field data in buffer slot {sg}"
                ))
            })
    }
}
