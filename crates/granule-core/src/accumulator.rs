// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Per-Slot Accumulator Arena
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Lock-free accumulation arena for the parallel profile sweep.
//!
//! The arena is indexed (slot, profile, bin); each worker owns exactly
//! one slot and never touches another, so no locking is needed. Work
//! is partitioned into equal contiguous chunks per slot: the chunk map
//! depends only on (slot count, item count), which keeps the
//! floating-point accumulation order reproducible across runs.
//! Reduction folds slots in increasing index order for the same
//! reason.

use granule_types::error::{GranuleError, GranuleResult};
use granule_types::profile::Profile;
use std::ops::Range;

/// Partial sums of one (slot, profile) pair.
#[derive(Debug, Clone)]
pub struct SlotBins {
    pub data: Vec<f64>,
    pub weight: Vec<f64>,
    pub ncell: Vec<i64>,
}

impl SlotBins {
    fn zeros(nbin: usize) -> Self {
        Self {
            data: vec![0.0; nbin],
            weight: vec![0.0; nbin],
            ncell: vec![0; nbin],
        }
    }

    #[inline]
    pub fn deposit(&mut self, bin: usize, value: f64, weight: f64) {
        self.data[bin] += value;
        self.weight[bin] += weight;
        self.ncell[bin] += 1;
    }
}

/// All profiles of one worker slot.
#[derive(Debug, Clone)]
pub struct SlotState {
    pub profiles: Vec<SlotBins>,
}

/// The full (slot × profile × bin) arena.
#[derive(Debug, Clone)]
pub struct SlotAccumulator {
    slots: Vec<SlotState>,
    nbin: usize,
}

impl SlotAccumulator {
    pub fn new(n_slots: usize, n_profiles: usize, nbin: usize) -> GranuleResult<Self> {
        if n_slots == 0 || n_profiles == 0 || nbin == 0 {
            return Err(GranuleError::ConfigError(format!(
                "Accumulator arena requires nonzero dimensions, got \
                 (slots={n_slots}, profiles={n_profiles}, bins={nbin})"
            )));
        }
        let slots = (0..n_slots)
            .map(|_| SlotState {
                profiles: (0..n_profiles).map(|_| SlotBins::zeros(nbin)).collect(),
            })
            .collect();
        Ok(Self { slots, nbin })
    }

    pub fn n_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn slots_mut(&mut self) -> &mut [SlotState] {
        &mut self.slots
    }

    /// Fold all slots into the profile bin arrays, replacing their
    /// current contents. Slot 0 assigns, higher slots add, in index
    /// order.
    pub fn reduce_into(&self, profiles: &mut [Profile]) -> GranuleResult<()> {
        if profiles.len() != self.slots[0].profiles.len() {
            return Err(GranuleError::ConfigError(format!(
                "Reduction profile count mismatch: arena holds {}, got {}",
                self.slots[0].profiles.len(),
                profiles.len()
            )));
        }
        for (p, profile) in profiles.iter_mut().enumerate() {
            if profile.nbin() != self.nbin {
                return Err(GranuleError::ConfigError(format!(
                    "Reduction bin count mismatch: arena holds {}, profile {p} has {}",
                    self.nbin,
                    profile.nbin()
                )));
            }
            profile.data.copy_from_slice(&self.slots[0].profiles[p].data);
            profile
                .weight
                .copy_from_slice(&self.slots[0].profiles[p].weight);
            profile
                .ncell
                .copy_from_slice(&self.slots[0].profiles[p].ncell);
            for slot in &self.slots[1..] {
                for b in 0..self.nbin {
                    profile.data[b] += slot.profiles[p].data[b];
                    profile.weight[b] += slot.profiles[p].weight[b];
                    profile.ncell[b] += slot.profiles[p].ncell[b];
                }
            }
        }
        Ok(())
    }
}

/// Contiguous index chunk owned by `slot` when `n` items are shared
/// across `n_slots` workers. Chunk sizes differ by at most one, with
/// the remainder going to the lowest slots.
pub fn static_chunk(slot: usize, n_slots: usize, n: usize) -> Range<usize> {
    let base = n / n_slots;
    let rem = n % n_slots;
    let start = slot * base + slot.min(rem);
    let len = base + usize::from(slot < rem);
    start..start + len
}
