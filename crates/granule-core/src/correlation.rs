// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Correlation Profile Computer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Average radial correlation profile of target fields around a
//! center point.
//!
//! The sweep walks every targeted patch cell, de-means the intrinsic
//! and passive values against an interpolated reference profile, and
//! accumulates the normalized product per radial bin. Accumulation is
//! fork-join parallel over a fixed slot count with static contiguous
//! chunks per slot, then reduced slot-wise, rank-wise, normalized at
//! the root, and broadcast so every rank ends with identical data.

use crate::accumulator::{static_chunk, SlotAccumulator};
use granule_amr::hierarchy::PatchHierarchy;
use granule_amr::time::{resolve_time_interp, TimeInterp};
use granule_math::binning::RadialBinning;
use granule_math::interp::interpolate_mean_std;
use granule_types::collective::Collective;
use granule_types::constants::{DENSITY, PATCH_SIZE};
use granule_types::error::{GranuleError, GranuleResult};
use granule_types::profile::{Profile, ProfileWithSigma};
use rayon::prelude::*;

/// Which patches of a level contribute cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchSelect {
    Leaf,
    NonLeaf,
    Both,
    /// Leaf patches on every targeted level plus non-leaf patches on
    /// the highest targeted level only.
    LeafPlusMaxLevelNonLeaf,
}

/// Field families a profile can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSelector {
    Density,
}

/// Parameters of one correlation computation.
#[derive(Debug, Clone)]
pub struct CorrelationConfig {
    pub center: [f64; 3],
    /// Requested maximum radius; the realized radius is the right edge
    /// of the last allocated bin and generally differs.
    pub max_radius: f64,
    pub min_bin_width: f64,
    pub log_bin: bool,
    pub log_bin_ratio: f64,
    pub remove_empty: bool,
    pub fields: Vec<FieldSelector>,
    pub min_level: usize,
    pub max_level: usize,
    pub patch_select: PatchSelect,
    /// Target physical time for the intrinsic field; negative disables
    /// temporal interpolation and reads the primary buffer slot.
    pub prep_time: f64,
    /// Uniform bin width of the reference profiles.
    pub reference_bin_width: f64,
    /// Number of parallel accumulation slots; `0` defers to the rayon
    /// worker count. A fixed slot count pins the accumulation order,
    /// and therefore the floating-point result, across runs.
    pub n_slots: usize,
}

/// Compute the correlation profiles described by `cfg`.
///
/// Every rank sweeps its own patches; after the collective reduction
/// and broadcast all ranks return identical, normalized profiles.
pub fn compute_correlation<C: Collective>(
    hierarchy: &PatchHierarchy,
    references: &[&ProfileWithSigma],
    cfg: &CorrelationConfig,
    comm: &C,
) -> GranuleResult<Vec<Profile>> {
    validate(hierarchy, references, cfg)?;

    let bins = if cfg.log_bin {
        RadialBinning::log(cfg.min_bin_width, cfg.log_bin_ratio)?
    } else {
        RadialBinning::linear(cfg.min_bin_width)?
    };
    let nbin = bins.bin_count(cfg.max_radius)?;
    let realized_max = bins.realized_max_radius(nbin);
    // Interpolation reads up to the last reference bin center, so the
    // reference must reach half a bin past the realized radius.
    let reference_reach = realized_max + 0.5 * cfg.reference_bin_width;
    for (p, reference) in references.iter().enumerate() {
        if reference_reach > reference.max_radius {
            return Err(GranuleError::ConfigError(format!(
                "Realized max radius {realized_max:.7e} plus half a reference bin exceeds \
                 reference profile {p}'s extent {:.7e}",
                reference.max_radius
            )));
        }
    }

    let n_profiles = cfg.fields.len();
    let mut profiles = Vec::with_capacity(n_profiles);
    for _ in 0..n_profiles {
        let mut profile = Profile::allocate(
            cfg.center,
            realized_max,
            cfg.log_bin,
            if cfg.log_bin { cfg.log_bin_ratio } else { 1.0 },
            nbin,
        )?;
        for b in 0..nbin {
            profile.radius[b] = bins.bin_radius(b);
        }
        profiles.push(profile);
    }

    let n_slots = if cfg.n_slots == 0 {
        rayon::current_num_threads()
    } else {
        cfg.n_slots
    };
    let mut arena = SlotAccumulator::new(n_slots, n_profiles, nbin)?;
    accumulate(hierarchy, references, cfg, &bins, nbin, realized_max, &mut arena)?;
    arena.reduce_into(&mut profiles)?;

    // Rank reduction: sums land at the root, which alone normalizes,
    // then everything is replicated back out.
    for profile in &mut profiles {
        comm.reduce_sum_f64(&mut profile.data)?;
        comm.reduce_sum_f64(&mut profile.weight)?;
        comm.reduce_sum_i64(&mut profile.ncell)?;
    }
    if comm.is_root() {
        for profile in &mut profiles {
            for b in 0..nbin {
                // Empty bins keep data = weight = 0.
                if profile.ncell[b] > 0 {
                    profile.data[b] /= profile.weight[b];
                }
            }
        }
    }
    for profile in &mut profiles {
        comm.broadcast_f64(&mut profile.data)?;
        comm.broadcast_f64(&mut profile.weight)?;
        comm.broadcast_i64(&mut profile.ncell)?;
    }

    if cfg.remove_empty {
        remove_empty_bins(&mut profiles, &bins);
    }

    Ok(profiles)
}

fn validate(
    hierarchy: &PatchHierarchy,
    references: &[&ProfileWithSigma],
    cfg: &CorrelationConfig,
) -> GranuleResult<()> {
    #[cfg(debug_assertions)]
    {
        if cfg.max_radius <= 0.0 {
            return Err(GranuleError::ConfigError(format!(
                "max_radius ({:.7e}) <= 0",
                cfg.max_radius
            )));
        }
        if cfg.min_bin_width <= 0.0 {
            return Err(GranuleError::ConfigError(format!(
                "min_bin_width ({:.7e}) <= 0",
                cfg.min_bin_width
            )));
        }
        if cfg.log_bin && cfg.log_bin_ratio <= 1.0 {
            return Err(GranuleError::ConfigError(format!(
                "log_bin_ratio ({:.7e}) <= 1",
                cfg.log_bin_ratio
            )));
        }
        if cfg.max_level > hierarchy.top_level() {
            return Err(GranuleError::ConfigError(format!(
                "max_level ({}) > top level ({})",
                cfg.max_level,
                hierarchy.top_level()
            )));
        }
        if cfg.min_level > cfg.max_level {
            return Err(GranuleError::ConfigError(format!(
                "min_level ({}) > max_level ({})",
                cfg.min_level, cfg.max_level
            )));
        }
    }

    // Cross-cutting field checks are kept in every build.
    if cfg.fields.len() != hierarchy.layout.n_passive {
        return Err(GranuleError::ConfigError(format!(
            "Profile count ({}) != passive scalar count ({}); each profile pairs one intrinsic \
             field with one passive scalar",
            cfg.fields.len(),
            hierarchy.layout.n_passive
        )));
    }
    if cfg.fields.first() != Some(&FieldSelector::Density) {
        return Err(GranuleError::ConfigError(
            "Only the density field family is supported for correlation profiles".to_string(),
        ));
    }
    if references.len() != cfg.fields.len() {
        return Err(GranuleError::ConfigError(format!(
            "Reference profile count ({}) != field count ({})",
            references.len(),
            cfg.fields.len()
        )));
    }
    if !(cfg.reference_bin_width.is_finite() && cfg.reference_bin_width > 0.0) {
        return Err(GranuleError::ConfigError(format!(
            "reference_bin_width ({:.7e}) must be finite > 0",
            cfg.reference_bin_width
        )));
    }
    Ok(())
}

fn keep_patch(is_leaf: bool, select: PatchSelect, lv: usize, max_level: usize) -> bool {
    if is_leaf {
        select != PatchSelect::NonLeaf
    } else {
        match select {
            PatchSelect::Leaf => false,
            PatchSelect::LeafPlusMaxLevelNonLeaf => lv == max_level,
            PatchSelect::NonLeaf | PatchSelect::Both => true,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn accumulate(
    hierarchy: &PatchHierarchy,
    references: &[&ProfileWithSigma],
    cfg: &CorrelationConfig,
    bins: &RadialBinning,
    nbin: usize,
    realized_max: f64,
    arena: &mut SlotAccumulator,
) -> GranuleResult<()> {
    let n_profiles = cfg.fields.len();
    let r_max2 = realized_max * realized_max;
    let half_box = hierarchy.geometry.half_box();
    let box_size = hierarchy.geometry.box_size;
    let periodic = hierarchy.geometry.periodic;
    let n_slots = arena.n_slots();

    for lv in cfg.min_level..=cfg.max_level {
        let level = hierarchy.level(lv)?;
        let dh = hierarchy.geometry.cell_width(lv);
        let dv = dh * dh * dh;

        let interp = if cfg.prep_time >= 0.0 {
            resolve_time_interp(level, cfg.prep_time)?
        } else {
            TimeInterp::Slot(level.active_sg)
        };
        let n_real = level.n_real();

        arena
            .slots_mut()
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(slot, state)| -> GranuleResult<()> {
                let mut mean = vec![0.0; n_profiles];
                let mut std = vec![0.0; n_profiles];
                let mut passive = vec![0.0; n_profiles];

                for pid in static_chunk(slot, n_slots, n_real) {
                    let patch = &level.patches[pid];
                    if !keep_patch(patch.is_leaf(), cfg.patch_select, lv, cfg.max_level) {
                        continue;
                    }

                    let block = patch.field(interp.primary_slot())?;
                    let block_int = match interp {
                        TimeInterp::Blend { sg_int, .. } => Some(patch.field(sg_int)?),
                        TimeInterp::Slot(_) => None,
                    };

                    let x0 = patch.edge_lo[0] + 0.5 * dh - cfg.center[0];
                    let y0 = patch.edge_lo[1] + 0.5 * dh - cfg.center[1];
                    let z0 = patch.edge_lo[2] + 0.5 * dh - cfg.center[2];

                    for k in 0..PATCH_SIZE {
                        let mut dz = z0 + k as f64 * dh;
                        if periodic[2] {
                            if dz > half_box[2] {
                                dz -= box_size[2];
                            } else if dz < -half_box[2] {
                                dz += box_size[2];
                            }
                        }
                        for j in 0..PATCH_SIZE {
                            let mut dy = y0 + j as f64 * dh;
                            if periodic[1] {
                                if dy > half_box[1] {
                                    dy -= box_size[1];
                                } else if dy < -half_box[1] {
                                    dy += box_size[1];
                                }
                            }
                            for i in 0..PATCH_SIZE {
                                let mut dx = x0 + i as f64 * dh;
                                if periodic[0] {
                                    if dx > half_box[0] {
                                        dx -= box_size[0];
                                    } else if dx < -half_box[0] {
                                        dx += box_size[0];
                                    }
                                }

                                let r2 = dx * dx + dy * dy + dz * dz;
                                if r2 >= r_max2 {
                                    continue;
                                }
                                let r = r2.sqrt();
                                let bin = bins.bin_index(r);
                                // Absorb round-off at the outer edge.
                                if bin >= nbin {
                                    continue;
                                }

                                // Reference profiles always use linear
                                // spacing, whatever our own mode is.
                                let bin_ref = (r / cfg.reference_bin_width) as usize;
                                interpolate_mean_std(references, bin_ref, r, &mut mean, &mut std)?;

                                for (p, value) in passive.iter_mut().enumerate() {
                                    let comp = hierarchy.layout.passive_index(p);
                                    *value = block.value(comp, k, j, i);
                                }

                                for p in 0..n_profiles {
                                    let intrinsic = match interp {
                                        TimeInterp::Blend {
                                            weight, weight_int, ..
                                        } => {
                                            let b_int = block_int
                                                .as_ref()
                                                .ok_or_else(|| GranuleError::ConfigError(
                                                    "Blend requested without secondary field \
                                                     block"
                                                        .to_string(),
                                                ))?;
                                            weight * block.value(DENSITY, k, j, i)
                                                + weight_int * b_int.value(DENSITY, k, j, i)
                                        }
                                        TimeInterp::Slot(_) => block.value(DENSITY, k, j, i),
                                    };

                                    let delta = intrinsic - mean[p];
                                    let delta_passive = passive[p] - mean[p];
                                    // Degenerate reference spread falls
                                    // back to the squared mean.
                                    let normalizer = if std[p] > 0.0 {
                                        std[p] * std[p]
                                    } else {
                                        mean[p] * mean[p]
                                    };
                                    state.profiles[p].deposit(
                                        bin,
                                        delta * delta_passive / normalizer * dv,
                                        dv,
                                    );
                                }
                            }
                        }
                    }
                }
                Ok(())
            })?;
    }
    Ok(())
}

/// Excise zero-cell bins, shifting later bins down, and recompute the
/// realized max radius from the surviving last bin. The cell-count
/// pattern is identical on every rank after the broadcast, so all
/// ranks compact identically without further communication.
pub fn remove_empty_bins(profiles: &mut [Profile], bins: &RadialBinning) {
    if profiles.is_empty() {
        return;
    }
    let keep: Vec<bool> = profiles[0].ncell.iter().map(|&n| n != 0).collect();
    for profile in profiles.iter_mut() {
        let mut b = 0usize;
        profile.radius.retain(|_| {
            let k = keep[b];
            b += 1;
            k
        });
        let mut b = 0usize;
        profile.data.retain(|_| {
            let k = keep[b];
            b += 1;
            k
        });
        let mut b = 0usize;
        profile.weight.retain(|_| {
            let k = keep[b];
            b += 1;
            k
        });
        let mut b = 0usize;
        profile.ncell.retain(|_| {
            let k = keep[b];
            b += 1;
            k
        });

        profile.max_radius = match profile.radius.last() {
            Some(&last) => {
                if profile.log_bin {
                    last * profile.log_bin_ratio.sqrt()
                } else {
                    last + 0.5 * bins.min_bin_width()
                }
            }
            // Every bin was empty.
            None => 0.0,
        };
    }
}
