// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Refinement Engine
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Level refinement: every flagged real patch on a level spawns the
//! eight octant children on the next level.
//!
//! Flagging itself is a caller concern; this engine consumes the flags
//! and materializes children, parent↔child links, particle handoff,
//! and the hybrid wave-flag promotion. Failures leave no rolled-back
//! state and must not be retried.

use crate::hierarchy::PatchHierarchy;
use granule_types::collective::Collective;
use granule_types::config::SolverScheme;
use granule_types::constants::OCTANT_OFFSETS;
use granule_types::error::{GranuleError, GranuleResult};

/// Collaborator redistributing a refined parent's particle payload to
/// its new children.
pub trait ParticleMigrator {
    fn transfer_to_children(&mut self, level: usize, parent_id: usize) -> GranuleResult<()>;
}

/// No-op migrator for runs without particles.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParticles;

impl ParticleMigrator for NoParticles {
    fn transfer_to_children(&mut self, _level: usize, _parent_id: usize) -> GranuleResult<()> {
        Ok(())
    }
}

/// Refine level `lv`, creating patches on `lv + 1`.
///
/// Children are created in increasing parent order, eight consecutive
/// ids per parent, so a parent's `son` index addresses the first of
/// its block. After all parents are processed the new level's markers
/// are committed and the child level's wave flag is agreed across
/// ranks (flag promotion depends on local per-patch state, which may
/// differ between ranks).
pub fn refine_level<C: Collective>(
    hierarchy: &mut PatchHierarchy,
    lv: usize,
    alloc_data: bool,
    particles: &mut dyn ParticleMigrator,
    comm: &C,
) -> GranuleResult<()> {
    if lv >= hierarchy.top_level() {
        return Err(GranuleError::ConfigError(format!(
            "Cannot refine the maximum level {lv}"
        )));
    }
    let son_lv = lv + 1;
    let n_sons = hierarchy.level(son_lv)?.n_total();
    if n_sons != 0 {
        return Err(GranuleError::ConfigError(format!(
            "Number of son patches on level {son_lv} = {n_sons} != 0"
        )));
    }

    let hybrid = hierarchy.scheme == SolverScheme::Hybrid;
    let pscale = hierarchy.patch_scale(son_lv);
    let n_real = hierarchy.level(lv)?.n_real();

    for pid in 0..n_real {
        let (flagged, corner, switch_to_wave) = {
            let patch = &hierarchy.level(lv)?.patches[pid];
            (patch.flag, patch.corner, patch.switch_to_wave)
        };
        if !flagged {
            continue;
        }

        // Parent's son points at the first child created below.
        let first_son = hierarchy.level(son_lv)?.n_total() as i64;
        hierarchy.level_mut(lv)?.patches[pid].son = first_son;

        for offset in OCTANT_OFFSETS {
            let child_corner = [
                corner[0] + offset[0] * pscale,
                corner[1] + offset[1] * pscale,
                corner[2] + offset[2] * pscale,
            ];
            hierarchy.new_patch(son_lv, child_corner, pid as i64, alloc_data)?;
        }

        particles.transfer_to_children(lv, pid)?;

        if hybrid {
            if switch_to_wave {
                hierarchy.level_mut(son_lv)?.use_wave_flag = true;
            }
            if hierarchy.level(lv)?.use_wave_flag {
                hierarchy.level_mut(son_lv)?.use_wave_flag = true;
            }
        }
    }

    hierarchy.commit_level(son_lv)?;

    if hybrid {
        let local = hierarchy.level(son_lv)?.use_wave_flag;
        let global = comm.allreduce_or(local)?;
        hierarchy.level_mut(son_lv)?.use_wave_flag = global;
    }

    Ok(())
}
