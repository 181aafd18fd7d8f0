// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Collective Operations
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Rank-collective reduction and broadcast seams.
//!
//! The refinement and profile pipelines are written against this trait
//! so they stay rank-agnostic. [`LocalCollective`] is the serial
//! reference implementation; wiring the same trait to rsmpi is a 1:1
//! swap of `reduce`/`broadcast` bodies for `MPI_Reduce`/`MPI_Bcast`.

use crate::error::{GranuleError, GranuleResult};

/// Collective operations over the set of participating ranks.
///
/// All methods are collective calls: every rank must enter them in the
/// same order with buffers of the same length, as with MPI. Reductions
/// deliver the combined result at the root rank only; non-root buffers
/// are left in an unspecified partial state and must be refreshed via
/// the matching broadcast.
pub trait Collective {
    fn rank(&self) -> usize;
    fn n_ranks(&self) -> usize;

    fn is_root(&self) -> bool {
        self.rank() == 0
    }

    /// Element-wise sum into the root rank's buffer.
    fn reduce_sum_f64(&self, buf: &mut [f64]) -> GranuleResult<()>;

    /// Element-wise sum into the root rank's buffer.
    fn reduce_sum_i64(&self, buf: &mut [i64]) -> GranuleResult<()>;

    /// Replicate the root rank's buffer to every rank.
    fn broadcast_f64(&self, buf: &mut [f64]) -> GranuleResult<()>;

    /// Replicate the root rank's buffer to every rank.
    fn broadcast_i64(&self, buf: &mut [i64]) -> GranuleResult<()>;

    /// Logical OR across all ranks, result delivered to every rank.
    fn allreduce_or(&self, value: bool) -> GranuleResult<bool>;
}

/// Single-rank reference implementation.
///
/// Reductions and broadcasts are identities on one rank, so the only
/// work left is the same buffer validation the MPI build would perform
/// before posting the collective.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCollective;

impl LocalCollective {
    fn check_nonempty(&self, len: usize, op: &str) -> GranuleResult<()> {
        if len == 0 {
            return Err(GranuleError::Collective(format!(
                "{op} called with an empty buffer"
            )));
        }
        Ok(())
    }
}

impl Collective for LocalCollective {
    fn rank(&self) -> usize {
        0
    }

    fn n_ranks(&self) -> usize {
        1
    }

    fn reduce_sum_f64(&self, buf: &mut [f64]) -> GranuleResult<()> {
        self.check_nonempty(buf.len(), "reduce_sum_f64")
    }

    fn reduce_sum_i64(&self, buf: &mut [i64]) -> GranuleResult<()> {
        self.check_nonempty(buf.len(), "reduce_sum_i64")
    }

    fn broadcast_f64(&self, buf: &mut [f64]) -> GranuleResult<()> {
        self.check_nonempty(buf.len(), "broadcast_f64")
    }

    fn broadcast_i64(&self, buf: &mut [i64]) -> GranuleResult<()> {
        self.check_nonempty(buf.len(), "broadcast_i64")
    }

    fn allreduce_or(&self, value: bool) -> GranuleResult<bool> {
        Ok(value)
    }
}
