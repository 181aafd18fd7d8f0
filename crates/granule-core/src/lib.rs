// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Correlation Pipeline
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Radial correlation profiles over the patch hierarchy: parallel
//! per-cell accumulation, thread and rank reduction, normalization,
//! and empty-bin compaction.

pub mod accumulator;
pub mod correlation;
