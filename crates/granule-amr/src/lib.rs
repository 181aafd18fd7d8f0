// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Patch Hierarchy
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Octree patch hierarchy: cubical grid blocks, per-level bookkeeping,
//! refinement, and field-slot time resolution.

pub mod hierarchy;
pub mod patch;
pub mod refine;
pub mod time;
