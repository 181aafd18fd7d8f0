// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

/// Cells per patch side. Patches are cubical blocks of
/// `PATCH_SIZE`³ cells at every refinement level.
pub const PATCH_SIZE: usize = 8;

/// Cells per patch.
pub const PATCH_CELLS: usize = PATCH_SIZE * PATCH_SIZE * PATCH_SIZE;

/// Children spawned per refined patch (one per octant).
pub const NUM_OCTANTS: usize = 8;

/// Son index of a leaf patch.
pub const SON_NONE: i64 = -1;

/// Octant corner offsets of the eight children of a refined patch, in
/// units of the child-level patch scale. The creation order is part of
/// the refinement contract: a parent's son index points at the first of
/// eight consecutive children laid out in exactly this order.
pub const OCTANT_OFFSETS: [[i64; 3]; NUM_OCTANTS] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 1, 0],
    [0, 1, 1],
    [1, 0, 1],
    [1, 1, 1],
];

/// Bookkeeping markers per level: marker `m` is the end index of patch
/// category `m` in the level's patch vector (category 1 bounds the real
/// patches; the remaining categories are the buffer-patch sectors filled
/// in by the load-balancing layer).
pub const PATCH_MARKERS: usize = 28;

/// Index of the real-patch end marker.
pub const REAL_MARKER: usize = 1;

/// Intrinsic component index of the density field.
pub const DENSITY: usize = 0;
