// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Property-Based Tests (proptest) for granule-core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for the accumulation arena: the static chunk
//! map must partition any workload, and reduction must be independent
//! of how deposits were spread across slots.

use granule_core::accumulator::{static_chunk, SlotAccumulator};
use granule_types::profile::Profile;
use proptest::prelude::*;

proptest! {
    /// Chunks tile `0..n` exactly, in slot order, with sizes differing
    /// by at most one.
    #[test]
    fn static_chunks_tile_the_workload(n in 0usize..10_000, n_slots in 1usize..64) {
        let mut cursor = 0usize;
        let base = n / n_slots;
        for s in 0..n_slots {
            let chunk = static_chunk(s, n_slots, n);
            prop_assert_eq!(chunk.start, cursor);
            prop_assert!(chunk.len() == base || chunk.len() == base + 1);
            cursor = chunk.end;
        }
        prop_assert_eq!(cursor, n);
    }

    /// The chunk map depends only on (slot, n_slots, n), never on any
    /// runtime state: two lookups agree.
    #[test]
    fn static_chunk_is_pure(s in 0usize..64, n_slots in 1usize..64, n in 0usize..10_000) {
        prop_assume!(s < n_slots);
        prop_assert_eq!(static_chunk(s, n_slots, n), static_chunk(s, n_slots, n));
    }

    /// Reducing slot-spread integer deposits recovers the plain sums,
    /// whatever slot each deposit landed in.
    #[test]
    fn reduction_matches_sequential_sums(
        deposits in prop::collection::vec((0usize..6, 0usize..4, 1u32..100), 0..64),
        n_slots in 1usize..6,
    ) {
        let mut arena = SlotAccumulator::new(n_slots, 2, 4).expect("arena");
        let mut expected_data = [[0.0f64; 4]; 2];
        let mut expected_ncell = [[0i64; 4]; 2];

        for (k, &(slot, bin, value)) in deposits.iter().enumerate() {
            let slot = slot % n_slots;
            let profile = k % 2;
            arena.slots_mut()[slot].profiles[profile].deposit(bin, value as f64, 1.0);
            expected_data[profile][bin] += value as f64;
            expected_ncell[profile][bin] += 1;
        }

        let mut profiles: Vec<Profile> = (0..2)
            .map(|_| Profile::allocate([0.0; 3], 4.0, false, 1.0, 4).expect("profile"))
            .collect();
        arena.reduce_into(&mut profiles).expect("reduce");

        for p in 0..2 {
            // Integer-valued deposits sum exactly in f64.
            prop_assert_eq!(&profiles[p].data[..], &expected_data[p][..]);
            prop_assert_eq!(&profiles[p].ncell[..], &expected_ncell[p][..]);
            for b in 0..4 {
                prop_assert_eq!(profiles[p].weight[b], expected_ncell[p][b] as f64);
            }
        }
    }
}
