/*!
 * Tiling Properties
 * Attribution arithmetic checked over generated objects
 */

use heapspy::gcspy::{Subspace, TileAccumulator};
use proptest::prelude::*;

const TILES: usize = 64;

proptest! {
    #[test]
    fn boundary_aligned_object_touches_k_plus_one_tiles(
        tile_size in 1usize..512,
        start_tile in 0usize..8,
        k in 0usize..16,
        r in 0usize..512,
    ) {
        let r = r % tile_size;
        prop_assume!(k > 0 || r > 0);

        let subspace = Subspace::new(0, 0, 0, tile_size, 0);
        let mut acc = TileAccumulator::new(TILES, tile_size, 0);
        let addr = start_tile * tile_size;
        acc.record(&subspace, addr, k * tile_size + r);

        let touched: Vec<usize> = acc
            .tiles()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.used_bytes > 0)
            .map(|(i, _)| i)
            .collect();
        let expected = k + usize::from(r > 0);
        prop_assert_eq!(touched.len(), expected);
        prop_assert_eq!(touched.first().copied(), Some(start_tile));

        for &i in &touched[..k] {
            prop_assert_eq!(acc.tiles()[i].used_bytes, tile_size);
        }
        if r > 0 {
            prop_assert_eq!(acc.tiles()[start_tile + k].used_bytes, r);
        }
    }

    #[test]
    fn unclamped_tiles_sum_to_total(
        objects in prop::collection::vec((0usize..4096, 1usize..300), 1..24),
    ) {
        let tile_size = 128;
        let subspace = Subspace::new(0, 0, 0, tile_size, 0);
        // Per-tile cap well above anything reachable, so nothing clamps
        let mut acc = TileAccumulator::new(TILES, usize::MAX, 0);

        for &(addr, size) in &objects {
            acc.record(&subspace, addr, size);
        }

        let expected: usize = objects.iter().map(|&(_, size)| size).sum();
        let tiled: usize = acc.tiles().iter().map(|t| t.used_bytes).sum();
        prop_assert_eq!(acc.total_used_bytes(), expected as u64);
        prop_assert_eq!(tiled, expected);
        prop_assert_eq!(acc.total_objects(), objects.len() as u64);
        prop_assert_eq!(acc.stats().clamped_tiles, 0);

        let highest = objects.iter().map(|&(addr, _)| addr).max();
        prop_assert_eq!(acc.highest_observed(), highest);
    }

    #[test]
    fn index_and_remaining_agree(
        start in 0usize..1 << 20,
        tile_size in 1usize..4096,
        offset in 0usize..1 << 16,
    ) {
        let subspace = Subspace::new(start, start, 0, tile_size, 0);
        let addr = start + offset;
        let index = subspace.index_for_address(addr).unwrap();
        let remaining = subspace.remaining_in_tile(addr);

        prop_assert!(remaining >= 1 && remaining <= tile_size);
        prop_assert_eq!(subspace.index_for_address(addr + remaining - 1), Some(index));
        prop_assert_eq!(subspace.index_for_address(addr + remaining), Some(index + 1));
        if start > 0 {
            prop_assert_eq!(subspace.index_for_address(start - 1), None);
        }
    }
}
