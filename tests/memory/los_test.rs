/*!
 * Large Object Space Test
 * Superpage allocation, coalescing and the allocation size oracle
 */

use heapspy::{AllocationOracle, LargeObjectSpace, MemoryError};

const PAGE: usize = 4096;
const START: usize = 0x4000_0000;

fn space(pages: usize) -> LargeObjectSpace {
    LargeObjectSpace::new(START, START + pages * PAGE, PAGE, PAGE)
}

#[test]
fn test_sizes_are_page_multiples() {
    let los = space(256);
    for size in [PAGE, PAGE + 1, 3 * PAGE - 1, 10 * PAGE + 7] {
        let addr = los.allocate(size).expect("space available");
        let reported = los.allocation_size(addr).expect("allocated");
        assert_eq!(reported % PAGE, 0);
        assert!(reported >= size);
        assert!(reported - size < PAGE);
    }
}

#[test]
fn test_unaligned_bounds_are_trimmed() {
    let los = LargeObjectSpace::new(START + 1, START + 8 * PAGE - 1, PAGE, PAGE);
    assert_eq!(los.start(), START + PAGE);
    assert_eq!(los.end(), START + 7 * PAGE);
    assert_eq!(los.stats().capacity_bytes, 6 * PAGE);
}

#[test]
fn test_adjacent_frees_coalesce() {
    let los = space(16);
    let a = los.allocate(2 * PAGE).unwrap();
    let b = los.allocate(2 * PAGE).unwrap();
    let _c = los.allocate(2 * PAGE).unwrap();

    los.free(a).unwrap();
    los.free(b).unwrap();
    assert_eq!(los.stats().free_runs, 1);

    // The merged hole fits a four page object at the old address
    assert_eq!(los.allocate(4 * PAGE).unwrap(), a);
}

#[test]
fn test_freeing_the_tail_returns_pages_to_frontier() {
    let los = space(8);
    let a = los.allocate(4 * PAGE).unwrap();
    let b = los.allocate(4 * PAGE).unwrap();
    assert!(matches!(
        los.allocate(PAGE),
        Err(MemoryError::OutOfMemory { available: 0, .. })
    ));

    los.free(b).unwrap();
    assert_eq!(los.stats().free_runs, 0);
    assert_eq!(los.allocate(4 * PAGE).unwrap(), b);
    assert!(a < b);
}

#[test]
fn test_objects_in_address_order() {
    let los = space(32);
    let addrs: Vec<usize> = (1..=4).map(|n| los.allocate(n * PAGE).unwrap()).collect();
    los.free(addrs[1]).unwrap();

    assert_eq!(los.objects(), vec![addrs[0], addrs[2], addrs[3]]);
    assert_eq!(los.stats().superpages, 3);
}

#[test]
fn test_closure_oracle() {
    let oracle = |addr: usize| (addr % PAGE == 0).then_some(PAGE);
    assert_eq!(oracle.allocation_size(2 * PAGE), Some(PAGE));
    assert_eq!(oracle.allocation_size(7), None);
}
