//! Capacity table for the slot array

/// Prime capacities, each roughly double the one before.
///
/// Prime capacities keep `hash % capacity` from collapsing onto a few residues when
/// hash values share low bits.
const GOOD_SIZES: [usize; 31] = [
    5, 11, 23, 53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196_613,
    393_241, 786_433, 1_572_869, 3_145_739, 6_291_469, 12_582_917, 25_165_843, 50_331_653,
    100_663_319, 201_326_611, 402_653_189, 805_306_457, 1_610_612_741, 3_221_225_473,
    4_294_967_291,
];

/// Returns the smallest good capacity that is at least `requested`.
///
/// Past the end of the prime table the result is the smallest odd number not below
/// `requested`, so the function stays monotonic and never returns less than its
/// argument.
#[must_use]
pub fn next_good_size(requested: usize) -> usize {
    let position = GOOD_SIZES.partition_point(|&size| size < requested);
    match GOOD_SIZES.get(position) {
        Some(&size) => size,
        None => requested | 1,
    }
}
