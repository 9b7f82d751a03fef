//! Final bounds on a reclaim request.

/// Reclaim requests are issued in whole pages.
pub const PAGE_SIZE: u64 = 4096;

/// Clamp `size` into the per-tick bounds and align it down to a page.
///
/// Returns `0` when `size` is below `iterate_min`; otherwise the result
/// is a multiple of [`PAGE_SIZE`] no larger than `iterate_max`.
pub fn finalize(size: u64, iterate_min: u64, iterate_max: u64) -> u64 {
    if size < iterate_min {
        return 0;
    }

    size.min(iterate_max) & !(PAGE_SIZE - 1)
}
