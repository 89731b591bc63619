//! Batch boundaries for splitting scenario work across workers.

/// Splits `total` scenarios into at most `workers` contiguous `[start, end)`
/// ranges whose sizes differ by at most one; the leading ranges absorb the
/// remainder.
///
/// # Example
/// ```
/// # use wardroom::parallel::batch_ranges;
/// assert_eq!(batch_ranges(7, 3), vec![(0, 3), (3, 5), (5, 7)]);
/// ```
pub fn batch_ranges(total: usize, workers: usize) -> Vec<(usize, usize)> {
    let batches = workers.min(total);
    if batches == 0 {
        return Vec::new();
    }
    let (size, extra) = (total / batches, total % batches);
    (0..batches)
        .scan(0, |start, index| {
            let end = *start + size + usize::from(index < extra);
            let range = (*start, end);
            *start = end;
            Some(range)
        })
        .collect()
}
