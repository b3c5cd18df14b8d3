use crate::constants::MAX_BATCH_SIZE;

/// Index of the batch that element `index` lands in
pub fn target_index(
    size: usize,
    index: usize,
) -> usize {
    index / size.max(1)
}

/// Split `ops` into batches of at most [`MAX_BATCH_SIZE`] elements
pub fn partition<T>(ops: Vec<T>) -> Vec<Vec<T>> {
    partition_with_size(ops, MAX_BATCH_SIZE)
}

/// Split `ops` into batches of at most `size` elements.
///
/// Empty input yields no batch at all. Order is preserved and every element
/// ends up in exactly one batch; only the last batch may be short. A `size`
/// of zero is treated as one.
pub fn partition_with_size<T>(
    ops: Vec<T>,
    size: usize,
) -> Vec<Vec<T>> {
    let size = size.max(1);
    if ops.is_empty() {
        return Vec::new();
    }
    if ops.len() <= size {
        return vec![ops];
    }

    let mut batches: Vec<Vec<T>> = Vec::with_capacity(ops.len().div_ceil(size));
    for (index, op) in ops.into_iter().enumerate() {
        if target_index(size, index) == batches.len() {
            batches.push(Vec::with_capacity(size));
        }
        if let Some(batch) = batches.last_mut() {
            batch.push(op);
        }
    }
    batches
}
