use crate::error::{Result, WeaveError};

/// Consecutive chunks of at most `max` items covering `items` in order.
pub fn split_batches<T>(items: &[T], max: usize) -> Result<Vec<&[T]>> {
    if max == 0 {
        return Err(WeaveError::InvalidBatchSize(max));
    }
    Ok(items.chunks(max).collect())
}

/// Unit name of batch `index` out of `count`; only multi-batch output is suffixed.
pub fn batch_unit_name(base: &str, index: usize, count: usize) -> String {
    if count <= 1 {
        return format!("{base}.go");
    }
    format!("{base}_{index}.go")
}
