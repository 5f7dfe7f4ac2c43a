use std::{panic, thread};

/// Applies `f` to every item on up to `workers` scoped threads.
///
/// Items are split into contiguous chunks, one per thread, and results come back in input
/// order. A panic in a worker is resumed on the calling thread.
pub(crate) fn map_ordered<T, U, F>(items: Vec<T>, workers: usize, f: F) -> Vec<U>
where
    T: Send,
    U: Send,
    F: Fn(T) -> U + Sync,
{
    if workers <= 1 || items.len() <= 1 {
        return items.into_iter().map(f).collect();
    }

    let chunk_size = items.len().div_ceil(workers);
    let mut items = items.into_iter();
    let mut chunks = vec![];
    loop {
        let chunk = items.by_ref().take(chunk_size).collect::<Vec<_>>();
        if chunk.is_empty() {
            break;
        }
        chunks.push(chunk);
    }

    let f = &f;
    thread::scope(|s| {
        let handles = chunks
            .into_iter()
            .map(|chunk| s.spawn(move || chunk.into_iter().map(f).collect::<Vec<_>>()))
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload))
            })
            .collect()
    })
}
