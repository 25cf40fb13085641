//! 배치 처리 유틸리티

/// 슬라이스를 `batch_size` 크기로 나누어 순서대로 `f`를 호출합니다.
///
/// 마지막 배치는 `batch_size`보다 작을 수 있습니다.
/// `batch_size`가 0이면 전체를 하나의 배치로 처리하며, 빈 슬라이스는 호출하지 않습니다.
///
/// ```rust,ignore
/// use backend_utils::utils::batch::do_batches;
///
/// let ids: Vec<u64> = (1..=250).collect();
/// do_batches(&ids, 100, |chunk| {
///     log::info!("deleting {} rows", chunk.len());   // 100, 100, 50
/// });
/// ```
pub fn do_batches<T, F>(items: &[T], batch_size: usize, mut f: F)
where
    F: FnMut(&[T]),
{
    if items.is_empty() {
        return;
    }
    if batch_size == 0 {
        f(items);
        return;
    }
    for chunk in items.chunks(batch_size) {
        f(chunk);
    }
}

/// [`do_batches`]의 실패 가능 버전. 첫 에러에서 중단합니다.
pub fn try_do_batches<T, E, F>(items: &[T], batch_size: usize, mut f: F) -> Result<(), E>
where
    F: FnMut(&[T]) -> Result<(), E>,
{
    if items.is_empty() {
        return Ok(());
    }
    if batch_size == 0 {
        return f(items);
    }
    for chunk in items.chunks(batch_size) {
        f(chunk)?;
    }
    Ok(())
}
