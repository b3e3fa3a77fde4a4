//! The paging data-loader contract and its backend-agnostic implementations.

use crate::error::DataError;
use crate::eval::PropertyAccess;
use crate::filter::Filter;
use crate::range::RowRange;
use crate::sort::SortClause;
use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Fetches filtered, sorted pages of `T` from some backend.
///
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait`
/// needed.
///
/// Implementations must return items matching `filter` (`None` meaning every
/// item), ordered by `sort_by` (first clause primary) and sliced to `range`.
/// `count` ignores paging.
pub trait DataLoader<T>: Send + Sync {
    fn fetch(
        &self,
        filter: Option<&Filter>,
        sort_by: &[SortClause],
        range: RowRange,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;

    fn count(&self, filter: Option<&Filter>) -> impl Future<Output = Result<u64, DataError>> + Send;
}

impl<T, D: DataLoader<T>> DataLoader<T> for Arc<D> {
    fn fetch(
        &self,
        filter: Option<&Filter>,
        sort_by: &[SortClause],
        range: RowRange,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send {
        (**self).fetch(filter, sort_by, range)
    }

    fn count(&self, filter: Option<&Filter>) -> impl Future<Output = Result<u64, DataError>> + Send {
        (**self).count(filter)
    }
}

/// Loader combinators.
pub trait DataLoaderExt<T>: DataLoader<T> + Sized {
    /// Splits every fetch into sub-fetches of at most `limit` rows.
    ///
    /// # Errors
    ///
    /// [`DataError::InvalidArgument`] when `limit` is 0.
    fn overcome_fetch_limit(self, limit: u64) -> Result<FetchLimitOvercomer<Self>, DataError> {
        FetchLimitOvercomer::new(self, limit)
    }

    /// Restricts every request with `filter`, which callers can't remove.
    fn with_filter(self, filter: Filter) -> FilteredDataLoader<Self> {
        FilteredDataLoader::new(self, filter)
    }

    /// Appends `sort_by` to whatever sort the caller requests.
    fn sorted_by(self, sort_by: Vec<SortClause>) -> SortedDataLoader<Self> {
        SortedDataLoader::new(self, sort_by)
    }
}

impl<T, D: DataLoader<T>> DataLoaderExt<T> for D {}

/// Serves a fixed list of records from memory, evaluating filters with
/// [`Filter::test`].
#[derive(Debug, Clone)]
pub struct ListDataLoader<T> {
    items: Arc<Vec<T>>,
}

impl<T> ListDataLoader<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(items),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T> ListDataLoader<T>
where
    T: PropertyAccess + Clone,
{
    fn load(
        &self,
        filter: Option<&Filter>,
        sort_by: &[SortClause],
        range: RowRange,
    ) -> Result<Vec<T>, DataError> {
        let mut matching: Vec<(Vec<Value>, &T)> = Vec::new();
        for item in self.items.iter() {
            if let Some(filter) = filter {
                if !filter.test(item)? {
                    continue;
                }
            }
            let keys = sort_by
                .iter()
                .map(|clause| {
                    item.property(&clause.property).ok_or_else(|| {
                        DataError::InvalidArgument(format!(
                            "cannot sort {} by unknown property `{}`",
                            T::record_name(),
                            clause.property
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            matching.push((keys, item));
        }
        if !sort_by.is_empty() {
            // stable, so equal keys keep list order
            matching.sort_by(|(a, _), (b, _)| compare_keys(a, b, sort_by));
        }
        Ok(matching
            .into_iter()
            .skip(clamp(range.offset()))
            .take(range.limit().map_or(usize::MAX, clamp))
            .map(|(_, item)| item.clone())
            .collect())
    }

    fn count_matching(&self, filter: Option<&Filter>) -> Result<u64, DataError> {
        let Some(filter) = filter else {
            return Ok(self.items.len() as u64);
        };
        let mut count = 0u64;
        for item in self.items.iter() {
            if filter.test(item)? {
                count += 1;
            }
        }
        Ok(count)
    }
}

fn compare_keys(a: &[Value], b: &[Value], sort_by: &[SortClause]) -> Ordering {
    for ((left, right), clause) in a.iter().zip(b).zip(sort_by) {
        let ordering = left.sort_cmp(right);
        let ordering = if clause.ascending { ordering } else { ordering.reverse() };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn clamp(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

impl<T> DataLoader<T> for ListDataLoader<T>
where
    T: PropertyAccess + Clone + Send + Sync,
{
    fn fetch(
        &self,
        filter: Option<&Filter>,
        sort_by: &[SortClause],
        range: RowRange,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send {
        let result = self.load(filter, sort_by, range);
        async move { result }
    }

    fn count(&self, filter: Option<&Filter>) -> impl Future<Output = Result<u64, DataError>> + Send {
        let result = self.count_matching(filter);
        async move { result }
    }
}

/// Overcomes a delegate that returns at most `limit` rows per fetch by
/// issuing sequential sub-fetches and concatenating them.
///
/// Stops early once a sub-fetch comes back short, which marks the end of the
/// data.
pub struct FetchLimitOvercomer<D> {
    delegate: D,
    limit: u64,
}

impl<D> FetchLimitOvercomer<D> {
    pub fn new(delegate: D, limit: u64) -> Result<Self, DataError> {
        if limit == 0 {
            return Err(DataError::InvalidArgument(
                "fetch limit should be 1 or more but was 0".into(),
            ));
        }
        Ok(Self { delegate, limit })
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl<D> fmt::Debug for FetchLimitOvercomer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchLimitOvercomer")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl<T, D> DataLoader<T> for FetchLimitOvercomer<D>
where
    T: Send,
    D: DataLoader<T>,
{
    fn fetch(
        &self,
        filter: Option<&Filter>,
        sort_by: &[SortClause],
        range: RowRange,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send {
        async move {
            let mut result: Vec<T> = Vec::new();
            loop {
                let collected = result.len() as u64;
                let wanted = match range.limit() {
                    Some(limit) => (limit - collected.min(limit)).min(self.limit),
                    None => self.limit,
                };
                if wanted == 0 {
                    break;
                }
                let offset = range.offset().saturating_add(collected);
                let sub_range = RowRange::new(offset, offset.saturating_add(wanted));
                tracing::trace!(range = %sub_range, "Fetching page from delegate");
                let mut page = self.delegate.fetch(filter, sort_by, sub_range).await?;
                page.truncate(clamp(wanted));
                let short = (page.len() as u64) < wanted;
                result.append(&mut page);
                if short {
                    break;
                }
            }
            tracing::debug!(range = %range, fetched = result.len(), "Fetch limit overcome");
            Ok(result)
        }
    }

    fn count(&self, filter: Option<&Filter>) -> impl Future<Output = Result<u64, DataError>> + Send {
        self.delegate.count(filter)
    }
}

/// ANDs a fixed filter into every request.
#[derive(Debug, Clone)]
pub struct FilteredDataLoader<D> {
    delegate: D,
    filter: Filter,
}

impl<D> FilteredDataLoader<D> {
    pub fn new(delegate: D, filter: Filter) -> Self {
        Self { delegate, filter }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    fn combined(&self, filter: Option<&Filter>) -> Filter {
        match filter {
            Some(filter) => self.filter.clone().and(filter.clone()),
            None => self.filter.clone(),
        }
    }
}

impl<T, D> DataLoader<T> for FilteredDataLoader<D>
where
    T: Send,
    D: DataLoader<T>,
{
    fn fetch(
        &self,
        filter: Option<&Filter>,
        sort_by: &[SortClause],
        range: RowRange,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send {
        let combined = self.combined(filter);
        async move { self.delegate.fetch(Some(&combined), sort_by, range).await }
    }

    fn count(&self, filter: Option<&Filter>) -> impl Future<Output = Result<u64, DataError>> + Send {
        let combined = self.combined(filter);
        async move { self.delegate.count(Some(&combined)).await }
    }
}

/// Appends default sort clauses after the caller's. The caller's clauses take
/// precedence; a default on a property the caller already sorts by is skipped.
#[derive(Debug, Clone)]
pub struct SortedDataLoader<D> {
    delegate: D,
    sort_by: Vec<SortClause>,
}

impl<D> SortedDataLoader<D> {
    pub fn new(delegate: D, sort_by: Vec<SortClause>) -> Self {
        Self { delegate, sort_by }
    }
}

impl<T, D> DataLoader<T> for SortedDataLoader<D>
where
    T: Send,
    D: DataLoader<T>,
{
    fn fetch(
        &self,
        filter: Option<&Filter>,
        sort_by: &[SortClause],
        range: RowRange,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send {
        let mut combined = sort_by.to_vec();
        for clause in &self.sort_by {
            if !combined.iter().any(|c| c.property == clause.property) {
                combined.push(clause.clone());
            }
        }
        async move { self.delegate.fetch(filter, &combined, range).await }
    }

    fn count(&self, filter: Option<&Filter>) -> impl Future<Output = Result<u64, DataError>> + Send {
        self.delegate.count(filter)
    }
}
