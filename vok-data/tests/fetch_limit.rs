use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use vok_data::prelude::*;
use vok_data::DataError;

/// Serves a slice of integers, rejecting filters and sorting.
struct SimpleListDataLoader {
    list: Vec<u64>,
    fetches: AtomicUsize,
}

impl SimpleListDataLoader {
    fn new(list: Vec<u64>) -> Self {
        Self {
            list,
            fetches: AtomicUsize::new(0),
        }
    }
}

impl DataLoader<u64> for SimpleListDataLoader {
    fn fetch(
        &self,
        filter: Option<&Filter>,
        sort_by: &[SortClause],
        range: RowRange,
    ) -> impl Future<Output = Result<Vec<u64>, DataError>> + Send {
        assert!(filter.is_none(), "filter is unsupported");
        assert!(sort_by.is_empty(), "sort_by is unsupported");
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let len = self.list.len();
        let start = (range.offset() as usize).min(len);
        let end = range.end().map_or(len, |end| (end as usize).min(len));
        let page = self.list[start..end].to_vec();
        async move { Ok(page) }
    }

    fn count(&self, filter: Option<&Filter>) -> impl Future<Output = Result<u64, DataError>> + Send {
        assert!(filter.is_none(), "filter is unsupported");
        let len = self.list.len() as u64;
        async move { Ok(len) }
    }
}

const LIMITS: [u64; 6] = [1, 5, 9, 10, 20, 100];

async fn fetch(list: Vec<u64>, limit: u64, range: RowRange) -> Vec<u64> {
    SimpleListDataLoader::new(list)
        .overcome_fetch_limit(limit)
        .unwrap()
        .fetch(None, &[], range)
        .await
        .unwrap()
}

#[tokio::test]
async fn empty_delegate() {
    for limit in LIMITS {
        assert!(fetch(vec![], limit, RowRange::from(0..=9)).await.is_empty());
        assert!(fetch(vec![], limit, RowRange::from(10..=19)).await.is_empty());
    }
}

#[tokio::test]
async fn delegate_with_one_item() {
    for limit in LIMITS {
        assert_eq!(fetch(vec![25], limit, RowRange::from(0..=9)).await, vec![25]);
        assert!(fetch(vec![25], limit, RowRange::from(10..=19)).await.is_empty());
    }
}

#[tokio::test]
async fn delegate_with_five_items() {
    for limit in LIMITS {
        assert_eq!(fetch((0..5).collect(), limit, RowRange::from(0..=9)).await, vec![0, 1, 2, 3, 4]);
        assert!(fetch((0..5).collect(), limit, RowRange::from(10..=19)).await.is_empty());
    }
}

#[tokio::test]
async fn delegate_with_twenty_items() {
    for limit in LIMITS {
        assert_eq!(
            fetch((0..20).collect(), limit, RowRange::from(0..=9)).await,
            (0..10).collect::<Vec<_>>()
        );
        assert_eq!(
            fetch((0..20).collect(), limit, RowRange::from(10..=19)).await,
            (10..20).collect::<Vec<_>>()
        );
    }
}

#[tokio::test]
async fn unaligned_and_unbounded_ranges() {
    for limit in LIMITS {
        assert_eq!(
            fetch((0..20).collect(), limit, RowRange::from(3..=16)).await,
            (3..17).collect::<Vec<_>>()
        );
        assert_eq!(
            fetch((0..20).collect(), limit, RowRange::from(7..)).await,
            (7..20).collect::<Vec<_>>()
        );
        assert_eq!(fetch((0..20).collect(), limit, RowRange::all()).await.len(), 20);
        assert!(fetch((0..20).collect(), limit, RowRange::from(5..5)).await.is_empty());
    }
}

#[tokio::test]
async fn sub_fetches_are_bounded_by_the_limit() {
    let overcomer = SimpleListDataLoader::new((0..20).collect())
        .overcome_fetch_limit(5)
        .unwrap();
    let items = overcomer.fetch(None, &[], RowRange::from(0..=19)).await.unwrap();
    assert_eq!(items.len(), 20);
    assert_eq!(overcomer.delegate().fetches.load(Ordering::SeqCst), 4);

    // a short page ends the loop
    let overcomer = SimpleListDataLoader::new((0..7).collect())
        .overcome_fetch_limit(5)
        .unwrap();
    overcomer.fetch(None, &[], RowRange::all()).await.unwrap();
    assert_eq!(overcomer.delegate().fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn count_delegates() {
    let overcomer = SimpleListDataLoader::new((0..20).collect())
        .overcome_fetch_limit(3)
        .unwrap();
    assert_eq!(overcomer.count(None).await.unwrap(), 20);
}

#[test]
fn zero_limit_is_rejected() {
    let err = SimpleListDataLoader::new(vec![]).overcome_fetch_limit(0).unwrap_err();
    assert!(matches!(err, DataError::InvalidArgument(_)));
}
