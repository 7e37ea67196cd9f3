//! Integration tests for the query cache
//!
//! Exercise deduplication and stale-response handling under real task
//! concurrency on the tokio runtime.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tokio_test::{assert_err, assert_ok};

use f1_dashboard::app::query::{QueryCache, QueryConfig, QueryKey, QueryStatus, RefetchMode};
use f1_dashboard::errors::QueryError;

fn drivers_key(season: &str) -> QueryKey {
    QueryKey::Drivers {
        season: season.to_string(),
    }
}

/// Loader whose n-th call sleeps `delays[n]` and returns `n + 1`
fn scripted_loader(
    calls: Arc<AtomicUsize>,
    delays: Vec<Duration>,
) -> impl Fn() -> futures::future::BoxFuture<'static, Result<usize, QueryError>> + Send + Sync + 'static
{
    use futures::FutureExt;
    move || {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        let delay = delays.get(call).copied().unwrap_or_default();
        async move {
            sleep(delay).await;
            Ok(call + 1)
        }
        .boxed()
    }
}

#[tokio::test]
async fn test_concurrent_gets_invoke_loader_once() {
    let cache: QueryCache<QueryKey, usize> = QueryCache::new(QueryConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            let loader = scripted_loader(calls, vec![Duration::from_millis(50)]);
            let mut subscription = cache.get(drivers_key("2024"), loader).await;
            subscription.settled().await.data
        }));
    }

    let mut values = Vec::new();
    for handle in handles {
        values.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(values.iter().all(|value| Arc::ptr_eq(value, &values[0])));
    assert_eq!(*values[0], 1);

    let stats = cache.stats().await;
    assert_eq!(stats.loader_invocations, 1);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn test_superseded_response_never_overwrites_later_result() {
    let cache: QueryCache<QueryKey, usize> = QueryCache::new(QueryConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let key = drivers_key("2024");

    // First load is slow, the replacing load is fast
    let loader = scripted_loader(
        calls.clone(),
        vec![Duration::from_millis(150), Duration::from_millis(10)],
    );
    let mut subscription = cache.get(key.clone(), loader).await;
    assert_ok!(subscription.refetch(RefetchMode::Replace).await);

    let state = subscription.settled().await;
    assert_eq!(state.data.as_deref(), Some(&2));

    sleep(Duration::from_millis(250)).await;
    let state = cache.peek(&key).await.unwrap();
    assert_eq!(state.status, QueryStatus::Resolved);
    assert_eq!(state.data.as_deref(), Some(&2));

    let stats = cache.stats().await;
    assert_eq!(stats.loader_invocations, 2);
    assert_eq!(stats.discarded_responses, 1);
}

#[tokio::test]
async fn test_refetch_in_flight_is_deduplicated() {
    let cache: QueryCache<QueryKey, usize> = QueryCache::new(QueryConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let key = drivers_key("2023");

    let loader = scripted_loader(calls.clone(), vec![Duration::from_millis(50); 3]);
    let mut subscription = cache.get(key.clone(), loader).await;

    assert_ok!(cache.refetch(&key, RefetchMode::Dedupe).await);
    assert_ok!(subscription.refetch(RefetchMode::Dedupe).await);
    subscription.settled().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Once settled, a refetch starts a fresh load
    assert_ok!(cache.refetch(&key, RefetchMode::Dedupe).await);
    let state = subscription.settled().await;
    assert_eq!(state.data.as_deref(), Some(&2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_distinct_parameters_are_independent() {
    let cache: QueryCache<QueryKey, usize> = QueryCache::new(QueryConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let mut first = cache
        .get(drivers_key("2023"), scripted_loader(calls.clone(), vec![]))
        .await;
    let mut second = cache
        .get(drivers_key("2024"), scripted_loader(calls.clone(), vec![]))
        .await;
    first.settled().await;
    second.settled().await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.stats().await.entries, 2);
}

#[tokio::test]
async fn test_disabled_keys_and_unknown_refetch() {
    let cache: QueryCache<QueryKey, usize> = QueryCache::new(QueryConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let disabled = QueryKey::DriverResults {
        season: "2024".to_string(),
        driver_id: None,
    };

    let subscription = cache
        .get(disabled.clone(), scripted_loader(calls.clone(), vec![]))
        .await;
    assert!(!subscription.is_loading());
    assert!(subscription.data().is_none());
    assert_err!(cache.refetch(&disabled, RefetchMode::Dedupe).await);
    assert_err!(cache.refetch(&drivers_key("1999"), RefetchMode::Dedupe).await);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_hung_loader_fails_then_recovers() {
    let config = QueryConfig::default().with_load_timeout(Duration::from_millis(30));
    let cache: QueryCache<QueryKey, usize> = QueryCache::new(config);
    let calls = Arc::new(AtomicUsize::new(0));
    let key = drivers_key("2024");

    let loader = scripted_loader(calls.clone(), vec![Duration::from_secs(10), Duration::ZERO]);
    let mut subscription = cache.get(key.clone(), loader).await;

    let state = subscription.settled().await;
    assert!(state.is_error());
    assert!(state.data.is_none());

    assert_ok!(subscription.refetch(RefetchMode::Dedupe).await);
    let state = subscription.settled().await;
    assert_eq!(state.status, QueryStatus::Resolved);
    assert_eq!(state.data.as_deref(), Some(&2));
}
