//! AsyncMarketTable tests. Run with `--features async`.

#![cfg(feature = "async")]

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

use market_table::{
    AsyncMarketTable, FilterUpdate, MarketTable, QuoteSource, Record, Result, SortKey,
};

use common::ScriptedSource;

fn async_table(source: Arc<dyn QuoteSource>) -> AsyncMarketTable {
    let table = MarketTable::builder()
        .page_size(3)
        .source(source)
        .build()
        .unwrap();
    AsyncMarketTable::from_table(table)
}

/// A source whose fetch blocks until the test releases it.
///
/// Each batch sent on the returned channel releases one waiting fetch.
struct GatedSource {
    gate: Mutex<Receiver<Vec<Record>>>,
    entered: AtomicUsize,
}

impl GatedSource {
    fn new() -> (Arc<Self>, Sender<Vec<Record>>) {
        let (tx, rx) = channel();
        (
            Arc::new(Self {
                gate: Mutex::new(rx),
                entered: AtomicUsize::new(0),
            }),
            tx,
        )
    }
}

impl QuoteSource for GatedSource {
    fn fetch(&self) -> Result<Vec<Record>> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let records = self.gate.lock().unwrap().recv().unwrap();
        Ok(records)
    }
}

struct PanickingSource;

impl QuoteSource for PanickingSource {
    fn fetch(&self) -> Result<Vec<Record>> {
        panic!("decoder bug");
    }
}

#[tokio::test]
async fn async_refresh_applies_batch() {
    let table = async_table(Arc::new(
        ScriptedSource::new().then_batch(common::numbered(7)),
    ));

    assert_eq!(table.refresh().await.unwrap(), 7);
    let snap = table.snapshot().await.unwrap();
    assert_eq!(snap.batch_len, 7);
    assert_eq!(snap.total_pages, 3);
    assert!(!snap.loading);
}

#[tokio::test]
async fn async_intents_run_against_the_table() {
    let table = async_table(Arc::new(
        ScriptedSource::new().then_batch(common::sample_batch()),
    ));
    table.refresh().await.unwrap();

    table
        .run(|t| {
            t.set_sort(SortKey::MarketCap);
            t.set_filter(FilterUpdate::default().min_price(100.0))
        })
        .await
        .unwrap()
        .unwrap();

    let snap = table.snapshot().await.unwrap();
    assert_eq!(
        common::ids(&snap.visible_rows),
        vec!["solana", "ethereum", "bitcoin"]
    );
}

#[tokio::test]
async fn async_failure_keeps_previous_batch() {
    let table = async_table(Arc::new(
        ScriptedSource::new()
            .then_batch(common::numbered(5))
            .then_failure("gateway timeout"),
    ));
    table.refresh().await.unwrap();

    assert!(table.refresh().await.is_err());
    let snap = table.snapshot().await.unwrap();
    assert_eq!(snap.batch_len, 5);
    assert!(snap
        .fetch_error
        .as_deref()
        .is_some_and(|m| m.contains("gateway timeout")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn intents_stay_responsive_while_a_fetch_is_pending() {
    let (source, release) = GatedSource::new();
    let table = async_table(source);

    release.send(common::numbered(6)).unwrap();
    table.refresh().await.unwrap();

    let pending = {
        let table = table.clone();
        tokio::spawn(async move { table.refresh().await })
    };
    while !table.snapshot().await.unwrap().loading {
        tokio::task::yield_now().await;
    }

    // The old batch is still paged while the new one is in flight.
    table.run(|t| t.go_to_page(2)).await.unwrap();
    let during = table.snapshot().await.unwrap();
    assert!(during.loading);
    assert_eq!(during.current_page, 2);
    assert_eq!(common::ids(&during.visible_rows), vec!["coin-03", "coin-04", "coin-05"]);

    release.send(common::numbered(2)).unwrap();
    assert_eq!(pending.await.unwrap().unwrap(), 2);

    let after = table.snapshot().await.unwrap();
    assert!(!after.loading);
    assert_eq!(after.current_page, 1);
    assert_eq!(after.batch_len, 2);
}

#[tokio::test]
async fn clones_share_one_table() {
    let table = async_table(Arc::new(
        ScriptedSource::new().then_batch(common::numbered(4)),
    ));
    let other = table.clone();

    table.refresh().await.unwrap();
    assert_eq!(other.snapshot().await.unwrap().batch_len, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn loading_holds_until_the_last_overlapping_refresh_completes() {
    let (source, release) = GatedSource::new();
    let table = async_table(source.clone());

    let first = {
        let table = table.clone();
        tokio::spawn(async move { table.refresh().await })
    };
    let second = {
        let table = table.clone();
        tokio::spawn(async move { table.refresh().await })
    };
    while source.entered.load(Ordering::SeqCst) < 2 {
        tokio::task::yield_now().await;
    }

    release.send(common::numbered(3)).unwrap();
    while table.snapshot().await.unwrap().batch_len != 3 {
        tokio::task::yield_now().await;
    }
    assert!(table.snapshot().await.unwrap().loading);

    release.send(common::numbered(5)).unwrap();
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let snap = table.snapshot().await.unwrap();
    assert!(!snap.loading);
    assert_eq!(snap.batch_len, 5);
}

#[tokio::test]
async fn panicked_fetch_settles_as_a_failure() {
    let table = async_table(Arc::new(PanickingSource));

    let err = table.refresh().await.unwrap_err();
    assert!(err.is_fetch_failure());

    let snap = table.snapshot().await.unwrap();
    assert!(!snap.loading);
    assert!(snap
        .fetch_error
        .as_deref()
        .is_some_and(|m| m.contains("Fetch task failed")));

    // The table is still usable afterwards.
    table.run(|t| t.go_to_page(2)).await.unwrap();
    assert_eq!(table.snapshot().await.unwrap().current_page, 1);
}
