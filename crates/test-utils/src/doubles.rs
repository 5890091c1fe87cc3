//! Test doubles for the fetcher and storage seams.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cities_common::{CitiesError, CitiesResult, CityId, CityRecord};
use storage::{CityStore, MetadataStore};
use weather::{FetchFailure, LookupTarget, WeatherFetcher};

type Script = dyn Fn(&LookupTarget) -> (Result<f64, FetchFailure>, Duration) + Send + Sync;

/// Fetcher whose answer and latency are computed from the lookup target.
///
/// Every call is counted and its target recorded. The number of calls
/// sleeping at once is tracked along with its high-water mark.
pub struct ScriptedFetcher {
    script: Box<Script>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    targets: Mutex<Vec<LookupTarget>>,
}

impl ScriptedFetcher {
    pub fn new(
        script: impl Fn(&LookupTarget) -> (Result<f64, FetchFailure>, Duration)
            + Send
            + Sync
            + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            targets: Mutex::new(Vec::new()),
        })
    }

    /// Always answer `result` immediately.
    pub fn constant(result: Result<f64, FetchFailure>) -> Arc<Self> {
        Self::new(move |_| (result.clone(), Duration::ZERO))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most calls ever in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Targets seen so far, in call order.
    pub fn targets(&self) -> Vec<LookupTarget> {
        self.targets
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl WeatherFetcher for ScriptedFetcher {
    async fn fetch(&self, target: &LookupTarget) -> Result<f64, FetchFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut targets) = self.targets.lock() {
            targets.push(target.clone());
        }

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let (result, delay) = (self.script)(target);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Store whose every query fails, as if the database were down.
#[derive(Debug, Default, Clone)]
pub struct FailingStore;

fn down<T>() -> CitiesResult<T> {
    Err(CitiesError::DatabaseError("connection refused".to_string()))
}

#[async_trait]
impl CityStore for FailingStore {
    async fn search_published(&self, _query: &str) -> CitiesResult<Vec<CityRecord>> {
        down()
    }

    async fn list_published(&self) -> CitiesResult<Vec<CityRecord>> {
        down()
    }

    async fn get_published(&self, _id: CityId) -> CitiesResult<Option<CityRecord>> {
        down()
    }

    async fn ping(&self) -> CitiesResult<()> {
        down()
    }
}

#[async_trait]
impl MetadataStore for FailingStore {
    async fn get_meta(&self, _id: CityId, _key: &str) -> CitiesResult<Option<String>> {
        down()
    }
}
