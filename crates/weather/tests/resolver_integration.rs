//! End-to-end resolution tests: catalog metadata, cache and fetcher together.

use std::sync::Arc;
use std::time::Duration;

use cities_common::{CityRecord, Coordinates, Temperature};
use storage::MemoryCatalog;
use test_utils::{fixtures, generate_cities, index_from_latitude, payloads, ScriptedFetcher};
use weather::{
    CachePolicy, CoordinateKeys, CoordinateResolver, FetchFailure, FetcherConfig, LookupTarget,
    MemoryWeatherCache, OpenWeatherClient, TemperatureResolver, WeatherCache,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver_with(
    catalog: MemoryCatalog,
    fetcher: Arc<dyn weather::WeatherFetcher>,
) -> (TemperatureResolver, Arc<MemoryWeatherCache>) {
    let cache = Arc::new(MemoryWeatherCache::new(1_000));
    let coordinates = CoordinateResolver::new(Arc::new(catalog), CoordinateKeys::default());
    (
        TemperatureResolver::new(cache.clone(), fetcher, coordinates),
        cache,
    )
}

fn policy() -> CachePolicy {
    CachePolicy::new(Duration::from_secs(900))
}

#[tokio::test]
async fn test_miss_fetches_and_caches() {
    let fetcher = ScriptedFetcher::constant(Ok(18.5));
    let (resolver, cache) = resolver_with(fixtures::sample_catalog(), fetcher.clone());
    let berlin = fixtures::berlin().record();

    assert_eq!(
        resolver.resolve(&berlin, &policy()).await,
        Temperature::Celsius(18.5)
    );
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(cache.get(&policy().key_for(&berlin)).await, Some(18.5));
}

#[tokio::test]
async fn test_hit_skips_fetcher() {
    let fetcher = ScriptedFetcher::constant(Ok(30.0));
    let (resolver, cache) = resolver_with(fixtures::sample_catalog(), fetcher.clone());
    let berlin = fixtures::berlin().record();

    cache
        .put(&policy().key_for(&berlin), 12.3, policy().ttl)
        .await;

    for _ in 0..3 {
        assert_eq!(
            resolver.resolve(&berlin, &policy()).await,
            Temperature::Celsius(12.3)
        );
    }
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_failure_is_not_cached() {
    let fetcher = ScriptedFetcher::constant(Err(FetchFailure::Status(500)));
    let (resolver, cache) = resolver_with(fixtures::sample_catalog(), fetcher.clone());
    let berlin = fixtures::berlin().record();

    assert_eq!(
        resolver.resolve(&berlin, &policy()).await,
        Temperature::Unavailable
    );
    assert_eq!(
        resolver.resolve(&berlin, &policy()).await,
        Temperature::Unavailable
    );

    assert_eq!(fetcher.calls(), 2);
    assert!(cache.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_refetches() {
    let fetcher = ScriptedFetcher::constant(Ok(5.0));
    let (resolver, _) = resolver_with(fixtures::sample_catalog(), fetcher.clone());
    let berlin = fixtures::berlin().record();
    let short = CachePolicy::new(Duration::from_secs(60));

    resolver.resolve(&berlin, &short).await;
    tokio::time::advance(Duration::from_secs(61)).await;
    resolver.resolve(&berlin, &short).await;

    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn test_policies_with_shared_prefix_share_entries() {
    let fetcher = ScriptedFetcher::constant(Ok(7.0));
    let (resolver, _) = resolver_with(fixtures::sample_catalog(), fetcher.clone());
    let berlin = fixtures::berlin().record();
    let search = CachePolicy::new(Duration::from_secs(900));
    let listing = CachePolicy::new(Duration::from_secs(1800));

    resolver.resolve(&berlin, &search).await;
    resolver.resolve(&berlin, &listing).await;
    assert_eq!(fetcher.calls(), 1);

    let isolated = CachePolicy::new(Duration::from_secs(1800)).with_prefix("listing");
    resolver.resolve(&berlin, &isolated).await;
    assert_eq!(fetcher.calls(), 2);
}

#[test]
fn test_concurrency_is_at_least_one() {
    let (resolver, _) = resolver_with(
        fixtures::sample_catalog(),
        ScriptedFetcher::constant(Ok(1.0)),
    );
    assert_eq!(resolver.with_concurrency(0).concurrency(), 1);
}

#[tokio::test]
async fn test_coordinate_key_variants_reach_fetcher() {
    let fetcher = ScriptedFetcher::constant(Ok(10.0));
    let (resolver, _) = resolver_with(fixtures::sample_catalog(), fetcher.clone());

    let cities: Vec<CityRecord> = [fixtures::berlin(), fixtures::hamburg(), fixtures::paris()]
        .iter()
        .map(|c| c.record())
        .collect();
    resolver.resolve_many(&cities, &policy()).await;

    let targets = fetcher.targets();
    assert_eq!(targets.len(), 3);
    assert!(targets.contains(&LookupTarget::Coordinates(
        Coordinates::new(52.52, 13.405).unwrap()
    )));
    assert!(targets.contains(&LookupTarget::Coordinates(
        Coordinates::new(53.55, 9.99).unwrap()
    )));
    assert!(targets.contains(&LookupTarget::Name("Paris".into())));
}

#[tokio::test(start_paused = true)]
async fn test_resolve_many_preserves_input_order() {
    // Later cities answer first.
    let fetcher = ScriptedFetcher::new(|target| match target {
        LookupTarget::Coordinates(c) => {
            let index = index_from_latitude(c.latitude);
            (
                Ok(index as f64),
                Duration::from_millis((51 - index as u64) * 10),
            )
        }
        LookupTarget::Name(_) => (Err(FetchFailure::MissingTemperature), Duration::ZERO),
    });

    let seed = generate_cities(50);
    let cities: Vec<CityRecord> = seed.iter().map(|c| c.record()).collect();
    let (resolver, _) = resolver_with(MemoryCatalog::new(seed), fetcher.clone());
    let resolver = resolver.with_concurrency(8);

    let temps = resolver.resolve_many(&cities, &policy()).await;

    assert_eq!(temps.len(), 50);
    for (i, temp) in temps.iter().enumerate() {
        assert_eq!(*temp, Temperature::Celsius((i + 1) as f64));
    }
    assert_eq!(fetcher.calls(), 50);
}

#[tokio::test(start_paused = true)]
async fn test_one_failure_does_not_affect_others() {
    // Every third city fails upstream; the rest answer with their index.
    let fetcher = ScriptedFetcher::new(|target| match target {
        LookupTarget::Coordinates(c) => {
            let index = index_from_latitude(c.latitude);
            let delay = Duration::from_millis((13 - index as u64) * 5);
            if index % 3 == 0 {
                (Err(FetchFailure::Status(500)), delay)
            } else {
                (Ok(index as f64), delay)
            }
        }
        LookupTarget::Name(_) => (Err(FetchFailure::MissingTemperature), Duration::ZERO),
    });

    let seed = generate_cities(12);
    let cities: Vec<CityRecord> = seed.iter().map(|c| c.record()).collect();
    let (resolver, cache) = resolver_with(MemoryCatalog::new(seed), fetcher.clone());

    let temps = resolver.resolve_many(&cities, &policy()).await;

    assert_eq!(temps.len(), 12);
    for (i, temp) in temps.iter().enumerate() {
        let index = i + 1;
        if index % 3 == 0 {
            assert_eq!(*temp, Temperature::Unavailable, "city {}", index);
        } else {
            assert_eq!(*temp, Temperature::Celsius(index as f64), "city {}", index);
        }
    }
    assert_eq!(fetcher.calls(), 12);
    assert_eq!(cache.len().await, 8);
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_fetches_stay_within_limit() {
    for limit in [1, 3, 8] {
        let fetcher = ScriptedFetcher::new(|_| (Ok(1.0), Duration::from_millis(20)));
        let seed = generate_cities(20);
        let cities: Vec<CityRecord> = seed.iter().map(|c| c.record()).collect();
        let (resolver, _) = resolver_with(MemoryCatalog::new(seed), fetcher.clone());
        let resolver = resolver.with_concurrency(limit);

        let temps = resolver.resolve_many(&cities, &policy()).await;

        assert!(temps.iter().all(|t| *t == Temperature::Celsius(1.0)));
        assert_eq!(fetcher.calls(), 20);
        assert_eq!(fetcher.max_in_flight(), limit, "limit {}", limit);
    }
}

#[tokio::test]
async fn test_second_pass_is_served_from_cache() {
    let fetcher = ScriptedFetcher::constant(Ok(4.2));
    let seed = generate_cities(5);
    let cities: Vec<CityRecord> = seed.iter().map(|c| c.record()).collect();
    let (resolver, cache) = resolver_with(MemoryCatalog::new(seed), fetcher.clone());

    resolver.resolve_many(&cities, &policy()).await;
    let again = resolver.resolve_many(&cities, &policy()).await;

    assert!(again.iter().all(|t| *t == Temperature::Celsius(4.2)));
    assert_eq!(fetcher.calls(), 5);
    assert_eq!(cache.cache_stats().snapshot().hits, 5);
}

#[tokio::test]
async fn test_upstream_error_is_not_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(FetcherConfig {
        base_url: server.uri(),
        api_key: "test-key".into(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let (resolver, cache) = resolver_with(fixtures::sample_catalog(), Arc::new(client));
    let berlin = fixtures::berlin().record();

    assert_eq!(
        resolver.resolve(&berlin, &policy()).await,
        Temperature::Unavailable
    );
    assert!(cache.get(&policy().key_for(&berlin)).await.is_none());
    assert_eq!(
        resolver.resolve(&berlin, &policy()).await,
        Temperature::Unavailable
    );
}

#[tokio::test]
async fn test_upstream_reading_is_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string(payloads::TEMP_18_46))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(FetcherConfig {
        base_url: server.uri(),
        api_key: "test-key".into(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let (resolver, cache) = resolver_with(fixtures::sample_catalog(), Arc::new(client));
    let berlin = fixtures::berlin().record();

    for _ in 0..3 {
        assert_eq!(
            resolver.resolve(&berlin, &policy()).await,
            Temperature::Celsius(18.5)
        );
    }
    assert_eq!(cache.get(&policy().key_for(&berlin)).await, Some(18.5));
}
