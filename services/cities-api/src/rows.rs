//! Row assembly: catalog query, temperature resolution, presentation rows.

use metrics::counter;
use tracing::debug;

use cities_common::{CitiesResult, CityId, CityRecord, Row, RowSet, Temperature};
use weather::CachePolicy;

use crate::state::AppState;

/// Published cities whose name contains `query`, in catalog order.
pub async fn search_rows(state: &AppState, query: &str) -> CitiesResult<RowSet> {
    let cities = state.store.search_published(query.trim()).await?;
    debug!(query = query.trim(), matches = cities.len(), "City search");
    Ok(assemble(state, &cities, &state.policies.search, "search").await)
}

/// All published cities, sorted by name.
pub async fn listing_rows(state: &AppState) -> CitiesResult<RowSet> {
    let cities = state.store.list_published().await?;
    Ok(assemble(state, &cities, &state.policies.listing, "listing").await)
}

/// A single published city with its temperature, or `None` if not visible.
pub async fn city_weather(
    state: &AppState,
    id: CityId,
) -> CitiesResult<Option<(CityRecord, Temperature)>> {
    let Some(city) = state.store.get_published(id).await? else {
        return Ok(None);
    };
    let temperature = state.resolver.resolve(&city, &state.policies.widget).await;
    counter!("city_rows_total", "endpoint" => "widget").increment(1);
    Ok(Some((city, temperature)))
}

async fn assemble(
    state: &AppState,
    cities: &[CityRecord],
    policy: &CachePolicy,
    endpoint: &'static str,
) -> RowSet {
    let temperatures = state.resolver.resolve_many(cities, policy).await;
    counter!("city_rows_total", "endpoint" => endpoint).increment(cities.len() as u64);

    let rows = cities
        .iter()
        .zip(temperatures)
        .map(|(city, temperature)| Row::new(city, temperature))
        .collect();
    RowSet::from_rows(rows)
}
