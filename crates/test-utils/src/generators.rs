//! Test data generators for creating synthetic city catalogs.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use storage::SeedCity;

use crate::fixtures::seed_city;

/// Creates `count` published cities with distinct coordinates.
///
/// City `i` (1-based) is named `City {i:03}`, has id `i`, and is stored at
/// latitude `i / 10` and longitude `-i / 10` under the primary keys, so a
/// fetcher can recover the index from the coordinates it receives.
///
/// # Example
///
/// ```
/// use test_utils::generate_cities;
///
/// let cities = generate_cities(3);
/// assert_eq!(cities.len(), 3);
/// assert_eq!(cities[0].name, "City 001");
/// assert_eq!(cities[2].meta["_latitude"], "0.3");
/// ```
pub fn generate_cities(count: usize) -> Vec<SeedCity> {
    (1..=count)
        .map(|i| {
            let lat = format!("{}", i as f64 / 10.0);
            let lon = format!("{}", -(i as f64) / 10.0);
            seed_city(
                i as i64,
                &format!("City {:03}", i),
                &["Testland"],
                &[("_latitude", lat.as_str()), ("_longitude", lon.as_str())],
            )
        })
        .collect()
}

/// Recovers the generator index from a latitude produced by [`generate_cities`].
pub fn index_from_latitude(latitude: f64) -> usize {
    (latitude * 10.0).round() as usize
}
