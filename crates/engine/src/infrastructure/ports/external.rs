//! External service ports.

use async_trait::async_trait;
use storyteller_domain::GeoHierarchy;

use super::error::GeocodeError;

/// Reverse geocoding: a `[lat, lon]` point to the named places containing it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeocoderPort: Send + Sync {
    async fn reverse_geocode(
        &self,
        lat: f64,
        lon: f64,
        zoom: u8,
    ) -> Result<GeoHierarchy, GeocodeError>;
}
