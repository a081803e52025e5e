//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Entity storage (in-memory store today, a vault or database later)
//! - Timeline settings
//! - Reverse geocoding (Nominatim, or anything returning a `GeoHierarchy`)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::*;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::GeocoderPort;

// =============================================================================
// Testability Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{GeocodeError, RepoError};

#[cfg(test)]
pub use external::MockGeocoderPort;
