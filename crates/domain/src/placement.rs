//! Map placement rules
//!
//! Pure half of the placement resolver: proximity matching on image maps,
//! the zoom to granularity staircase, and matching a reverse-geocoded name
//! against existing locations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::Location;

/// Geographic tier a real-world click resolves to, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GranularityLevel {
    Building,
    Neighborhood,
    City,
    Region,
    Country,
    Continent,
}

impl GranularityLevel {
    /// Fixed zoom staircase used by the `auto` policy.
    pub fn from_zoom(zoom: f64) -> Self {
        match zoom {
            z if z >= 16.0 => Self::Building,
            z if z >= 14.0 => Self::Neighborhood,
            z if z >= 10.0 => Self::City,
            z if z >= 6.0 => Self::Region,
            z if z >= 3.0 => Self::Country,
            _ => Self::Continent,
        }
    }

    /// Next tier up, or `None` at the top.
    pub fn coarser(&self) -> Option<Self> {
        match self {
            Self::Building => Some(Self::Neighborhood),
            Self::Neighborhood => Some(Self::City),
            Self::City => Some(Self::Region),
            Self::Region => Some(Self::Country),
            Self::Country => Some(Self::Continent),
            Self::Continent => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Neighborhood => "neighborhood",
            Self::City => "city",
            Self::Region => "region",
            Self::Country => "country",
            Self::Continent => "continent",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Building => "Building",
            Self::Neighborhood => "Neighborhood",
            Self::City => "City",
            Self::Region => "Region",
            Self::Country => "Country",
            Self::Continent => "Continent",
        }
    }
}

impl fmt::Display for GranularityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GranularityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "building" => Ok(Self::Building),
            "neighborhood" | "neighbourhood" => Ok(Self::Neighborhood),
            "city" => Ok(Self::City),
            "region" => Ok(Self::Region),
            "country" => Ok(Self::Country),
            "continent" => Ok(Self::Continent),
            other => Err(format!("unknown granularity level: {other}")),
        }
    }
}

/// Caller's choice of tier: derived from zoom, or fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelPolicy {
    #[default]
    Auto,
    Fixed(GranularityLevel),
}

impl LevelPolicy {
    pub fn resolve(&self, zoom: f64) -> GranularityLevel {
        match self {
            Self::Auto => GranularityLevel::from_zoom(zoom),
            Self::Fixed(level) => *level,
        }
    }
}

/// Names a reverse-geocoder returned for a point, each tier optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeoHierarchy {
    pub building: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub continent: Option<String>,
    pub display_name: Option<String>,
    pub place_id: Option<String>,
}

impl GeoHierarchy {
    pub fn name_at(&self, level: GranularityLevel) -> Option<&str> {
        let field = match level {
            GranularityLevel::Building => &self.building,
            GranularityLevel::Neighborhood => &self.neighborhood,
            GranularityLevel::City => &self.city,
            GranularityLevel::Region => &self.region,
            GranularityLevel::Country => &self.country,
            GranularityLevel::Continent => &self.continent,
        };
        field.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Name at the requested tier, walking to coarser tiers when it is absent.
    pub fn select(&self, level: GranularityLevel) -> Option<(GranularityLevel, &str)> {
        let mut current = Some(level);
        while let Some(l) = current {
            if let Some(name) = self.name_at(l) {
                return Some((l, name));
            }
            current = l.coarser();
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.select(GranularityLevel::Building).is_none()
    }

    /// Multi-line description listing every tier the geocoder returned.
    pub fn describe(&self, resolved_at: GranularityLevel, coordinates: [f64; 2]) -> String {
        let mut lines = Vec::new();
        if let Some(display) = self.display_name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            lines.push(display.to_string());
            lines.push(String::new());
        }
        let mut level = Some(GranularityLevel::Building);
        while let Some(l) = level {
            if let Some(name) = self.name_at(l) {
                lines.push(format!("{}: {name}", l.label()));
            }
            level = l.coarser();
        }
        lines.push(format!("Resolved at: {resolved_at} level"));
        lines.push(format!(
            "Coordinates: {:.6}, {:.6}",
            coordinates[0], coordinates[1]
        ));
        lines.join("\n")
    }
}

/// Name for a location created without geocoder data.
pub fn coordinate_name(coordinates: [f64; 2]) -> String {
    format!("Location at {:.4}, {:.4}", coordinates[0], coordinates[1])
}

/// Closest location bound to `map_id` within `tolerance` of `point`.
///
/// Equal distances keep the first location encountered.
pub fn find_nearest<'a>(
    locations: &'a [Location],
    map_id: &str,
    point: [f64; 2],
    tolerance: f64,
) -> Option<&'a Location> {
    let mut best: Option<(&Location, f64)> = None;
    for location in locations {
        let Some(binding) = location.binding_for_map(map_id) else {
            continue;
        };
        let distance = binding.distance_to(point);
        if distance > tolerance {
            continue;
        }
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((location, distance));
        }
    }
    best.map(|(location, _)| location)
}

/// Existing location for a geocoded name: exact case-insensitive name, then
/// substring containment either way, then geocoder place id.
pub fn match_existing<'a>(
    locations: &'a [Location],
    name: &str,
    place_id: Option<&str>,
) -> Option<&'a Location> {
    let wanted = name.trim().to_lowercase();
    if !wanted.is_empty() {
        if let Some(exact) = locations
            .iter()
            .find(|l| l.name().trim().to_lowercase() == wanted)
        {
            return Some(exact);
        }
        if let Some(similar) = locations.iter().find(|l| {
            let have = l.name().trim().to_lowercase();
            !have.is_empty() && (have.contains(&wanted) || wanted.contains(&have))
        }) {
            return Some(similar);
        }
    }
    let place_id = place_id.map(str::trim).filter(|p| !p.is_empty())?;
    locations
        .iter()
        .find(|l| l.osm_place_id() == Some(place_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::MapBinding;

    mod levels {
        use super::*;

        #[test]
        fn zoom_staircase() {
            assert_eq!(GranularityLevel::from_zoom(18.0), GranularityLevel::Building);
            assert_eq!(GranularityLevel::from_zoom(16.0), GranularityLevel::Building);
            assert_eq!(GranularityLevel::from_zoom(15.9), GranularityLevel::Neighborhood);
            assert_eq!(GranularityLevel::from_zoom(10.0), GranularityLevel::City);
            assert_eq!(GranularityLevel::from_zoom(7.0), GranularityLevel::Region);
            assert_eq!(GranularityLevel::from_zoom(3.0), GranularityLevel::Country);
            assert_eq!(GranularityLevel::from_zoom(1.0), GranularityLevel::Continent);
        }

        #[test]
        fn explicit_level_bypasses_zoom() {
            let policy = LevelPolicy::Fixed(GranularityLevel::Country);
            assert_eq!(policy.resolve(18.0), GranularityLevel::Country);
            assert_eq!(LevelPolicy::Auto.resolve(18.0), GranularityLevel::Building);
        }

        #[test]
        fn parses_both_spellings() {
            assert_eq!("Neighbourhood".parse(), Ok(GranularityLevel::Neighborhood));
            assert!("street".parse::<GranularityLevel>().is_err());
        }
    }

    mod hierarchy {
        use super::*;

        fn paris() -> GeoHierarchy {
            GeoHierarchy {
                city: Some("Paris".into()),
                region: Some("Ile-de-France".into()),
                country: Some("France".into()),
                display_name: Some("Paris, Ile-de-France, France".into()),
                place_id: Some("12345".into()),
                ..GeoHierarchy::default()
            }
        }

        #[test]
        fn select_falls_back_to_coarser_tier() {
            let geo = paris();
            assert_eq!(
                geo.select(GranularityLevel::Building),
                Some((GranularityLevel::City, "Paris"))
            );
            assert_eq!(
                geo.select(GranularityLevel::Country),
                Some((GranularityLevel::Country, "France"))
            );
            assert_eq!(geo.select(GranularityLevel::Continent), None);
        }

        #[test]
        fn description_lists_available_tiers() {
            let text = paris().describe(GranularityLevel::City, [48.8566, 2.3522]);
            assert!(text.starts_with("Paris, Ile-de-France, France\n\n"));
            assert!(text.contains("City: Paris\nRegion: Ile-de-France\nCountry: France"));
            assert!(text.contains("Resolved at: city level"));
            assert!(!text.contains("Building:"));
        }

        #[test]
        fn coordinate_fallback_name() {
            assert_eq!(coordinate_name([48.85661, 2.35222]), "Location at 48.8566, 2.3522");
        }
    }

    mod proximity {
        use super::*;

        fn bound(name: &str, map: &str, at: [f64; 2]) -> Location {
            Location::new(name).with_map_binding(MapBinding::new(map, at))
        }

        #[test]
        fn returns_closest_within_tolerance() {
            let locations = vec![
                bound("Far", "world", [10.0, 0.0]),
                bound("Near", "world", [3.0, 4.0]),
                bound("Other map", "city", [0.0, 0.0]),
            ];
            let hit = find_nearest(&locations, "world", [0.0, 0.0], 5.0).unwrap();
            assert_eq!(hit.name(), "Near");
        }

        #[test]
        fn nothing_beyond_tolerance() {
            let locations = vec![bound("Near", "world", [3.0, 4.0])];
            assert!(find_nearest(&locations, "world", [0.0, 0.0], 4.99).is_none());
            assert!(find_nearest(&locations, "world", [0.0, 0.0], 5.0).is_some());
        }

        #[test]
        fn ties_keep_first_encountered() {
            let locations = vec![
                bound("First", "world", [1.0, 0.0]),
                bound("Second", "world", [0.0, 1.0]),
            ];
            let hit = find_nearest(&locations, "world", [0.0, 0.0], 2.0).unwrap();
            assert_eq!(hit.name(), "First");
        }
    }

    mod matching {
        use super::*;

        #[test]
        fn exact_beats_containment() {
            let locations = vec![Location::new("Paris Outskirts"), Location::new("paris")];
            assert_eq!(match_existing(&locations, "Paris", None).unwrap().name(), "paris");
        }

        #[test]
        fn containment_either_direction() {
            let locations = vec![Location::new("Greater London")];
            assert!(match_existing(&locations, "London", None).is_some());
            let locations = vec![Location::new("Rome")];
            assert!(match_existing(&locations, "Rome, Italy", None).is_some());
        }

        #[test]
        fn place_id_is_the_last_resort() {
            let locations = vec![Location::new("Lutetia").with_osm_place_id("12345")];
            assert_eq!(
                match_existing(&locations, "Paris", Some("12345")).unwrap().name(),
                "Lutetia"
            );
            assert!(match_existing(&locations, "Paris", Some("999")).is_none());
        }
    }
}
