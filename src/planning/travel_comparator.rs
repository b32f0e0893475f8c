//! Driving versus flying comparison for an origin/destination pair

use crate::models::{
    DrivingCosts, DrivingOption, FlyingOption, Recommendation, RecommendationReason,
    TravelComparison, TravelMode,
};
use crate::planning::cost_estimator::destination_key;
use crate::{Result, TripScoutError};
use tracing::{debug, info};

pub const MILES_PER_GALLON: f64 = 25.0;
pub const GAS_PRICE_PER_GALLON: f64 = 3.50;
pub const WEAR_COST_PER_MILE: f64 = 0.10;
pub const TOLL_RATE_PER_MILE: f64 = 0.05;
pub const TOLL_CAP: f64 = 50.0;
/// Parking cost per 200 one-way miles
pub const PARKING_PER_200_MILES: f64 = 25.0;
pub const FALLBACK_DISTANCE_MILES: f64 = 300.0;
pub const AVERAGE_HIGHWAY_MPH: f64 = 65.0;
/// One-way fare per traveler
pub const FALLBACK_FARE: f64 = 200.0;
pub const FALLBACK_FLIGHT_HOURS: f64 = 2.5;
/// Check-in, security and transfers added to each flight leg
pub const AIRPORT_OVERHEAD_HOURS: f64 = 2.0;

/// Cost gap above which the cheaper mode wins outright
pub const COST_THRESHOLD: f64 = 100.0;
/// Time saving above which flying wins
pub const TIME_THRESHOLD_HOURS: f64 = 4.0;
/// Party size from which driving is the better value
pub const GROUP_SIZE_FOR_DRIVING: u32 = 3;

const DRIVING_CONVENIENCE: u8 = 7;
const FLYING_CONVENIENCE: u8 = 8;

/// One-way road route
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadRoute {
    pub miles: f64,
    pub hours: f64,
}

/// One-way flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightRoute {
    /// Per traveler
    pub fare: f64,
    pub hours: f64,
}

/// Lookup tables for known routes; lookups are order-insensitive
pub trait TravelTables: Send + Sync {
    fn road(&self, origin: &str, destination: &str) -> Option<RoadRoute>;
    fn flight(&self, origin: &str, destination: &str) -> Option<FlightRoute>;
}

#[derive(Debug, Clone, Copy)]
struct KnownRoute {
    a: &'static str,
    b: &'static str,
    road: RoadRoute,
    flight: FlightRoute,
}

const fn route(
    a: &'static str,
    b: &'static str,
    miles: f64,
    hours: f64,
    fare: f64,
    flight_hours: f64,
) -> KnownRoute {
    KnownRoute {
        a,
        b,
        road: RoadRoute { miles, hours },
        flight: FlightRoute {
            fare,
            hours: flight_hours,
        },
    }
}

const KNOWN_ROUTES: &[KnownRoute] = &[
    route("new york", "washington dc", 225.0, 4.5, 180.0, 1.5),
    route("los angeles", "san francisco", 380.0, 6.0, 120.0, 1.5),
    route("chicago", "detroit", 280.0, 4.5, 160.0, 1.2),
    route("miami", "orlando", 235.0, 3.5, 90.0, 1.0),
    route("seattle", "portland", 173.0, 3.0, 110.0, 1.0),
    route("boston", "philadelphia", 300.0, 5.0, 150.0, 1.5),
    route("dallas", "houston", 240.0, 3.5, 140.0, 1.2),
    route("atlanta", "charlotte", 245.0, 4.0, 130.0, 1.0),
];

/// Built-in table of common US city pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTravelTables;

impl StaticTravelTables {
    fn find(origin: &str, destination: &str) -> Option<&'static KnownRoute> {
        let origin = destination_key(origin);
        let destination = destination_key(destination);
        KNOWN_ROUTES.iter().find(|r| {
            (r.a == origin && r.b == destination) || (r.a == destination && r.b == origin)
        })
    }
}

impl TravelTables for StaticTravelTables {
    fn road(&self, origin: &str, destination: &str) -> Option<RoadRoute> {
        Self::find(origin, destination).map(|r| r.road)
    }

    fn flight(&self, origin: &str, destination: &str) -> Option<FlightRoute> {
        Self::find(origin, destination).map(|r| r.flight)
    }
}

/// Land mass that cannot be driven to from North America; places within
/// the same region are reachable from each other by road
#[derive(Debug, Clone)]
pub struct OverseasRegion {
    pub name: String,
    pub markers: Vec<String>,
}

impl OverseasRegion {
    #[must_use]
    pub fn new(name: &str, markers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            markers: markers.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn matches(&self, words: &[String]) -> bool {
        self.markers.iter().any(|m| has_phrase(words, m))
    }
}

/// Decides whether a destination cannot be reached by road from an origin.
/// Unmarked places are taken to be in North America.
#[derive(Debug, Clone)]
pub struct FlightOnlyClassifier {
    island_markers: Vec<String>,
    regions: Vec<OverseasRegion>,
}

const ISLAND_MARKERS: &[&str] = &[
    "island",
    "st thomas",
    "st. thomas",
    "st john",
    "st. john",
    "st croix",
    "st. croix",
    "virgin islands",
    "hawaii",
    "honolulu",
    "maui",
    "kauai",
    "puerto rico",
    "san juan",
    "bahamas",
    "nassau",
    "bermuda",
    "aruba",
    "jamaica",
    "barbados",
    "cayman",
    "turks",
    "caicos",
    "bali",
    "iceland",
    "reykjavik",
    "tahiti",
    "fiji",
    "maldives",
    "guam",
];

const EUROPE_MARKERS: &[&str] = &[
    "france", "italy", "spain", "uk", "england", "scotland", "germany", "greece", "portugal",
    "ireland", "netherlands", "london", "manchester", "edinburgh", "dublin", "paris", "rome",
    "milan", "madrid", "barcelona", "lisbon", "berlin", "munich", "amsterdam", "athens",
];

const JAPAN_MARKERS: &[&str] = &["japan", "tokyo", "osaka", "kyoto"];

const AUSTRALIA_MARKERS: &[&str] = &["australia", "sydney", "melbourne", "brisbane"];

impl Default for FlightOnlyClassifier {
    fn default() -> Self {
        Self {
            island_markers: ISLAND_MARKERS.iter().map(|s| s.to_string()).collect(),
            regions: vec![
                OverseasRegion::new("Europe", EUROPE_MARKERS),
                OverseasRegion::new("Japan", JAPAN_MARKERS),
                OverseasRegion::new("Australia", AUSTRALIA_MARKERS),
            ],
        }
    }
}

impl FlightOnlyClassifier {
    /// Reason driving from `origin` to `destination` is impossible, or `None`
    /// when the trip is drivable. Islands are flight-only from anywhere.
    #[must_use]
    pub fn classify(&self, origin: &str, destination: &str) -> Option<String> {
        let destination_words = normalise_words(destination);
        if let Some(marker) = self
            .island_markers
            .iter()
            .find(|m| has_phrase(&destination_words, m))
        {
            return Some(format!(
                "{destination} is an island destination ({marker}) with no road connection"
            ));
        }

        let origin_region = self.region_of(&normalise_words(origin));
        let destination_region = self.region_of(&destination_words);
        match (origin_region, destination_region) {
            (Some(from), Some(to)) if from.name == to.name => None,
            (_, Some(to)) => Some(format!(
                "{destination} is in {} and cannot be reached by car from {origin}",
                to.name
            )),
            (Some(from), None) => Some(format!(
                "{origin} is in {} and {destination} cannot be reached by car from there",
                from.name
            )),
            (None, None) => None,
        }
    }

    fn region_of(&self, words: &[String]) -> Option<&OverseasRegion> {
        self.regions.iter().find(|region| region.matches(words))
    }
}

/// Lowercased words with punctuation other than dots stripped
fn normalise_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '.').to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Whole-word phrase match; a trailing "s" on the last word also matches
fn has_phrase(words: &[String], phrase: &str) -> bool {
    let parts: Vec<&str> = phrase.split_whitespace().collect();
    if parts.is_empty() || parts.len() > words.len() {
        return false;
    }
    words.windows(parts.len()).any(|window| {
        window.iter().zip(&parts).enumerate().all(|(i, (word, part))| {
            word == part || (i == parts.len() - 1 && word.strip_suffix('s') == Some(*part))
        })
    })
}

/// Compares driving and flying for a party
pub struct TravelComparator<T = StaticTravelTables> {
    tables: T,
    classifier: FlightOnlyClassifier,
}

impl Default for TravelComparator<StaticTravelTables> {
    fn default() -> Self {
        Self::new(StaticTravelTables)
    }
}

impl<T: TravelTables> TravelComparator<T> {
    pub fn new(tables: T) -> Self {
        Self {
            tables,
            classifier: FlightOnlyClassifier::default(),
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: FlightOnlyClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn compare(
        &self,
        origin: &str,
        destination: &str,
        travelers: u32,
    ) -> Result<TravelComparison> {
        if travelers == 0 {
            return Err(TripScoutError::validation(
                "Number of travelers must be at least 1",
            ));
        }
        if origin.trim().is_empty() || destination.trim().is_empty() {
            return Err(TripScoutError::validation(
                "Origin and destination are required for a travel comparison",
            ));
        }

        let driving = match self.classifier.classify(origin, destination) {
            Some(reason) => {
                debug!(destination, %reason, "Destination is flight-only");
                unavailable_driving(reason)
            }
            None => self.driving(origin, destination, travelers),
        };
        let flying = self.flying(origin, destination, travelers);
        let recommendation = recommend(&driving, &flying, travelers);

        info!(
            origin,
            destination,
            preferred = %recommendation.preferred,
            reason = %recommendation.reason,
            "Compared travel options"
        );

        Ok(TravelComparison {
            origin: origin.trim().to_string(),
            destination: destination.trim().to_string(),
            travelers,
            driving,
            flying,
            recommendation,
        })
    }

    fn driving(&self, origin: &str, destination: &str, travelers: u32) -> DrivingOption {
        let route = self.tables.road(origin, destination).unwrap_or(RoadRoute {
            miles: FALLBACK_DISTANCE_MILES,
            hours: FALLBACK_DISTANCE_MILES / AVERAGE_HIGHWAY_MPH,
        });

        DrivingOption {
            available: true,
            unavailable_reason: None,
            distance_miles: route.miles,
            drive_time_hours: route.hours,
            total_time_hours: route.hours * 2.0,
            costs: driving_costs(route.miles, travelers),
            convenience_score: DRIVING_CONVENIENCE,
            pros: strings(&[
                "Door-to-door travel",
                "Flexible schedule",
                "Can bring luggage",
                "Split costs among travelers",
            ]),
            cons: strings(&[
                "Longer travel time",
                "Driver fatigue",
                "Wear on vehicle",
                "Weather dependent",
            ]),
        }
    }

    fn flying(&self, origin: &str, destination: &str, travelers: u32) -> FlyingOption {
        let flight = self.tables.flight(origin, destination).unwrap_or(FlightRoute {
            fare: FALLBACK_FARE,
            hours: FALLBACK_FLIGHT_HOURS,
        });
        let round_trip_fare = flight.fare * 2.0;

        FlyingOption {
            flight_duration_hours: flight.hours,
            total_time_hours: (flight.hours + AIRPORT_OVERHEAD_HOURS) * 2.0,
            cost_per_person: round_trip_fare,
            total_cost: round_trip_fare * f64::from(travelers),
            convenience_score: FLYING_CONVENIENCE,
            pros: strings(&[
                "Fast travel time",
                "No driving fatigue",
                "Weather independent",
                "Professional service",
            ]),
            cons: strings(&[
                "Airport security",
                "Baggage restrictions",
                "Fixed schedule",
                "Extra transportation to/from airport",
            ]),
        }
    }
}

/// Round-trip driving costs for a one-way distance
#[must_use]
pub fn driving_costs(one_way_miles: f64, travelers: u32) -> DrivingCosts {
    let round_trip = one_way_miles * 2.0;
    let gas = round_trip / MILES_PER_GALLON * GAS_PRICE_PER_GALLON;
    let wear_and_tear = round_trip * WEAR_COST_PER_MILE;
    let tolls = (one_way_miles * TOLL_RATE_PER_MILE).min(TOLL_CAP);
    let parking = PARKING_PER_200_MILES * (one_way_miles / 200.0);
    let total_per_group = gas + wear_and_tear + tolls + parking;

    DrivingCosts {
        gas,
        wear_and_tear,
        tolls,
        parking,
        total_per_group,
        total_per_person: total_per_group / f64::from(travelers.max(1)),
    }
}

fn unavailable_driving(reason: String) -> DrivingOption {
    DrivingOption {
        available: false,
        unavailable_reason: Some(reason),
        distance_miles: 0.0,
        drive_time_hours: 0.0,
        total_time_hours: 0.0,
        costs: DrivingCosts::default(),
        convenience_score: 0,
        pros: Vec::new(),
        cons: strings(&["No road connection"]),
    }
}

fn recommend(driving: &DrivingOption, flying: &FlyingOption, travelers: u32) -> Recommendation {
    if !driving.available {
        return Recommendation {
            preferred: TravelMode::Flying,
            reason: RecommendationReason::OnlyAvailableOption,
            cost_difference: 0.0,
            time_difference_hours: 0.0,
        };
    }

    let drive_cost = driving.total_cost();
    let fly_cost = flying.total_cost;
    let (preferred, reason) = if drive_cost < fly_cost - COST_THRESHOLD {
        (TravelMode::Driving, RecommendationReason::SignificantlyCheaper)
    } else if fly_cost < drive_cost - COST_THRESHOLD {
        (TravelMode::Flying, RecommendationReason::SignificantlyCheaper)
    } else if flying.total_time_hours < driving.total_time_hours - TIME_THRESHOLD_HOURS {
        (TravelMode::Flying, RecommendationReason::MuchFaster)
    } else if travelers >= GROUP_SIZE_FOR_DRIVING {
        (TravelMode::Driving, RecommendationReason::GroupValue)
    } else {
        (TravelMode::Flying, RecommendationReason::Convenience)
    };

    Recommendation {
        preferred,
        reason,
        cost_difference: (drive_cost - fly_cost).abs(),
        time_difference_hours: (driving.total_time_hours - flying.total_time_hours).abs(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_driving_cost_components() {
        let costs = driving_costs(225.0, 2);
        // 450 miles round trip
        assert!(close(costs.gas, 450.0 / 25.0 * 3.5));
        assert!(close(costs.wear_and_tear, 45.0));
        assert!(close(costs.tolls, 11.25));
        assert!(close(costs.parking, 28.125));
        assert!(close(costs.total_per_person * 2.0, costs.total_per_group));
    }

    #[test]
    fn test_tolls_are_capped() {
        assert!(close(driving_costs(2000.0, 1).tolls, TOLL_CAP));
    }

    #[test]
    fn test_known_route_is_order_insensitive() {
        let tables = StaticTravelTables;
        let forward = tables.road("Seattle", "Portland").unwrap();
        let reverse = tables.road("portland", "SEATTLE, WA").unwrap();
        assert_eq!(forward, reverse);
        assert!(close(forward.miles, 173.0));
        assert!(close(tables.flight("Portland", "Seattle").unwrap().fare, 110.0));
    }

    #[test]
    fn test_unknown_pair_uses_fallbacks() {
        let comparison = TravelComparator::default()
            .compare("Denver", "Salt Lake City", 1)
            .unwrap();
        assert!(comparison.driving.available);
        assert!(close(comparison.driving.distance_miles, 300.0));
        assert!(close(comparison.driving.drive_time_hours, 300.0 / 65.0));
        assert!(close(comparison.flying.cost_per_person, 400.0));
        assert!(close(comparison.flying.total_time_hours, 9.0));
    }

    #[test]
    fn test_st_thomas_is_flight_only() {
        let comparison = TravelComparator::default()
            .compare("Charleston", "St Thomas", 2)
            .unwrap();
        assert!(!comparison.driving.available);
        assert!(comparison.driving.unavailable_reason.is_some());
        assert_eq!(comparison.driving.costs, DrivingCosts::default());
        assert_eq!(comparison.recommendation.preferred, TravelMode::Flying);
        assert_eq!(
            comparison.recommendation.reason,
            RecommendationReason::OnlyAvailableOption
        );
    }

    #[rstest]
    #[case("Charleston", "St Thomas", true)]
    #[case("San Juan", "St. Thomas, USVI", true)]
    #[case("Los Angeles", "Maui, Hawaii", true)]
    #[case("Miami", "Cayman Islands", true)]
    #[case("New York", "Paris, France", true)]
    #[case("Tokyo", "Seattle", true)]
    #[case("London", "Sydney", true)]
    #[case("Atlanta", "Charlotte", false)]
    #[case("San Francisco", "Ukiah, California", false)]
    #[case("Denver", "Islamabad", false)]
    #[case("Madrid, Spain", "Barcelona, Spain", false)]
    #[case("Manchester, UK", "London", false)]
    #[case("Rome", "Paris", false)]
    #[case("London", "Paris, France", false)]
    #[case("Osaka", "Tokyo, Japan", false)]
    fn test_flight_only_classification(
        #[case] origin: &str,
        #[case] destination: &str,
        #[case] flight_only: bool,
    ) {
        let classifier = FlightOnlyClassifier::default();
        assert_eq!(
            classifier.classify(origin, destination).is_some(),
            flight_only
        );
    }

    #[test]
    fn test_same_region_trip_is_drivable() {
        let comparison = TravelComparator::default()
            .compare("Madrid, Spain", "Barcelona, Spain", 4)
            .unwrap();
        assert!(comparison.driving.available);
        assert!(comparison.driving.unavailable_reason.is_none());
        assert_ne!(
            comparison.recommendation.reason,
            RecommendationReason::OnlyAvailableOption
        );
    }

    #[test]
    fn test_cross_region_reason_names_region() {
        let reason = FlightOnlyClassifier::default()
            .classify("New York", "Paris, France")
            .unwrap();
        assert!(reason.contains("Europe"));
        assert!(reason.contains("New York"));
    }

    #[test]
    fn test_driving_significantly_cheaper() {
        // 173 miles, 4 travelers: driving ~ $108, flying $880
        let comparison = TravelComparator::default()
            .compare("Seattle", "Portland", 4)
            .unwrap();
        assert_eq!(comparison.recommendation.preferred, TravelMode::Driving);
        assert_eq!(
            comparison.recommendation.reason,
            RecommendationReason::SignificantlyCheaper
        );
    }

    #[test]
    fn test_recommendation_order() {
        let comparator = TravelComparator::default();
        let solo = comparator.compare("Miami", "Orlando", 1).unwrap();
        // driving ~$150, flying $180; 7h vs 6h
        assert_eq!(solo.recommendation.reason, RecommendationReason::Convenience);
        assert_eq!(solo.recommendation.preferred, TravelMode::Flying);
        assert!(close(solo.recommendation.time_difference_hours, 1.0));
    }

    struct LongHaul;

    impl TravelTables for LongHaul {
        fn road(&self, _origin: &str, _destination: &str) -> Option<RoadRoute> {
            Some(RoadRoute {
                miles: 100.0,
                hours: 12.0,
            })
        }

        fn flight(&self, _origin: &str, _destination: &str) -> Option<FlightRoute> {
            Some(FlightRoute {
                fare: 20.0,
                hours: 1.0,
            })
        }
    }

    #[rstest]
    #[case(1, TravelMode::Flying, RecommendationReason::MuchFaster)]
    #[case(3, TravelMode::Flying, RecommendationReason::MuchFaster)]
    fn test_much_faster(
        #[case] travelers: u32,
        #[case] mode: TravelMode,
        #[case] reason: RecommendationReason,
    ) {
        let comparison = TravelComparator::new(LongHaul)
            .compare("A", "B", travelers)
            .unwrap();
        assert_eq!(comparison.recommendation.preferred, mode);
        assert_eq!(comparison.recommendation.reason, reason);
    }

    #[test]
    fn test_zero_travelers_rejected() {
        let err = TravelComparator::default()
            .compare("Miami", "Orlando", 0)
            .unwrap_err();
        assert!(matches!(err, TripScoutError::Validation { .. }));
    }
}
