//! Simulated external tools: schedule lookups and booking stubs.
//!
//! Everything here is static data keyed on fixed route strings. No network
//! traffic leaves the process.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::privacy::identifier_hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    Available,
    Cancelled,
    Delayed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightService {
    pub flight: String,
    pub departure: String,
    pub arrival: String,
    pub status: ServiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_hours: Option<u32>,
}

impl FlightService {
    fn available(flight: &str, departure: &str, arrival: &str, seats: u32) -> Self {
        Self {
            flight: flight.to_string(),
            departure: departure.to_string(),
            arrival: arrival.to_string(),
            status: ServiceStatus::Available,
            seats: Some(seats),
            reason: None,
            delay_hours: None,
        }
    }
}

/// Flight availability by "ORIGIN-DESTINATION"
static AVAILABLE_FLIGHTS: LazyLock<BTreeMap<&'static str, Vec<FlightService>>> =
    LazyLock::new(|| {
        let mut table = BTreeMap::new();
        table.insert(
            "CDG-KIX",
            vec![
                FlightService::available("JL416", "01:20", "19:45+1", 3),
                FlightService::available("AF292", "02:15", "20:30+1", 1),
            ],
        );
        table.insert(
            "CDG-NRT",
            vec![FlightService {
                flight: "AF276".to_string(),
                departure: "23:00".to_string(),
                arrival: "18:30+1".to_string(),
                status: ServiceStatus::Cancelled,
                seats: None,
                reason: Some("Weather".to_string()),
                delay_hours: None,
            }],
        );
        table.insert(
            "CDG-HND",
            vec![FlightService {
                flight: "JL46".to_string(),
                departure: "00:30".to_string(),
                arrival: "19:00+1".to_string(),
                status: ServiceStatus::Delayed,
                seats: None,
                reason: None,
                delay_hours: Some(4),
            }],
        );
        table
    });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSearchResult {
    pub query_type: String,
    pub route: String,
    pub timestamp: String,
    pub results: Vec<FlightService>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
}

/// Query the flight table. Unknown routes return no results.
pub fn search_flights(origin: &str, destination: &str, privacy_shield: bool) -> FlightSearchResult {
    let route = format!("{}-{}", origin, destination);
    let results = AVAILABLE_FLIGHTS
        .get(route.as_str())
        .cloned()
        .unwrap_or_default();

    FlightSearchResult {
        query_type: if privacy_shield { "ANONYMOUS" } else { "IDENTIFIED" }.to_string(),
        timestamp: Local::now().to_rfc3339(),
        results,
        privacy_status: privacy_shield.then(|| "PII_REDACTED".to_string()),
        requester: privacy_shield.then(|| "HASHED_IDENTITY".to_string()),
        route,
    }
}

/// Routes present in the flight table
pub fn known_flight_routes() -> Vec<&'static str> {
    AVAILABLE_FLIGHTS.keys().copied().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainService {
    pub train: String,
    pub departure: String,
    pub arrival: String,
    pub class: String,
    pub status: ServiceStatus,
}

static SHINKANSEN_SCHEDULE: LazyLock<Vec<TrainService>> = LazyLock::new(|| {
    [
        ("Nozomi 64", "06:00", "08:15", "Green Car"),
        ("Nozomi 66", "06:30", "08:45", "Green Car"),
        ("Hikari 502", "05:45", "09:00", "Reserved"),
    ]
    .into_iter()
    .map(|(train, departure, arrival, class)| TrainService {
        train: train.to_string(),
        departure: departure.to_string(),
        arrival: arrival.to_string(),
        class: class.to_string(),
        status: ServiceStatus::Available,
    })
    .collect()
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainSearchResult {
    pub route: String,
    pub service: String,
    pub schedules: Vec<TrainService>,
    pub travel_time: String,
}

/// Shinkansen timetable. The schedule is the same whatever the endpoints.
pub fn search_trains(origin: &str, destination: &str) -> TrainSearchResult {
    TrainSearchResult {
        route: format!("{} → {}", origin, destination),
        service: "JR Central Shinkansen".to_string(),
        schedules: SHINKANSEN_SCHEDULE.clone(),
        travel_time: "2h 15m".to_string(),
    }
}

// ============================================================================
// Booking stubs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightRequest {
    pub flight: String,
    pub route: String,
    pub departure: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainRequest {
    pub train: String,
    pub departure: String,
    pub route: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub method: String,
    pub token_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightConfirmation {
    pub status: String,
    pub pnr: String,
    pub flight: String,
    pub payment: Payment,
    pub privacy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfirmation {
    pub status: String,
    pub reservation: String,
    pub train: String,
    pub car: String,
    pub payment: Payment,
    pub privacy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundDispatch {
    pub status: String,
    pub location: String,
    pub pickup_time: String,
    pub vehicle: String,
    pub driver_id: String,
    pub communication: String,
    pub confirmation: String,
}

fn or_unknown(value: &str) -> String {
    if value.is_empty() {
        "UNKNOWN".to_string()
    } else {
        value.to_string()
    }
}

/// Book a flight against a corporate token instead of personal payment data
pub fn book_flight(request: &FlightRequest, corporate_token: &str) -> FlightConfirmation {
    FlightConfirmation {
        status: "CONFIRMED".to_string(),
        pnr: format!("PNR_{:04}X", identifier_hash(request) % 10_000),
        flight: or_unknown(&request.flight),
        payment: Payment {
            method: "CORPORATE_TOKEN".to_string(),
            token_id: corporate_token.to_string(),
            receipt: Some(format!(
                "RCP-{}-{:03}",
                Local::now().format("%Y%m%d"),
                identifier_hash(corporate_token) % 1_000
            )),
        },
        privacy: "SOVEREIGN_COMPLIANT".to_string(),
    }
}

pub fn book_train(request: &TrainRequest, corporate_token: &str) -> TrainConfirmation {
    TrainConfirmation {
        status: "CONFIRMED".to_string(),
        reservation: format!("JR-{:05}", identifier_hash(request) % 100_000),
        train: or_unknown(&request.train),
        car: "Green Car - Seat 5A".to_string(),
        payment: Payment {
            method: "CORPORATE_TOKEN".to_string(),
            token_id: corporate_token.to_string(),
            receipt: None,
        },
        privacy: "SOVEREIGN_COMPLIANT".to_string(),
    }
}

/// Dispatch a cleared driver; an insecure channel downgrades driver and comms
pub fn dispatch_driver(location: &str, pickup_time: &str, secure_channel: bool) -> GroundDispatch {
    GroundDispatch {
        status: "DISPATCHED".to_string(),
        location: location.to_string(),
        pickup_time: pickup_time.to_string(),
        vehicle: "Executive Sedan".to_string(),
        driver_id: if secure_channel { "DRV_CLEARED_0042" } else { "DRV_0042" }.to_string(),
        communication: if secure_channel { "ENCRYPTED_CHANNEL" } else { "STANDARD" }.to_string(),
        confirmation: format!("GND-{}-ALPHA", Local::now().format("%H%M")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_known_route() {
        let result = search_flights("CDG", "KIX", true);
        assert_eq!(result.route, "CDG-KIX");
        assert_eq!(result.query_type, "ANONYMOUS");
        assert_eq!(result.privacy_status.as_deref(), Some("PII_REDACTED"));
        let codes: Vec<&str> = result.results.iter().map(|f| f.flight.as_str()).collect();
        assert_eq!(codes, vec!["JL416", "AF292"]);
        assert_eq!(result.results[0].seats, Some(3));
    }

    #[test]
    fn test_search_unknown_route_is_empty() {
        let result = search_flights("LHR", "JFK", false);
        assert!(result.results.is_empty());
        assert_eq!(result.query_type, "IDENTIFIED");
        assert!(result.requester.is_none());
    }

    #[test]
    fn test_cancelled_and_delayed_entries() {
        let nrt = search_flights("CDG", "NRT", true);
        assert_eq!(nrt.results[0].status, ServiceStatus::Cancelled);
        assert_eq!(nrt.results[0].reason.as_deref(), Some("Weather"));

        let hnd = search_flights("CDG", "HND", true);
        assert_eq!(hnd.results[0].delay_hours, Some(4));
        assert_eq!(known_flight_routes(), vec!["CDG-HND", "CDG-KIX", "CDG-NRT"]);
    }

    #[test]
    fn test_train_schedule() {
        let result = search_trains("Osaka", "Tokyo");
        assert_eq!(result.route, "Osaka → Tokyo");
        assert_eq!(result.schedules.len(), 3);
        assert_eq!(result.schedules[0].train, "Nozomi 64");
        assert_eq!(result.schedules[2].class, "Reserved");
    }

    #[test]
    fn test_book_flight() {
        let request = FlightRequest {
            flight: "JL416".to_string(),
            route: "CDG-KIX".to_string(),
            departure: "01:20".to_string(),
        };
        let booking = book_flight(&request, "CORP_TOKEN_ABCD1234");
        assert_eq!(booking.status, "CONFIRMED");
        assert_eq!(booking.flight, "JL416");
        assert!(booking.pnr.starts_with("PNR_") && booking.pnr.ends_with('X'));
        assert_eq!(booking.pnr.len(), "PNR_0000X".len());
        assert_eq!(booking.payment.token_id, "CORP_TOKEN_ABCD1234");
        assert!(booking.payment.receipt.unwrap().starts_with("RCP-"));
        // same request, same PNR
        assert_eq!(booking.pnr, book_flight(&request, "other").pnr);
    }

    #[test]
    fn test_book_train_unknown_code() {
        let request = TrainRequest {
            train: String::new(),
            departure: "06:00".to_string(),
            route: "Osaka-Tokyo".to_string(),
        };
        let booking = book_train(&request, "tok");
        assert_eq!(booking.train, "UNKNOWN");
        assert!(booking.reservation.starts_with("JR-"));
        assert_eq!(booking.reservation.len(), "JR-00000".len());
        assert!(booking.payment.receipt.is_none());
    }

    #[test]
    fn test_dispatch_channels() {
        let secure = dispatch_driver("Tokyo Station", "08:15", true);
        assert_eq!(secure.driver_id, "DRV_CLEARED_0042");
        assert_eq!(secure.communication, "ENCRYPTED_CHANNEL");
        assert!(secure.confirmation.starts_with("GND-"));

        let open = dispatch_driver("Tokyo Station", "08:15", false);
        assert_eq!(open.driver_id, "DRV_0042");
        assert_eq!(open.communication, "STANDARD");
    }
}
