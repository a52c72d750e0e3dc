//! Fare computation
//!
//! Fares are flat per distance band, quoted in INR. The bands come from
//! the product's launch pricing and are deliberately coarse: the fare a
//! rider sees at booking is the fare they pay, so the estimate must not
//! wobble with traffic between quote and pickup.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Currency code for all fares.
pub const CURRENCY: &str = "INR";

/// Upper bound of the short-trip band, in meters.
pub const SHORT_TRIP_METERS: i64 = 8_000;

/// Upper bound of the medium-trip band, in meters.
pub const MEDIUM_TRIP_METERS: i64 = 12_000;

/// Flat fare for trips up to [`SHORT_TRIP_METERS`].
pub const SHORT_TRIP_FARE: i64 = 129;

/// Flat fare for trips up to [`MEDIUM_TRIP_METERS`].
pub const MEDIUM_TRIP_FARE: i64 = 137;

/// Flat fare for everything longer.
pub const LONG_TRIP_FARE: i64 = 150;

/// A priced route between two places.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FareEstimate {
    /// Route distance in meters.
    pub distance_meters: i64,

    /// Route duration in seconds.
    pub duration_seconds: i64,

    /// The flat fare for this distance band.
    pub price: i64,

    /// Currency code, always "INR".
    pub currency: String,
}

/// Map a route distance to its flat fare band.
pub fn price_for_distance(distance_meters: i64) -> i64 {
    if distance_meters <= SHORT_TRIP_METERS {
        SHORT_TRIP_FARE
    } else if distance_meters <= MEDIUM_TRIP_METERS {
        MEDIUM_TRIP_FARE
    } else {
        LONG_TRIP_FARE
    }
}

/// Build a [`FareEstimate`] from raw route metrics.
pub fn estimate_for_route(distance_meters: i64, duration_seconds: i64) -> FareEstimate {
    FareEstimate {
        distance_meters,
        duration_seconds,
        price: price_for_distance(distance_meters),
        currency: CURRENCY.to_string(),
    }
}

/// Extract a routing query string from a stored place value.
///
/// Places arrive from the mobile client either as a bare address string or
/// as an object carrying an `address` field (with whatever else the client
/// chose to attach). Anything else is serialized as-is so the provider can
/// still reject it with a useful message.
pub fn location_query(place: &Value) -> String {
    match place {
        Value::String(address) => address.clone(),
        Value::Object(fields) => match fields.get("address").and_then(Value::as_str) {
            Some(address) => address.to_string(),
            None => place.to_string(),
        },
        other => other.to_string(),
    }
}
