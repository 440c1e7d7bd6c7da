//! Sample OFP payloads shaped like the planning service's JSON fetcher output.

use serde_json::{Value, json};

/// User identifier used by the sample payloads.
pub const SAMPLE_USER_ID: &str = "123456";
/// Generation timestamp embedded in the sample payloads.
pub const SAMPLE_TIME_GENERATED: &str = "1718035200";

/// Full OFP document for a `KJFK` to `KLAX` flight.
#[must_use]
pub fn sample_ofp() -> Value {
    json!({
        "fetch": {
            "userid": SAMPLE_USER_ID,
            "static_id": "",
            "status": "Success"
        },
        "general": {
            "icao_airline": "DAL",
            "flight_number": "423",
            "route": "DEEZZ5 CANDR J60 PSB"
        },
        "params": {
            "request_id": "98765432",
            "time_generated": SAMPLE_TIME_GENERATED,
            "units": "lbs"
        },
        "origin": {
            "icao_code": "KJFK",
            "iata_code": "JFK",
            "name": "John F Kennedy Intl"
        },
        "destination": {
            "icao_code": "KLAX",
            "iata_code": "LAX",
            "name": "Los Angeles Intl"
        },
        "aircraft": {
            "icao_code": "B763",
            "name": "B767-300ER"
        }
    })
}

/// Sample OFP with one top-level section removed.
#[must_use]
pub fn sample_ofp_without(section: &str) -> Value {
    let mut document = sample_ofp();
    if let Some(map) = document.as_object_mut() {
        map.remove(section);
    }
    document
}

/// Sample OFP with a different destination, used to simulate a new route.
#[must_use]
pub fn sample_ofp_to(destination_icao: &str, destination_name: &str) -> Value {
    let mut document = sample_ofp();
    document["destination"]["icao_code"] = Value::from(destination_icao);
    document["destination"]["name"] = Value::from(destination_name);
    document
}
