use serde::{Deserialize, Serialize};

/// A normalized geocoder hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
    pub place_id: String,
}
