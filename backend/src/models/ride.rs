//! Ride and participant models.

use serde::{Deserialize, Serialize};

/// A scheduled group ride with a participant capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<u32>,
    pub spots: u32,
    #[serde(default)]
    pub registered: u32,
    #[serde(default)]
    pub requires_access_code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Ride {
    pub fn is_full(&self) -> bool {
        self.registered >= self.spots
    }

    /// Plain equality against the stored code; a missing code never matches.
    pub fn access_code_matches(&self, supplied: Option<&str>) -> bool {
        if !self.requires_access_code {
            return true;
        }
        match (self.access_code.as_deref(), supplied) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        }
    }
}

/// Ride as shown to visitors; the access code stays server-side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicRide {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<u32>,
    pub spots: u32,
    pub registered: u32,
    pub spots_left: u32,
    pub requires_access_code: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<Ride> for PublicRide {
    fn from(ride: Ride) -> Self {
        Self {
            spots_left: ride.spots.saturating_sub(ride.registered),
            id: ride.id,
            title: ride.title,
            description: ride.description,
            date: ride.date,
            start_time: ride.start_time,
            start_location: ride.start_location,
            distance_km: ride.distance_km,
            spots: ride.spots,
            registered: ride.registered,
            requires_access_code: ride.requires_access_code,
            image_url: ride.image_url,
        }
    }
}

/// Request body for creating a ride.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub start_location: Option<String>,
    #[serde(default)]
    pub distance_km: Option<u32>,
    pub spots: u32,
    #[serde(default)]
    pub requires_access_code: bool,
    #[serde(default)]
    pub access_code: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Request body for updating a ride.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRideRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub start_location: Option<String>,
    #[serde(default)]
    pub distance_km: Option<u32>,
    #[serde(default)]
    pub spots: Option<u32>,
    #[serde(default)]
    pub requires_access_code: Option<bool>,
    #[serde(default)]
    pub access_code: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A registration record tied to one ride.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub ride_id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motorcycle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    pub created_at: String,
}

/// Request body for registering on a ride.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParticipantRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub motorcycle: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub access_code: Option<String>,
}
