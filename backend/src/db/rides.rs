//! Ride and participant operations.
//!
//! Rides and participants live in separate files. Operations touching both
//! always lock rides first, then participants.

use super::repository::{new_id, now, optional, required};
use super::Repository;
use crate::errors::AppError;
use crate::models::{
    CreateRideRequest, Participant, RegisterParticipantRequest, Ride, UpdateRideRequest,
};

impl Repository {
    /// List all rides, soonest first.
    pub async fn list_rides(&self) -> Result<Vec<Ride>, AppError> {
        let mut rides = self.rides.load().await?;
        rides.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.start_time.cmp(&b.start_time)));
        Ok(rides)
    }

    pub async fn get_ride(&self, id: &str) -> Result<Option<Ride>, AppError> {
        let rides = self.rides.load().await?;
        Ok(rides.into_iter().find(|r| r.id == id))
    }

    pub async fn create_ride(&self, request: &CreateRideRequest) -> Result<Ride, AppError> {
        let title = required(&request.title, "Title")?;
        let date = required(&request.date, "Date")?;
        let access_code = optional(request.access_code.as_ref());
        if request.requires_access_code && access_code.is_none() {
            return Err(AppError::Validation(
                "An access code is required when the ride is access-controlled".to_string(),
            ));
        }

        let now = now();
        let ride = Ride {
            id: new_id(),
            title,
            description: optional(request.description.as_ref()),
            date,
            start_time: optional(request.start_time.as_ref()),
            start_location: optional(request.start_location.as_ref()),
            distance_km: request.distance_km,
            spots: request.spots,
            registered: 0,
            requires_access_code: request.requires_access_code,
            access_code,
            image_url: optional(request.image_url.as_ref()),
            created_at: now.clone(),
            updated_at: now,
        };

        let mut rides = self.rides.lock().await?;
        rides.push(ride.clone());
        rides.commit().await?;

        tracing::info!("Created ride {} ({})", ride.title, ride.id);
        Ok(ride)
    }

    pub async fn update_ride(&self, id: &str, request: &UpdateRideRequest) -> Result<Ride, AppError> {
        let mut rides = self.rides.lock().await?;
        let ride = rides
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Ride {} not found", id)))?;

        if let Some(spots) = request.spots {
            if spots < ride.registered {
                return Err(AppError::Validation(format!(
                    "Spots cannot be lower than the {} riders already registered",
                    ride.registered
                )));
            }
            ride.spots = spots;
        }
        if let Some(title) = &request.title {
            ride.title = required(title, "Title")?;
        }
        if let Some(date) = &request.date {
            ride.date = required(date, "Date")?;
        }
        if request.description.is_some() {
            ride.description = optional(request.description.as_ref());
        }
        if request.start_time.is_some() {
            ride.start_time = optional(request.start_time.as_ref());
        }
        if request.start_location.is_some() {
            ride.start_location = optional(request.start_location.as_ref());
        }
        if request.distance_km.is_some() {
            ride.distance_km = request.distance_km;
        }
        if request.image_url.is_some() {
            ride.image_url = optional(request.image_url.as_ref());
        }
        if request.access_code.is_some() {
            ride.access_code = optional(request.access_code.as_ref());
        }
        if let Some(requires) = request.requires_access_code {
            ride.requires_access_code = requires;
        }
        if ride.requires_access_code && ride.access_code.is_none() {
            return Err(AppError::Validation(
                "An access code is required when the ride is access-controlled".to_string(),
            ));
        }
        ride.updated_at = now();

        let updated = ride.clone();
        rides.commit().await?;

        tracing::info!("Updated ride {}", updated.id);
        Ok(updated)
    }

    /// Delete a ride together with all of its participants.
    pub async fn delete_ride(&self, id: &str) -> Result<(), AppError> {
        let mut rides = self.rides.lock().await?;
        let mut participants = self.participants.lock().await?;

        if !rides.iter().any(|r| r.id == id) {
            return Err(AppError::NotFound(format!("Ride {} not found", id)));
        }

        rides.retain(|r| r.id != id);
        let before = participants.len();
        participants.retain(|p| p.ride_id != id);
        let removed = before - participants.len();

        participants.commit().await?;
        rides.commit().await?;

        tracing::info!("Deleted ride {} and {} participant(s)", id, removed);
        Ok(())
    }

    pub async fn list_participants(&self, ride_id: &str) -> Result<Vec<Participant>, AppError> {
        if self.get_ride(ride_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Ride {} not found", ride_id)));
        }

        let participants = self.participants.load().await?;
        Ok(participants
            .into_iter()
            .filter(|p| p.ride_id == ride_id)
            .collect())
    }

    /// Register a participant on a ride.
    ///
    /// Capacity and access code are checked, and the counter incremented, while
    /// both files are locked, so concurrent registrations cannot exceed `spots`.
    pub async fn register_participant(
        &self,
        ride_id: &str,
        request: &RegisterParticipantRequest,
    ) -> Result<Participant, AppError> {
        let mut rides = self.rides.lock().await?;
        let ride = rides
            .iter_mut()
            .find(|r| r.id == ride_id)
            .ok_or_else(|| AppError::NotFound(format!("Ride {} not found", ride_id)))?;

        if ride.is_full() {
            return Err(AppError::Validation("This ride is full".to_string()));
        }
        if !ride.access_code_matches(request.access_code.as_deref()) {
            tracing::warn!("Rejected registration for ride {}: wrong access code", ride_id);
            return Err(AppError::Validation("Invalid access code".to_string()));
        }

        let participant = Participant {
            id: new_id(),
            ride_id: ride_id.to_string(),
            name: required(&request.name, "Name")?,
            email: required(&request.email, "Email")?,
            phone: optional(request.phone.as_ref()),
            motorcycle: optional(request.motorcycle.as_ref()),
            emergency_contact: optional(request.emergency_contact.as_ref()),
            created_at: now(),
        };

        ride.registered += 1;
        ride.updated_at = now();
        let registered = ride.registered;

        let mut participants = self.participants.lock().await?;
        participants.push(participant.clone());
        rides.commit().await?;
        participants.commit().await?;

        tracing::info!(
            "Registered participant {} on ride {} ({} registered)",
            participant.id,
            ride_id,
            registered
        );
        Ok(participant)
    }

    /// Remove a participant and free up their spot.
    pub async fn delete_participant(&self, ride_id: &str, participant_id: &str) -> Result<(), AppError> {
        let mut rides = self.rides.lock().await?;
        let mut participants = self.participants.lock().await?;

        let before = participants.len();
        participants.retain(|p| !(p.id == participant_id && p.ride_id == ride_id));
        if participants.len() == before {
            return Err(AppError::NotFound(format!(
                "Participant {} not found on ride {}",
                participant_id, ride_id
            )));
        }

        if let Some(ride) = rides.iter_mut().find(|r| r.id == ride_id) {
            ride.registered = ride.registered.saturating_sub(1);
            ride.updated_at = now();
        }

        participants.commit().await?;
        rides.commit().await?;

        tracing::info!("Removed participant {} from ride {}", participant_id, ride_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ride_request(spots: u32, access_code: Option<&str>) -> CreateRideRequest {
        CreateRideRequest {
            title: "Ardennes tour".to_string(),
            description: None,
            date: "2026-06-14".to_string(),
            start_time: Some("09:00".to_string()),
            start_location: None,
            distance_km: Some(280),
            spots,
            requires_access_code: access_code.is_some(),
            access_code: access_code.map(str::to_string),
            image_url: None,
        }
    }

    fn rider(name: &str, access_code: Option<&str>) -> RegisterParticipantRequest {
        RegisterParticipantRequest {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            motorcycle: Some("R1250GS".to_string()),
            emergency_contact: None,
            access_code: access_code.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_full_ride_rejects_registration() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let ride = repo.create_ride(&ride_request(1, None)).await.unwrap();

        repo.register_participant(&ride.id, &rider("Ann", None))
            .await
            .unwrap();
        let result = repo.register_participant(&ride.id, &rider("Bob", None)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(repo.get_ride(&ride.id).await.unwrap().unwrap().registered, 1);
        assert_eq!(repo.list_participants(&ride.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_access_code_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let ride = repo
            .create_ride(&ride_request(10, Some("CHROME")))
            .await
            .unwrap();

        let result = repo
            .register_participant(&ride.id, &rider("Ann", Some("chrome")))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(repo.list_participants(&ride.id).await.unwrap().is_empty());
        assert_eq!(repo.get_ride(&ride.id).await.unwrap().unwrap().registered, 0);

        repo.register_participant(&ride.id, &rider("Ann", Some("CHROME")))
            .await
            .unwrap();
        assert_eq!(repo.get_ride(&ride.id).await.unwrap().unwrap().registered, 1);
    }

    #[tokio::test]
    async fn test_blank_rider_fields_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let ride = repo.create_ride(&ride_request(5, None)).await.unwrap();

        let blank_name = repo.register_participant(&ride.id, &rider("  ", None)).await;
        assert!(matches!(blank_name, Err(AppError::Validation(_))));

        let mut no_email = rider("Ann", None);
        no_email.email = String::new();
        let blank_email = repo.register_participant(&ride.id, &no_email).await;
        assert!(matches!(blank_email, Err(AppError::Validation(_))));

        assert!(repo.list_participants(&ride.id).await.unwrap().is_empty());
        assert_eq!(repo.get_ride(&ride.id).await.unwrap().unwrap().registered, 0);
    }

    #[tokio::test]
    async fn test_registration_check_order() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);

        let missing = repo.register_participant("nope", &rider("  ", None)).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let full = repo
            .create_ride(&ride_request(1, Some("CHROME")))
            .await
            .unwrap();
        repo.register_participant(&full.id, &rider("Ann", Some("CHROME")))
            .await
            .unwrap();
        let result = repo
            .register_participant(&full.id, &rider("Bob", Some("wrong")))
            .await;
        match result {
            Err(AppError::Validation(message)) => assert!(message.contains("full")),
            other => panic!("expected full ride error, got {:?}", other),
        }

        let gated = repo
            .create_ride(&ride_request(5, Some("CHROME")))
            .await
            .unwrap();
        let result = repo
            .register_participant(&gated.id, &rider("  ", Some("wrong")))
            .await;
        match result {
            Err(AppError::Validation(message)) => assert!(message.contains("access code")),
            other => panic!("expected access code error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_participant_write_keeps_spot_taken() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let ride = repo.create_ride(&ride_request(1, None)).await.unwrap();

        // Blocks the temp file the participants write goes through
        std::fs::create_dir(dir.path().join("participants.json.tmp")).unwrap();

        let result = repo.register_participant(&ride.id, &rider("Ann", None)).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(repo.participants.load().await.unwrap().is_empty());
        assert_eq!(repo.get_ride(&ride.id).await.unwrap().unwrap().registered, 1);

        let result = repo.register_participant(&ride.id, &rider("Bob", None)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_respect_capacity() {
        let dir = TempDir::new().unwrap();
        let repo = std::sync::Arc::new(Repository::new(dir.path(), 4));
        let ride = repo.create_ride(&ride_request(3, None)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let repo = repo.clone();
            let ride_id = ride.id.clone();
            handles.push(tokio::spawn(async move {
                repo.register_participant(&ride_id, &rider(&format!("Rider{i}"), None))
                    .await
                    .is_ok()
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 3);
        assert_eq!(repo.get_ride(&ride.id).await.unwrap().unwrap().registered, 3);
        assert_eq!(repo.list_participants(&ride.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_ride_cascades_to_participants() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let doomed = repo.create_ride(&ride_request(5, None)).await.unwrap();
        let kept = repo.create_ride(&ride_request(5, None)).await.unwrap();

        repo.register_participant(&doomed.id, &rider("Ann", None))
            .await
            .unwrap();
        repo.register_participant(&doomed.id, &rider("Bob", None))
            .await
            .unwrap();
        repo.register_participant(&kept.id, &rider("Cas", None))
            .await
            .unwrap();

        repo.delete_ride(&doomed.id).await.unwrap();

        let remaining = repo.participants.load().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].ride_id, kept.id);
        assert!(repo.get_ride(&doomed.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_participant_frees_spot() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let ride = repo.create_ride(&ride_request(1, None)).await.unwrap();
        let ann = repo
            .register_participant(&ride.id, &rider("Ann", None))
            .await
            .unwrap();

        repo.delete_participant(&ride.id, &ann.id).await.unwrap();

        assert_eq!(repo.get_ride(&ride.id).await.unwrap().unwrap().registered, 0);
        repo.register_participant(&ride.id, &rider("Bob", None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_spots_cannot_drop_below_registered() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let ride = repo.create_ride(&ride_request(4, None)).await.unwrap();
        repo.register_participant(&ride.id, &rider("Ann", None))
            .await
            .unwrap();
        repo.register_participant(&ride.id, &rider("Bob", None))
            .await
            .unwrap();

        let result = repo
            .update_ride(
                &ride.id,
                &UpdateRideRequest {
                    spots: Some(1),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
