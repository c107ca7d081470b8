//! Location / Delivery Zone Repository

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    DeliveryZone, DeliveryZoneCreate, DeliveryZoneUpdate, Location, LocationCreate, LocationUpdate,
    DEFAULT_RADIUS_METERS,
};
use validator::Validate;

use crate::store::{Collection, DataStore};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, validate_optional_text, validate_radius, validate_required_text,
};

fn location_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::LocationNotFound, format!("Location {id} not found"))
        .with_detail("id", id)
}

fn zone_not_found(id: &str) -> AppError {
    AppError::with_message(
        ErrorCode::DeliveryZoneNotFound,
        format!("Delivery zone {id} not found"),
    )
    .with_detail("id", id)
}

#[derive(Debug, Clone)]
pub struct LocationRepository {
    store: DataStore,
}

impl LocationRepository {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// All locations ordered by name
    pub async fn find_all(&self) -> AppResult<Vec<Location>> {
        let mut locations: Vec<Location> = self.store.list(Collection::Locations).await?;
        locations.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(locations)
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Location>> {
        Ok(self.store.get(Collection::Locations, id).await?)
    }

    pub async fn create(&self, data: LocationCreate) -> AppResult<Location> {
        data.validate()?;
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
        let radius = data.radius_meters.unwrap_or(DEFAULT_RADIUS_METERS);
        validate_radius(radius)?;

        let location = Location {
            id: shared::util::new_id(),
            name: data.name.trim().to_string(),
            address: data.address,
            latitude: data.latitude,
            longitude: data.longitude,
            radius_meters: radius,
            is_active: data.is_active.unwrap_or(true),
        };
        self.store
            .put(Collection::Locations, &location.id, &location)
            .await?;
        tracing::info!(location_id = %location.id, name = %location.name, "Location created");
        Ok(location)
    }

    pub async fn update(&self, id: &str, data: LocationUpdate) -> AppResult<Location> {
        data.validate()?;
        let mut location = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| location_not_found(id))?;

        if let Some(name) = data.name {
            validate_required_text(&name, "name", MAX_NAME_LEN)?;
            location.name = name.trim().to_string();
        }
        if data.address.is_some() {
            validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)?;
            location.address = data.address;
        }
        if let Some(lat) = data.latitude {
            location.latitude = lat;
        }
        if let Some(lng) = data.longitude {
            location.longitude = lng;
        }
        if let Some(radius) = data.radius_meters {
            validate_radius(radius)?;
            location.radius_meters = radius;
        }
        if let Some(active) = data.is_active {
            location.is_active = active;
        }

        self.store.put(Collection::Locations, id, &location).await?;
        Ok(location)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.store.delete(Collection::Locations, id).await? {
            return Err(location_not_found(id));
        }
        tracing::info!(location_id = %id, "Location deleted");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryZoneRepository {
    store: DataStore,
}

impl DeliveryZoneRepository {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }

    /// All zones ordered by name
    pub async fn find_all(&self) -> AppResult<Vec<DeliveryZone>> {
        let mut zones: Vec<DeliveryZone> = self.store.list(Collection::DeliveryZones).await?;
        zones.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(zones)
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<DeliveryZone>> {
        Ok(self.store.get(Collection::DeliveryZones, id).await?)
    }

    pub async fn create(&self, data: DeliveryZoneCreate) -> AppResult<DeliveryZone> {
        data.validate()?;
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_radius(data.radius_meters)?;

        let zone = DeliveryZone {
            id: shared::util::new_id(),
            name: data.name.trim().to_string(),
            center_latitude: data.center_latitude,
            center_longitude: data.center_longitude,
            radius_meters: data.radius_meters,
            is_active: data.is_active.unwrap_or(true),
        };
        self.store
            .put(Collection::DeliveryZones, &zone.id, &zone)
            .await?;
        tracing::info!(zone_id = %zone.id, name = %zone.name, "Delivery zone created");
        Ok(zone)
    }

    pub async fn update(&self, id: &str, data: DeliveryZoneUpdate) -> AppResult<DeliveryZone> {
        data.validate()?;
        let mut zone = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| zone_not_found(id))?;

        if let Some(name) = data.name {
            validate_required_text(&name, "name", MAX_NAME_LEN)?;
            zone.name = name.trim().to_string();
        }
        if let Some(lat) = data.center_latitude {
            zone.center_latitude = lat;
        }
        if let Some(lng) = data.center_longitude {
            zone.center_longitude = lng;
        }
        if let Some(radius) = data.radius_meters {
            validate_radius(radius)?;
            zone.radius_meters = radius;
        }
        if let Some(active) = data.is_active {
            zone.is_active = active;
        }

        self.store.put(Collection::DeliveryZones, id, &zone).await?;
        Ok(zone)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.store.delete(Collection::DeliveryZones, id).await? {
            return Err(zone_not_found(id));
        }
        tracing::info!(zone_id = %id, "Delivery zone deleted");
        Ok(())
    }
}
