//! Service catalog
//!
//! Ordered set of services offered by the salon. Only the master mutates it;
//! every reader gets cloned values so no lock outlives a call. Ids of removed
//! services are retired and never handed out again.

use std::collections::BTreeSet;
use std::sync::RwLock;

use crate::booking::error::{BookingError, BookingResult, EntityKind};
use crate::booking::types::{Service, ServicePatch, MINUTES_PER_DAY};
use crate::core::strings::slugify;
use crate::core::sync;

const FALLBACK_SLUG: &str = "service";

#[derive(Debug, Default)]
struct CatalogState {
    services: Vec<Service>,
    retired: BTreeSet<String>,
}

impl CatalogState {
    fn is_taken(&self, id: &str) -> bool {
        self.retired.contains(id) || self.services.iter().any(|s| s.id == id)
    }
}

/// Thread-safe service catalog in insertion order
#[derive(Debug, Default)]
pub struct Catalog {
    state: RwLock<CatalogState>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a catalog from previously stored services, keeping their ids
    pub fn with_services(services: Vec<Service>) -> Self {
        Self::restore(services, Vec::new())
    }

    /// Rebuild a catalog together with the ids of services removed earlier
    pub fn restore(services: Vec<Service>, retired: Vec<String>) -> Self {
        Self {
            state: RwLock::new(CatalogState {
                services,
                retired: retired.into_iter().collect(),
            }),
        }
    }

    /// The salon's starter menu
    pub fn with_default_services() -> Self {
        let services = [
            ("classic_manicure", "Classic manicure", 1500, 60),
            ("gel_polish_manicure", "Gel polish manicure", 2500, 120),
            ("gel_polish_removal", "Gel polish removal", 500, 30),
        ]
        .into_iter()
        .map(|(id, name, price, duration_minutes)| Service {
            id: id.to_string(),
            name: name.to_string(),
            price,
            duration_minutes,
        })
        .collect();
        Self::with_services(services)
    }

    /// Add a service, deriving a unique id from its name
    pub fn add_service(&self, name: &str, price: i64, duration: i64) -> BookingResult<Service> {
        let name = validate_name(name)?;
        let price = validate_price(price)?;
        let duration_minutes = validate_duration(duration)?;

        let mut state = self.write()?;
        let id = unique_id(&state, &name);
        let service = Service {
            id,
            name,
            price,
            duration_minutes,
        };
        state.services.push(service.clone());
        log::info!(
            "Service '{}' added as {} ({} / {} min)",
            service.name,
            service.id,
            service.price,
            service.duration_minutes
        );
        Ok(service)
    }

    /// Apply a partial update; the id never changes
    pub fn update_service(&self, id: &str, patch: ServicePatch) -> BookingResult<Service> {
        let name = patch.name.as_deref().map(validate_name).transpose()?;
        let price = patch.price.map(validate_price).transpose()?;
        let duration = patch.duration_minutes.map(validate_duration).transpose()?;

        let mut state = self.write()?;
        let service = state
            .services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| BookingError::not_found(EntityKind::Service, id))?;

        if let Some(name) = name {
            service.name = name;
        }
        if let Some(price) = price {
            service.price = price;
        }
        if let Some(duration) = duration {
            service.duration_minutes = duration;
        }
        log::info!("Service {} updated", service.id);
        Ok(service.clone())
    }

    /// Remove a service; appointments that reference it keep their own copy
    pub fn remove_service(&self, id: &str) -> BookingResult<Service> {
        let mut state = self.write()?;
        let position = state
            .services
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| BookingError::not_found(EntityKind::Service, id))?;
        let removed = state.services.remove(position);
        state.retired.insert(removed.id.clone());
        log::info!("Service {} ('{}') removed", removed.id, removed.name);
        Ok(removed)
    }

    pub fn get_service(&self, id: &str) -> BookingResult<Service> {
        self.read()?
            .services
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| BookingError::not_found(EntityKind::Service, id))
    }

    pub fn list_services(&self) -> BookingResult<Vec<Service>> {
        Ok(self.read()?.services.clone())
    }

    /// Ids of removed services, sorted
    pub fn retired_ids(&self) -> BookingResult<Vec<String>> {
        Ok(self.read()?.retired.iter().cloned().collect())
    }

    fn read(&self) -> BookingResult<std::sync::RwLockReadGuard<'_, CatalogState>> {
        sync::read(&self.state, "catalog", BookingError::internal)
    }

    fn write(&self) -> BookingResult<std::sync::RwLockWriteGuard<'_, CatalogState>> {
        sync::write(&self.state, "catalog", BookingError::internal)
    }
}

fn unique_id(state: &CatalogState, name: &str) -> String {
    let mut base = slugify(name);
    if base.is_empty() {
        base = FALLBACK_SLUG.to_string();
    }
    let taken = |candidate: &str| state.is_taken(candidate);
    if !taken(&base) {
        return base;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{}_{}", base, suffix);
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn validate_name(name: &str) -> BookingResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BookingError::validation("service name must not be empty"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_price(price: i64) -> BookingResult<u64> {
    u64::try_from(price)
        .map_err(|_| BookingError::validation(format!("price {} must not be negative", price)))
}

fn validate_duration(duration: i64) -> BookingResult<u32> {
    if duration <= 0 {
        return Err(BookingError::validation(format!(
            "duration {} must be a positive number of minutes",
            duration
        )));
    }
    if duration > i64::from(MINUTES_PER_DAY) {
        return Err(BookingError::validation(format!(
            "duration {} minutes is longer than a day",
            duration
        )));
    }
    Ok(duration as u32)
}
