use std::sync::Arc;

use medadmin_application::StoreGateways;
use medadmin_core::{AppError, AppResult};
use medadmin_domain::Entity;
use medadmin_infrastructure::InMemoryCrudGateway;
use serde_json::{Value, json};
use tracing::info;

pub fn gateways() -> AppResult<StoreGateways> {
    let gateways = StoreGateways {
        hospitals: Arc::new(seeded(json!([
            {"id": 1, "name": "St. Mary General", "phone": "555-0101", "status": 1},
            {"id": 2, "name": "Riverside Clinic", "phone": "555-0102", "status": 1},
            {"id": 3, "name": "Northgate Children's", "phone": "555-0103", "status": 0}
        ]))?),
        doctors: Arc::new(seeded(json!([
            {"id": 1, "name": "Dr. Amara Obi", "hospital_id": 1, "specialty": "Cardiology", "status": 1},
            {"id": 2, "name": "Dr. Kenji Ito", "hospital_id": 1, "specialty": "Radiology", "status": 1},
            {"id": 3, "name": "Dr. Lena Roy", "hospital_id": 2, "specialty": "Pediatrics", "status": 1}
        ]))?),
        news_categories: Arc::new(seeded(json!([
            {"id": 1, "name": "Announcements", "slug": "announcements", "status": 1},
            {"id": 2, "name": "Research", "slug": "research", "status": 1}
        ]))?),
        users: Arc::new(seeded(json!([
            {"id": 1, "username": "admin", "email": "admin@medadmin.local", "role": "admin", "is_active": true},
            {"id": 2, "username": "editor", "email": "editor@medadmin.local", "role": "editor", "is_active": false}
        ]))?),
    };

    info!("serving demo records from memory");
    Ok(gateways)
}

fn seeded<E: Entity>(records: Value) -> AppResult<InMemoryCrudGateway<E>> {
    let records: Vec<E> = serde_json::from_value(records).map_err(|error| {
        AppError::Internal(format!("invalid {} demo seed: {error}", E::RESOURCE))
    })?;
    InMemoryCrudGateway::with_records(records)
}
