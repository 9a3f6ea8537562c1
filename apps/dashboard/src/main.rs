//! MedAdmin dashboard composition root.

#![forbid(unsafe_code)]

mod dashboard_config;
mod demo_seed;

use std::sync::Arc;

use medadmin_application::{
    EntityScreen, ListScope, NotificationLevel, ScreenConfig, Store, StoreGateways,
    doctor_screen, hospital_screen, news_category_screen, user_screen,
};
use medadmin_core::{AppError, AppResult, Session};
use medadmin_domain::Entity;
use medadmin_infrastructure::HttpCrudGateway;
use tracing::{info, warn};
use url::Url;

use crate::dashboard_config::{DashboardConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = DashboardConfig::load()?;
    let session = Arc::new(Session::new(
        config.user.clone(),
        config.user.clone(),
        config.role,
        config.api_token.clone(),
    ));

    let gateways = match (&config.api_base_url, config.offline) {
        (Some(base_url), false) => http_gateways(&config, base_url, &session)?,
        _ => demo_seed::gateways()?,
    };
    let store = Store::new(gateways);

    info!(
        user = session.display_name(),
        role = %session.role(),
        offline = config.offline || config.api_base_url.is_none(),
        api_base_url = config.api_base_url.as_ref().map_or("", Url::as_str),
        "medadmin-dashboard started"
    );

    let screen_config = ScreenConfig {
        create_policy: config.create_policy,
        ..ScreenConfig::default()
    };

    let mut hospitals = hospital_screen(
        Arc::clone(&session),
        store.hospitals(),
        screen_config.clone(),
    )?;
    hospitals.refresh().await;
    report(&mut hospitals).await;

    let listed_hospitals = store
        .hospitals()
        .snapshot()
        .await
        .data
        .map(|page| page.items().to_vec())
        .unwrap_or_default();
    let doctor_scope = config
        .doctor_hospital_id
        .as_ref()
        .map_or_else(ListScope::all, |id| ListScope::by_parent("hospital_id", id));
    let mut doctors = doctor_screen(
        Arc::clone(&session),
        store.doctors(),
        &listed_hospitals,
        ScreenConfig {
            scope: doctor_scope,
            ..screen_config.clone()
        },
    )?;
    doctors.refresh().await;
    report(&mut doctors).await;

    let mut news_categories = news_category_screen(
        Arc::clone(&session),
        store.news_categories(),
        screen_config.clone(),
    )?;
    news_categories.refresh().await;
    report(&mut news_categories).await;

    let mut users = user_screen(Arc::clone(&session), store.users(), screen_config)?;
    users.refresh().await;
    report(&mut users).await;

    for entry in store.summary().await {
        info!(
            slice = entry.name,
            count = entry.count,
            loading = entry.loading,
            error = entry.error.as_deref().unwrap_or(""),
            "slice summary"
        );
    }

    Ok(())
}

fn http_gateways(
    config: &DashboardConfig,
    base_url: &Url,
    session: &Arc<Session>,
) -> AppResult<StoreGateways> {
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    Ok(StoreGateways {
        hospitals: Arc::new(HttpCrudGateway::new(
            http_client.clone(),
            base_url.clone(),
            Arc::clone(session),
        )),
        doctors: Arc::new(HttpCrudGateway::new(
            http_client.clone(),
            base_url.clone(),
            Arc::clone(session),
        )),
        news_categories: Arc::new(HttpCrudGateway::new(
            http_client.clone(),
            base_url.clone(),
            Arc::clone(session),
        )),
        users: Arc::new(HttpCrudGateway::new(
            http_client,
            base_url.clone(),
            Arc::clone(session),
        )),
    })
}

async fn report<E: Entity>(screen: &mut EntityScreen<E>) {
    let columns: Vec<&str> = screen.columns().iter().map(|column| column.label()).collect();
    let rows = screen.rows().await;
    info!(
        resource = E::RESOURCE,
        columns = %columns.join(" | "),
        rows = rows.len(),
        "screen loaded"
    );
    for row in &rows {
        info!(resource = E::RESOURCE, row = %row.join(" | "), "listed");
    }

    for notification in screen.drain_notifications() {
        match notification.level {
            NotificationLevel::Success => {
                info!(resource = E::RESOURCE, message = %notification.message, "notification");
            }
            NotificationLevel::Error => {
                warn!(resource = E::RESOURCE, message = %notification.message, "notification");
            }
        }
    }
}
