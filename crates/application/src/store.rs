//! Global registry of entity slices.

use std::sync::Arc;

use medadmin_domain::{AdminUser, Doctor, Entity, Hospital, NewsCategory};

use crate::crud_ports::CrudGateway;
use crate::crud_slice::CrudSlice;

/// Gateways backing each slice of the store.
pub struct StoreGateways {
    /// Hospital resource.
    pub hospitals: Arc<dyn CrudGateway<Hospital>>,
    /// Doctor resource.
    pub doctors: Arc<dyn CrudGateway<Doctor>>,
    /// News category resource.
    pub news_categories: Arc<dyn CrudGateway<NewsCategory>>,
    /// Admin user resource.
    pub users: Arc<dyn CrudGateway<AdminUser>>,
}

/// Dashboard shell counters for one slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceSummary {
    /// Resource name.
    pub name: &'static str,
    /// Backend total, or the listed item count without one.
    pub count: Option<u64>,
    /// Whether a dispatch is in flight.
    pub loading: bool,
    /// Last error message.
    pub error: Option<String>,
}

/// Global registry of entity slices shared by every screen.
#[derive(Clone)]
pub struct Store {
    hospitals: Arc<CrudSlice<Hospital>>,
    doctors: Arc<CrudSlice<Doctor>>,
    news_categories: Arc<CrudSlice<NewsCategory>>,
    users: Arc<CrudSlice<AdminUser>>,
}

impl Store {
    /// Creates one idle slice per gateway.
    #[must_use]
    pub fn new(gateways: StoreGateways) -> Self {
        Self {
            hospitals: Arc::new(CrudSlice::new(gateways.hospitals)),
            doctors: Arc::new(CrudSlice::new(gateways.doctors)),
            news_categories: Arc::new(CrudSlice::new(gateways.news_categories)),
            users: Arc::new(CrudSlice::new(gateways.users)),
        }
    }

    /// Hospital slice.
    #[must_use]
    pub fn hospitals(&self) -> Arc<CrudSlice<Hospital>> {
        Arc::clone(&self.hospitals)
    }

    /// Doctor slice.
    #[must_use]
    pub fn doctors(&self) -> Arc<CrudSlice<Doctor>> {
        Arc::clone(&self.doctors)
    }

    /// News category slice.
    #[must_use]
    pub fn news_categories(&self) -> Arc<CrudSlice<NewsCategory>> {
        Arc::clone(&self.news_categories)
    }

    /// Admin user slice.
    #[must_use]
    pub fn users(&self) -> Arc<CrudSlice<AdminUser>> {
        Arc::clone(&self.users)
    }

    /// Counters for every slice, in navigation order.
    pub async fn summary(&self) -> Vec<SliceSummary> {
        vec![
            summarize(&self.hospitals).await,
            summarize(&self.doctors).await,
            summarize(&self.news_categories).await,
            summarize(&self.users).await,
        ]
    }

    /// Clears every slice, e.g. on logout.
    pub async fn reset(&self) {
        self.hospitals.reset().await;
        self.doctors.reset().await;
        self.news_categories.reset().await;
        self.users.reset().await;
    }
}

async fn summarize<E: Entity>(slice: &CrudSlice<E>) -> SliceSummary {
    let state = slice.snapshot().await;
    SliceSummary {
        name: slice.name(),
        count: state.data.as_ref().map(|page| {
            page.total()
                .unwrap_or_else(|| u64::try_from(page.items().len()).unwrap_or(u64::MAX))
        }),
        loading: state.loading,
        error: state.error,
    }
}
