use metrics_exporter_prometheus::PrometheusHandle;
use staff_boarding::config::BoardingConfig;
use staff_boarding::error::AppError;
use staff_boarding::workflows::boarding::{
    BoardingFixtures, BoardingService, InMemoryBoardingStore, RoleHierarchy,
};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type InMemoryBoardingService =
    BoardingService<InMemoryBoardingStore, InMemoryBoardingStore, RoleHierarchy>;

/// Reads tickets, pay grades, and existing staff from a JSON fixtures file.
pub(crate) fn load_fixtures(path: &Path) -> Result<InMemoryBoardingStore, AppError> {
    let reader = BufReader::new(File::open(path)?);
    let fixtures: BoardingFixtures = serde_json::from_reader(reader)?;
    Ok(InMemoryBoardingStore::from_fixtures(fixtures)?)
}

/// Builds the store for `config`, seeding it from fixtures when a path is set.
pub(crate) fn boarding_store(
    config: &BoardingConfig,
    fixtures_override: Option<&Path>,
) -> Result<InMemoryBoardingStore, AppError> {
    match fixtures_override.or(config.fixtures_path.as_deref()) {
        Some(path) => load_fixtures(path),
        None => Ok(InMemoryBoardingStore::new()),
    }
}

pub(crate) fn boarding_service(
    store: InMemoryBoardingStore,
    config: &BoardingConfig,
) -> Arc<InMemoryBoardingService> {
    let store = Arc::new(store);
    Arc::new(
        BoardingService::new(
            store.clone(),
            store,
            Arc::new(RoleHierarchy::standard()),
        )
        .with_staff_type_rule(config.staff_type_rule()),
    )
}
