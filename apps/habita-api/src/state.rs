use std::sync::Arc;

use habita_service::HabitaService;
use habita_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<HabitaService>,
}
impl AppState {
	pub async fn new(config: habita_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = HabitaService::new(config, db);

		Ok(Self { service: Arc::new(service) })
	}
}
