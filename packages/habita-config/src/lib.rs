mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Postgres, Recommend, Security, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if !(1..=100).contains(&cfg.recommend.default_limit) {
		return Err(Error::Validation {
			message: "recommend.default_limit must be within [1, 100].".to_string(),
		});
	}
	if !matches!(cfg.recommend.default_window, 7 | 30) {
		return Err(Error::Validation {
			message: "recommend.default_window must be either 7 or 30.".to_string(),
		});
	}

	Ok(())
}
