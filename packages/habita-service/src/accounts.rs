use time::Date;

use habita_storage::queries;

use crate::{HabitaService, ServiceError, ServiceResult, time_serde};

const MIN_AGE_YEARS: i32 = 5;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SignupRequest {
	pub email: String,
	pub username: String,
	pub password: String,
	pub first_name: String,
	pub last_name: String,
	pub gender: Option<String>,
	/// `YYYY-MM-DD`.
	pub birth_date: Option<String>,
	/// Defaults to a public profile; private profiles opt out of discovery.
	pub is_public: Option<bool>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UserOut {
	pub id: i64,
	pub email: String,
	pub username: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProfileOut {
	pub first_name: String,
	pub last_name: String,
	pub gender: Option<String>,
	#[serde(default, with = "crate::time_serde::option_date")]
	pub birth_date: Option<Date>,
	pub bio: Option<String>,
	pub is_public: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SignupResponse {
	pub user: UserOut,
	pub profile: ProfileOut,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
	pub username: String,
	pub password: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LoginResponse {
	pub user: UserOut,
	pub profile: Option<ProfileOut>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateProfileRequest {
	pub user_id: i64,
	pub first_name: String,
	pub last_name: String,
	pub gender: Option<String>,
	pub birth_date: Option<String>,
	pub bio: Option<String>,
	pub is_public: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProfileResponse {
	pub profile: ProfileOut,
}

impl HabitaService {
	pub async fn signup(&self, req: SignupRequest) -> ServiceResult<SignupResponse> {
		for (value, field) in [
			(&req.email, "email"),
			(&req.username, "username"),
			(&req.password, "password"),
			(&req.first_name, "first_name"),
			(&req.last_name, "last_name"),
		] {
			if value.trim().is_empty() {
				return Err(ServiceError::InvalidRequest {
					message: format!("{field} is required."),
				});
			}
		}

		let birth_date = req.birth_date.as_deref().map(parse_birth_date).transpose()?;

		if let Some(birth_date) = birth_date
			&& age_on(birth_date, self.today()) < MIN_AGE_YEARS
		{
			return Err(ServiceError::InvalidRequest {
				message: format!("Minimum age is {MIN_AGE_YEARS} years."),
			});
		}
		if queries::username_exists(&self.db, &req.username).await? {
			return Err(ServiceError::InvalidRequest {
				message: "Username already exists.".to_string(),
			});
		}

		let is_public = req.is_public.unwrap_or(true);
		let mut tx = self.db.pool.begin().await?;
		let user_id =
			queries::insert_user_tx(&mut tx, &req.email, &req.username, &req.password).await?;

		queries::insert_profile_tx(
			&mut tx,
			user_id,
			&req.first_name,
			&req.last_name,
			req.gender.as_deref(),
			birth_date,
			None,
			is_public,
		)
		.await?;

		tx.commit().await?;

		tracing::info!(user_id, "New user signed up.");

		Ok(SignupResponse {
			user: UserOut { id: user_id, email: req.email, username: req.username },
			profile: ProfileOut {
				first_name: req.first_name,
				last_name: req.last_name,
				gender: req.gender,
				birth_date,
				bio: None,
				is_public,
			},
		})
	}

	pub async fn login(&self, req: LoginRequest) -> ServiceResult<LoginResponse> {
		let Some(user) =
			queries::fetch_user_by_credentials(&self.db, &req.username, &req.password).await?
		else {
			return Err(ServiceError::Unauthorized {
				message: "Invalid credentials.".to_string(),
			});
		};
		let profile = queries::fetch_profile(&self.db, user.id).await?.map(profile_out);

		Ok(LoginResponse {
			user: UserOut { id: user.id, email: user.email, username: user.username },
			profile,
		})
	}

	pub async fn profile(&self, user_id: i64) -> ServiceResult<ProfileResponse> {
		self.ensure_user_exists(user_id).await?;

		let Some(profile) = queries::fetch_profile(&self.db, user_id).await? else {
			return Err(ServiceError::NotFound {
				message: format!("Profile for user {user_id} not found."),
			});
		};

		Ok(ProfileResponse { profile: profile_out(profile) })
	}

	pub async fn update_profile(&self, req: UpdateProfileRequest) -> ServiceResult<ProfileResponse> {
		if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "first_name and last_name are required.".to_string(),
			});
		}

		let birth_date = req.birth_date.as_deref().map(parse_birth_date).transpose()?;

		self.ensure_user_exists(req.user_id).await?;

		let updated = queries::update_profile(
			&self.db,
			req.user_id,
			&req.first_name,
			&req.last_name,
			req.gender.as_deref(),
			birth_date,
			req.bio.as_deref(),
			req.is_public,
		)
		.await?;

		if updated == 0 {
			return Err(ServiceError::NotFound {
				message: format!("Profile for user {} not found.", req.user_id),
			});
		}

		self.profile(req.user_id).await
	}
}

pub(crate) fn profile_out(profile: habita_storage::models::Profile) -> ProfileOut {
	ProfileOut {
		first_name: profile.first_name,
		last_name: profile.last_name,
		gender: profile.gender,
		birth_date: profile.birth_date,
		bio: profile.bio,
		is_public: profile.is_public,
	}
}

fn parse_birth_date(raw: &str) -> ServiceResult<Date> {
	Date::parse(raw, time_serde::DATE_FORMAT).map_err(|_| ServiceError::InvalidRequest {
		message: "birth_date must be formatted as YYYY-MM-DD.".to_string(),
	})
}

fn age_on(birth_date: Date, today: Date) -> i32 {
	let mut age = today.year() - birth_date.year();

	if (today.month() as u8, today.day()) < (birth_date.month() as u8, birth_date.day()) {
		age -= 1;
	}

	age
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use super::{age_on, parse_birth_date};

	#[test]
	fn age_counts_completed_years_only() {
		let birth = date!(2020 - 06 - 15);

		assert_eq!(age_on(birth, date!(2025 - 06 - 14)), 4);
		assert_eq!(age_on(birth, date!(2025 - 06 - 15)), 5);
		assert_eq!(age_on(birth, date!(2025 - 06 - 16)), 5);
	}

	#[test]
	fn birth_date_must_be_iso_formatted() {
		assert!(parse_birth_date("2020-06-15").is_ok());
		assert!(parse_birth_date("15/06/2020").is_err());
		assert!(parse_birth_date("2020-13-01").is_err());
	}
}
