use habita_storage::queries;

use crate::{HabitaService, ServiceError, ServiceResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HabitOut {
	pub id: i64,
	pub name: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HabitsResponse {
	pub habits: Vec<HabitOut>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateHabitRequest {
	pub user_id: i64,
	pub name: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateHabitResponse {
	pub id: i64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DeleteHabitRequest {
	pub habit_id: i64,
	pub user_id: i64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MarkTodayRequest {
	pub user_id: i64,
	pub habit_id: i64,
	/// 0 or 1.
	pub value: i16,
}

impl HabitaService {
	pub async fn habits(&self, user_id: i64) -> ServiceResult<HabitsResponse> {
		self.ensure_user_exists(user_id).await?;

		let habits = queries::habits_by_user(&self.db, user_id)
			.await?
			.into_iter()
			.map(|habit| HabitOut { id: habit.id, name: habit.name })
			.collect();

		Ok(HabitsResponse { habits })
	}

	pub async fn create_habit(&self, req: CreateHabitRequest) -> ServiceResult<CreateHabitResponse> {
		if req.name.trim().is_empty() {
			return Err(ServiceError::InvalidRequest { message: "name is required.".to_string() });
		}

		self.ensure_user_exists(req.user_id).await?;

		let id = queries::insert_habit(&self.db, req.user_id, req.name.trim()).await?;

		Ok(CreateHabitResponse { id })
	}

	pub async fn delete_habit(&self, req: DeleteHabitRequest) -> ServiceResult<()> {
		let deleted = queries::delete_habit(&self.db, req.habit_id, req.user_id).await?;

		if deleted == 0 {
			return Err(ServiceError::NotFound {
				message: format!("Habit {} not found.", req.habit_id),
			});
		}

		Ok(())
	}

	/// Upserts today's completion value for one habit. Last write per day
	/// wins.
	pub async fn mark_today(&self, req: MarkTodayRequest) -> ServiceResult<()> {
		if !matches!(req.value, 0 | 1) {
			return Err(ServiceError::InvalidRequest {
				message: "value must be 0 or 1.".to_string(),
			});
		}

		match queries::habit_owner(&self.db, req.habit_id).await? {
			None =>
				return Err(ServiceError::NotFound {
					message: format!("Habit {} not found.", req.habit_id),
				}),
			Some(owner_id) if owner_id != req.user_id =>
				return Err(ServiceError::Forbidden {
					message: "Habit belongs to another user.".to_string(),
				}),
			Some(_) => {},
		}

		queries::upsert_log(&self.db, req.habit_id, self.today(), req.value).await?;

		Ok(())
	}
}
