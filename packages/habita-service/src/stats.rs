use time::{Date, Duration};

use habita_domain::rollup;
use habita_storage::queries;

use crate::{HabitaService, ServiceResult};

const WEEK_DAYS: u32 = 7;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HabitStat {
	pub habit_id: i64,
	pub habit_name: String,
	pub done: u32,
	pub total_days: u32,
	pub today_done: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WeeklyStatsResponse {
	#[serde(with = "crate::time_serde::date")]
	pub today: Date,
	pub items: Vec<HabitStat>,
}

impl HabitaService {
	/// Seven-day inclusive rollup per habit, ending today. The aggregation
	/// itself is pure; only the window anchor comes from the clock.
	pub async fn weekly_stats(&self, user_id: i64) -> ServiceResult<WeeklyStatsResponse> {
		self.ensure_user_exists(user_id).await?;

		let today = self.today();
		let start = today - Duration::days(i64::from(WEEK_DAYS) - 1);
		let habits = queries::habits_by_user(&self.db, user_id).await?;
		let mut items = Vec::with_capacity(habits.len());

		for habit in habits {
			let logs = queries::logs_between(&self.db, habit.id, start, today).await?;
			let rollup = rollup::rollup(&logs, start, today, today);

			items.push(HabitStat {
				habit_id: habit.id,
				habit_name: habit.name,
				done: rollup.total_done,
				total_days: WEEK_DAYS,
				today_done: rollup.today_done,
			});
		}

		Ok(WeeklyStatsResponse { today, items })
	}
}
