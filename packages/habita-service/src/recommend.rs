use std::collections::{HashMap, HashSet};

use time::Duration;

use habita_domain::recommend::{
	MAX_LIMIT, MIN_LIMIT, Quotas, TrendingCandidate, merge_ranked, normalize_window, rank_foaf,
	rank_similarity, rank_trending,
};
use habita_storage::{models::UserCard, queries};

use crate::{HabitaService, ServiceError, ServiceResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecommendRequest {
	pub user_id: i64,
	pub limit: Option<u32>,
	pub window: Option<u32>,
}

/// Requested per-source quotas, echoed back as-is. Callers use these for UI
/// hints; they do not reflect how far each source actually filled.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecommendMix {
	pub foaf: usize,
	pub similar: usize,
	pub trending: usize,
	pub fill: usize,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecommendedUser {
	pub id: i64,
	pub username: String,
	pub bio: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecommendResponse {
	pub window: u32,
	pub mix: RecommendMix,
	pub items: Vec<RecommendedUser>,
}

impl HabitaService {
	/// "People you may know": merges FOAF, habit-interest similarity, and
	/// trending activity under per-source quotas, deduplicated against the
	/// requester and their friends, with a randomized fill for any
	/// shortfall.
	pub async fn recommend(&self, req: RecommendRequest) -> ServiceResult<RecommendResponse> {
		let limit = req.limit.unwrap_or(self.cfg.recommend.default_limit);

		if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
			return Err(ServiceError::InvalidRequest {
				message: format!("limit must be within [{MIN_LIMIT}, {MAX_LIMIT}]."),
			});
		}

		let window = normalize_window(req.window.unwrap_or(self.cfg.recommend.default_window));

		self.ensure_user_exists(req.user_id).await?;

		let friends = queries::friend_ids(&self.db, req.user_id).await?;
		let mut exclusion: HashSet<i64> = friends.into_iter().collect();

		exclusion.insert(req.user_id);

		let limit = limit as usize;
		let quotas = Quotas::from_limit(limit);
		// The three sources are independent reads; only the merge is a
		// synchronization point.
		let (foaf, similar, trending) = tokio::try_join!(
			self.foaf_source(req.user_id, &exclusion, quotas.foaf),
			self.similarity_source(req.user_id, &exclusion, quotas.similar),
			self.trending_source(req.user_id, &exclusion, quotas.trending, window),
		)?;
		let mut selected = merge_ranked(&exclusion, &[foaf, similar, trending], limit);

		if selected.len() < limit {
			let exclude_now: Vec<i64> =
				exclusion.iter().chain(selected.iter()).copied().collect();
			let mut pool = queries::fill_pool(&self.db, &exclude_now).await?;

			self.shuffle.shuffle(&mut pool);
			selected.extend(pool.into_iter().take(limit - selected.len()));
		}

		let mut by_id: HashMap<i64, UserCard> = queries::resolve_users(&self.db, &selected)
			.await?
			.into_iter()
			.map(|card| (card.id, card))
			.collect();
		// Resolution preserves the merge order exactly.
		let items = selected
			.iter()
			.filter_map(|id| {
				by_id.remove(id).map(|card| RecommendedUser {
					id: card.id,
					username: card.username,
					bio: card.bio,
				})
			})
			.collect::<Vec<_>>();

		tracing::debug!(
			user_id = req.user_id,
			limit,
			window,
			returned = items.len(),
			"Computed recommendations."
		);

		Ok(RecommendResponse {
			window,
			mix: RecommendMix {
				foaf: quotas.foaf,
				similar: quotas.similar,
				trending: quotas.trending,
				fill: quotas.fill,
			},
			items,
		})
	}

	async fn foaf_source(
		&self,
		user_id: i64,
		exclusion: &HashSet<i64>,
		quota: usize,
	) -> ServiceResult<Vec<i64>> {
		let paths = queries::foaf_paths(&self.db, user_id).await?;

		Ok(rank_foaf(&paths, exclusion, quota))
	}

	async fn similarity_source(
		&self,
		user_id: i64,
		exclusion: &HashSet<i64>,
		quota: usize,
	) -> ServiceResult<Vec<i64>> {
		let own_names: HashSet<String> =
			queries::habit_names(&self.db, user_id).await?.into_iter().collect();

		if own_names.is_empty() {
			return Ok(Vec::new());
		}

		let candidate_ids = queries::similar_candidate_ids(&self.db, user_id).await?;

		if candidate_ids.is_empty() {
			return Ok(Vec::new());
		}

		let mut name_sets: HashMap<i64, HashSet<String>> = HashMap::new();

		for (candidate_id, name) in queries::habit_names_for(&self.db, &candidate_ids).await? {
			name_sets.entry(candidate_id).or_default().insert(name);
		}

		let candidates: Vec<(i64, HashSet<String>)> = name_sets.into_iter().collect();

		Ok(rank_similarity(&own_names, &candidates, exclusion, quota))
	}

	async fn trending_source(
		&self,
		user_id: i64,
		exclusion: &HashSet<i64>,
		quota: usize,
		window: u32,
	) -> ServiceResult<Vec<i64>> {
		let end = self.today();
		let start = end - Duration::days(i64::from(window) - 1);
		let candidates: Vec<TrendingCandidate> =
			queries::trending_rows(&self.db, user_id, start, end)
				.await?
				.into_iter()
				.map(|(user_id, username, friend_edges, completions)| TrendingCandidate {
					user_id,
					username,
					friend_edges,
					completions,
				})
				.collect();

		Ok(rank_trending(&candidates, exclusion, quota))
	}
}
