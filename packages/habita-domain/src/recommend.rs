use std::collections::{HashMap, HashSet};

use serde::Serialize;

pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 100;
pub const WINDOW_SHORT: u32 = 7;
pub const WINDOW_LONG: u32 = 30;

/// Only two window lengths exist. Anything that is not exactly 30 collapses
/// to 7; this is a binary normalization, not a range check.
pub fn normalize_window(window: u32) -> u32 {
	if window == WINDOW_LONG { WINDOW_LONG } else { WINDOW_SHORT }
}

/// Per-source upper bounds derived from the requested limit. These are
/// reported back to the caller as requested, independent of how many
/// candidates each source actually produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Quotas {
	pub foaf: usize,
	pub similar: usize,
	pub trending: usize,
	pub fill: usize,
}
impl Quotas {
	pub fn from_limit(limit: usize) -> Self {
		let foaf = share(limit, 0.30);
		let similar = share(limit, 0.30);
		let trending = share(limit, 0.20);
		let fill = limit.saturating_sub(foaf + similar + trending);

		Self { foaf, similar, trending, fill }
	}
}

fn share(limit: usize, fraction: f64) -> usize {
	((limit as f64 * fraction).round() as usize).max(1)
}

/// Ranks friend-of-friend candidates. `paths` carries one entry per distinct
/// mutual-friend path, so the number of occurrences of an ID is its mutual
/// count. Excluded IDs are dropped before ranking so the quota is spent on
/// genuinely novel candidates. Ordering: mutual count descending, then ID
/// ascending.
pub fn rank_foaf(paths: &[i64], exclude: &HashSet<i64>, quota: usize) -> Vec<i64> {
	let mut mutual_counts: HashMap<i64, u32> = HashMap::new();

	for candidate in paths {
		if exclude.contains(candidate) {
			continue;
		}

		*mutual_counts.entry(*candidate).or_insert(0) += 1;
	}

	let mut ranked: Vec<(i64, u32)> = mutual_counts.into_iter().collect();

	ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

	ranked.into_iter().take(quota).map(|(candidate, _)| candidate).collect()
}

/// Jaccard index of two habit-name sets. Empty union scores zero.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
	let intersection = a.intersection(b).count();
	let union = a.union(b).count();

	if union == 0 { 0.0 } else { intersection as f64 / union as f64 }
}

/// Ranks interest-similarity candidates by habit-name Jaccard against the
/// requester's own set. A candidate with no shared name scores zero and is
/// never emitted. Ordering: score descending, then ID ascending.
pub fn rank_similarity(
	own_names: &HashSet<String>,
	candidates: &[(i64, HashSet<String>)],
	exclude: &HashSet<i64>,
	quota: usize,
) -> Vec<i64> {
	let mut scored: Vec<(i64, f64)> = candidates
		.iter()
		.filter(|(candidate, _)| !exclude.contains(candidate))
		.map(|(candidate, names)| (*candidate, jaccard(own_names, names)))
		.filter(|(_, score)| *score > 0.0)
		.collect();

	scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

	scored.into_iter().take(quota).map(|(candidate, _)| candidate).collect()
}

#[derive(Clone, Debug)]
pub struct TrendingCandidate {
	pub user_id: i64,
	pub username: String,
	pub friend_edges: i64,
	pub completions: i64,
}
impl TrendingCandidate {
	fn score(&self) -> i64 {
		2 * self.friend_edges + self.completions
	}
}

/// Ranks trending candidates by `2 * friendship edges + windowed
/// completions`. The tie-break is ascending username rather than ID; this is
/// display ordering and intentionally differs from the other two sources.
pub fn rank_trending(
	candidates: &[TrendingCandidate],
	exclude: &HashSet<i64>,
	quota: usize,
) -> Vec<i64> {
	let mut ranked: Vec<&TrendingCandidate> =
		candidates.iter().filter(|candidate| !exclude.contains(&candidate.user_id)).collect();

	ranked.sort_by(|a, b| {
		b.score()
			.cmp(&a.score())
			.then_with(|| a.username.to_lowercase().cmp(&b.username.to_lowercase()))
	});

	ranked.into_iter().take(quota).map(|candidate| candidate.user_id).collect()
}

/// Merges ranked source outputs in fixed priority order, deduplicating
/// against a running selected set seeded with the exclusion set. Stops as
/// soon as `limit` candidates are accepted; under-fill is the caller's
/// problem, not this function's.
pub fn merge_ranked(exclude: &HashSet<i64>, sources: &[Vec<i64>], limit: usize) -> Vec<i64> {
	let mut selected = exclude.clone();
	let mut merged = Vec::new();

	for source in sources {
		for candidate in source {
			if merged.len() == limit {
				return merged;
			}
			if selected.insert(*candidate) {
				merged.push(*candidate);
			}
		}
	}

	merged
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::{
		Quotas, TrendingCandidate, jaccard, merge_ranked, normalize_window, rank_foaf,
		rank_similarity, rank_trending,
	};

	fn names(values: &[&str]) -> HashSet<String> {
		values.iter().map(|value| value.to_string()).collect()
	}

	#[test]
	fn window_normalization_is_binary() {
		assert_eq!(normalize_window(30), 30);

		for window in [0, 1, 7, 14, 29, 31, 365] {
			assert_eq!(normalize_window(window), 7);
		}
	}

	#[test]
	fn quotas_sum_to_limit_for_every_valid_limit() {
		for limit in 1..=100 {
			let quotas = Quotas::from_limit(limit);

			assert_eq!(quotas.foaf + quotas.similar + quotas.trending + quotas.fill, limit.max(3));
			assert!(quotas.foaf >= 1);
			assert!(quotas.similar >= 1);
			assert!(quotas.trending >= 1);

			if limit >= 3 {
				assert_eq!(quotas.foaf + quotas.similar + quotas.trending + quotas.fill, limit);
			}
		}
	}

	#[test]
	fn quotas_for_limit_five_match_the_published_split() {
		let quotas = Quotas::from_limit(5);

		assert_eq!(quotas, Quotas { foaf: 2, similar: 2, trending: 1, fill: 0 });
	}

	#[test]
	fn quotas_for_limit_twenty_leave_room_for_fill() {
		let quotas = Quotas::from_limit(20);

		assert_eq!(quotas, Quotas { foaf: 6, similar: 6, trending: 4, fill: 4 });
	}

	#[test]
	fn foaf_ranks_by_mutual_count_then_id() {
		// 4 has two mutual paths; 2 and 9 have one each.
		let paths = vec![4, 2, 4, 9];
		let ranked = rank_foaf(&paths, &HashSet::new(), 10);

		assert_eq!(ranked, vec![4, 2, 9]);
	}

	#[test]
	fn foaf_drops_excluded_candidates_before_spending_quota() {
		let paths = vec![4, 4, 4, 2, 9];
		let exclude = HashSet::from([4]);
		let ranked = rank_foaf(&paths, &exclude, 2);

		assert_eq!(ranked, vec![2, 9]);
	}

	#[test]
	fn jaccard_stays_within_unit_interval() {
		let a = names(&["run", "read", "meditate"]);
		let b = names(&["run", "swim"]);
		let score = jaccard(&a, &b);

		assert!((0.0..=1.0).contains(&score));
		assert_eq!(score, 0.25);
		assert_eq!(jaccard(&a, &a), 1.0);
		assert_eq!(jaccard(&a, &HashSet::new()), 0.0);
		assert_eq!(jaccard(&HashSet::new(), &HashSet::new()), 0.0);
	}

	#[test]
	fn similarity_never_emits_zero_scores() {
		let own = names(&["run", "read"]);
		let candidates =
			vec![(2, names(&["run"])), (3, names(&["swim"])), (4, names(&["run", "read"]))];
		let ranked = rank_similarity(&own, &candidates, &HashSet::new(), 10);

		assert_eq!(ranked, vec![4, 2]);
	}

	#[test]
	fn similarity_ties_break_by_ascending_id() {
		let own = names(&["run"]);
		let candidates = vec![(7, names(&["run"])), (3, names(&["run"]))];
		let ranked = rank_similarity(&own, &candidates, &HashSet::new(), 10);

		assert_eq!(ranked, vec![3, 7]);
	}

	#[test]
	fn trending_scores_edges_double_and_breaks_ties_by_username() {
		let candidates = vec![
			TrendingCandidate { user_id: 5, username: "zoe".into(), friend_edges: 1, completions: 2 },
			TrendingCandidate { user_id: 3, username: "ana".into(), friend_edges: 0, completions: 4 },
			TrendingCandidate { user_id: 9, username: "Bob".into(), friend_edges: 2, completions: 6 },
		];
		// Scores: 5 -> 4, 3 -> 4, 9 -> 10. The 4-4 tie goes to "ana".
		let ranked = rank_trending(&candidates, &HashSet::new(), 10);

		assert_eq!(ranked, vec![9, 3, 5]);
	}

	#[test]
	fn merge_respects_priority_and_running_exclusion() {
		let exclude = HashSet::from([1]);
		let sources = vec![vec![4, 2], vec![2, 7, 1], vec![7, 8]];
		let merged = merge_ranked(&exclude, &sources, 10);

		assert_eq!(merged, vec![4, 2, 7, 8]);
	}

	#[test]
	fn merge_stops_at_limit() {
		let sources = vec![vec![4, 2], vec![7, 8]];
		let merged = merge_ranked(&HashSet::new(), &sources, 3);

		assert_eq!(merged, vec![4, 2, 7]);
	}

	#[test]
	fn merge_with_no_candidates_is_empty_not_an_error() {
		let merged = merge_ranked(&HashSet::from([1, 2]), &[Vec::new(), Vec::new()], 5);

		assert!(merged.is_empty());
	}
}
