use std::collections::HashMap;

use time::Date;

/// Completion rollup over one inclusive day window.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rollup {
	/// One entry per calendar day from `window_start` through `window_end`.
	pub per_day: Vec<bool>,
	pub total_done: u32,
	pub today_done: bool,
}

/// Aggregates `(day, value)` log rows over the inclusive window
/// `[window_start, window_end]`. Storage guarantees at most one row per day;
/// a missing day counts as not done. `today` is injected by the caller so the
/// function stays pure.
pub fn rollup(logs: &[(Date, i16)], window_start: Date, window_end: Date, today: Date) -> Rollup {
	let by_day: HashMap<Date, i16> = logs.iter().copied().collect();
	let mut per_day = Vec::new();
	let mut day = window_start;

	while day <= window_end {
		per_day.push(by_day.get(&day).copied().unwrap_or(0) != 0);

		day = match day.next_day() {
			Some(next) => next,
			None => break,
		};
	}

	let total_done = per_day.iter().filter(|done| **done).count() as u32;
	let today_done = by_day.get(&today).copied().unwrap_or(0) != 0;

	Rollup { per_day, total_done, today_done }
}

#[cfg(test)]
mod tests {
	use time::{Duration, macros::date};

	use super::rollup;

	#[test]
	fn empty_week_rolls_up_to_zero() {
		let end = date!(2025 - 06 - 10);
		let start = end - Duration::days(6);
		let result = rollup(&[], start, end, end);

		assert_eq!(result.per_day, vec![false; 7]);
		assert_eq!(result.total_done, 0);
		assert!(!result.today_done);
	}

	#[test]
	fn full_week_rolls_up_to_window_length() {
		let end = date!(2025 - 06 - 10);
		let start = end - Duration::days(6);
		let logs: Vec<_> = (0..7).map(|i| (start + Duration::days(i), 1)).collect();
		let result = rollup(&logs, start, end, end);

		assert_eq!(result.total_done, 7);
		assert!(result.today_done);
	}

	#[test]
	fn zero_valued_rows_do_not_count() {
		let end = date!(2025 - 06 - 10);
		let start = end - Duration::days(6);
		let logs = vec![(start, 1), (start + Duration::days(1), 0), (end, 0)];
		let result = rollup(&logs, start, end, end);

		assert_eq!(result.total_done, 1);
		assert!(!result.today_done);
	}

	#[test]
	fn rows_outside_the_window_are_ignored_for_totals() {
		let end = date!(2025 - 06 - 10);
		let start = end - Duration::days(6);
		let logs = vec![(start - Duration::days(1), 1), (end + Duration::days(1), 1)];
		let result = rollup(&logs, start, end, end);

		assert_eq!(result.total_done, 0);
	}

	#[test]
	fn thirty_day_window_has_thirty_entries() {
		let end = date!(2025 - 06 - 30);
		let start = end - Duration::days(29);
		let result = rollup(&[], start, end, end);

		assert_eq!(result.per_day.len(), 30);
	}

	#[test]
	fn inverted_window_yields_empty_rollup() {
		let start = date!(2025 - 06 - 10);
		let result = rollup(&[], start, start - Duration::days(1), start);

		assert!(result.per_day.is_empty());
		assert_eq!(result.total_done, 0);
	}
}
