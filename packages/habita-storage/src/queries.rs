use sqlx::{Postgres, Transaction};
use time::Date;

use crate::{
	Result,
	db::Db,
	models::{CommentRow, Habit, Post, PostListing, Profile, User, UserCard},
};

const POST_LISTING_COLUMNS: &str = "\
p.id,
p.user_id AS author_id,
u.username,
p.content,
p.habit_id,
p.visibility,
p.created_at,
(SELECT count(*) FROM post_likes pl WHERE pl.post_id = p.id) AS likes,
(SELECT count(*) FROM post_comments pc WHERE pc.post_id = p.id) AS comments,
EXISTS (SELECT 1 FROM post_likes pl WHERE pl.post_id = p.id AND pl.user_id = ";

// --- Users and profiles ---

pub async fn username_exists(db: &Db, username: &str) -> Result<bool> {
	let exists: bool =
		sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
			.bind(username)
			.fetch_one(&db.pool)
			.await?;

	Ok(exists)
}

pub async fn user_exists(db: &Db, user_id: i64) -> Result<bool> {
	let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
		.bind(user_id)
		.fetch_one(&db.pool)
		.await?;

	Ok(exists)
}

pub async fn insert_user_tx(
	tx: &mut Transaction<'_, Postgres>,
	email: &str,
	username: &str,
	password: &str,
) -> Result<i64> {
	let id: i64 = sqlx::query_scalar(
		"INSERT INTO users (email, username, password) VALUES ($1, $2, $3) RETURNING id",
	)
	.bind(email)
	.bind(username)
	.bind(password)
	.fetch_one(&mut **tx)
	.await?;

	Ok(id)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_profile_tx(
	tx: &mut Transaction<'_, Postgres>,
	user_id: i64,
	first_name: &str,
	last_name: &str,
	gender: Option<&str>,
	birth_date: Option<Date>,
	bio: Option<&str>,
	is_public: bool,
) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO profiles (user_id, first_name, last_name, gender, birth_date, bio, is_public)
VALUES ($1, $2, $3, $4, $5, $6, $7)",
	)
	.bind(user_id)
	.bind(first_name)
	.bind(last_name)
	.bind(gender)
	.bind(birth_date)
	.bind(bio)
	.bind(is_public)
	.execute(&mut **tx)
	.await?;

	Ok(())
}

pub async fn fetch_user_by_credentials(
	db: &Db,
	username: &str,
	password: &str,
) -> Result<Option<User>> {
	let user = sqlx::query_as(
		"SELECT id, email, username, created_at FROM users WHERE username = $1 AND password = $2",
	)
	.bind(username)
	.bind(password)
	.fetch_optional(&db.pool)
	.await?;

	Ok(user)
}

pub async fn fetch_profile(db: &Db, user_id: i64) -> Result<Option<Profile>> {
	let profile = sqlx::query_as(
		"\
SELECT user_id, first_name, last_name, gender, birth_date, bio, is_public
FROM profiles
WHERE user_id = $1",
	)
	.bind(user_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(profile)
}

#[allow(clippy::too_many_arguments)]
pub async fn update_profile(
	db: &Db,
	user_id: i64,
	first_name: &str,
	last_name: &str,
	gender: Option<&str>,
	birth_date: Option<Date>,
	bio: Option<&str>,
	is_public: bool,
) -> Result<u64> {
	let result = sqlx::query(
		"\
UPDATE profiles
SET
	first_name = $1,
	last_name = $2,
	gender = $3,
	birth_date = $4,
	bio = $5,
	is_public = $6
WHERE user_id = $7",
	)
	.bind(first_name)
	.bind(last_name)
	.bind(gender)
	.bind(birth_date)
	.bind(bio)
	.bind(is_public)
	.bind(user_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected())
}

pub async fn resolve_users(db: &Db, ids: &[i64]) -> Result<Vec<UserCard>> {
	let cards = sqlx::query_as(
		"\
SELECT u.id, u.username, p.bio
FROM users u
LEFT JOIN profiles p ON p.user_id = u.id
WHERE u.id = ANY($1)",
	)
	.bind(ids)
	.fetch_all(&db.pool)
	.await?;

	Ok(cards)
}

// --- Habits and logs ---

pub async fn habits_by_user(db: &Db, user_id: i64) -> Result<Vec<Habit>> {
	let habits =
		sqlx::query_as("SELECT id, user_id, name FROM habits WHERE user_id = $1 ORDER BY id DESC")
			.bind(user_id)
			.fetch_all(&db.pool)
			.await?;

	Ok(habits)
}

pub async fn insert_habit(db: &Db, user_id: i64, name: &str) -> Result<i64> {
	let id: i64 =
		sqlx::query_scalar("INSERT INTO habits (user_id, name) VALUES ($1, $2) RETURNING id")
			.bind(user_id)
			.bind(name)
			.fetch_one(&db.pool)
			.await?;

	Ok(id)
}

pub async fn habit_owner(db: &Db, habit_id: i64) -> Result<Option<i64>> {
	let owner = sqlx::query_scalar("SELECT user_id FROM habits WHERE id = $1")
		.bind(habit_id)
		.fetch_optional(&db.pool)
		.await?;

	Ok(owner)
}

/// Log rows cascade with the habit; ownership is part of the predicate so a
/// foreign habit deletes nothing.
pub async fn delete_habit(db: &Db, habit_id: i64, user_id: i64) -> Result<u64> {
	let result = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
		.bind(habit_id)
		.bind(user_id)
		.execute(&db.pool)
		.await?;

	Ok(result.rows_affected())
}

/// Upsert on the (habit_id, day) uniqueness constraint; last write per day
/// wins.
pub async fn upsert_log(db: &Db, habit_id: i64, day: Date, value: i16) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO habit_logs (habit_id, day, value)
VALUES ($1, $2, $3)
ON CONFLICT (habit_id, day) DO UPDATE
SET value = EXCLUDED.value",
	)
	.bind(habit_id)
	.bind(day)
	.bind(value)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn logs_between(db: &Db, habit_id: i64, start: Date, end: Date) -> Result<Vec<(Date, i16)>> {
	let rows = sqlx::query_as(
		"SELECT day, value FROM habit_logs WHERE habit_id = $1 AND day BETWEEN $2 AND $3",
	)
	.bind(habit_id)
	.bind(start)
	.bind(end)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

// --- Friendships ---

pub async fn friend_ids(db: &Db, user_id: i64) -> Result<Vec<i64>> {
	let ids = sqlx::query_scalar("SELECT friend_id FROM friendships WHERE user_id = $1")
		.bind(user_id)
		.fetch_all(&db.pool)
		.await?;

	Ok(ids)
}

pub async fn are_friends(db: &Db, user_id: i64, other_id: i64) -> Result<bool> {
	let exists: bool = sqlx::query_scalar(
		"SELECT EXISTS (SELECT 1 FROM friendships WHERE user_id = $1 AND friend_id = $2)",
	)
	.bind(user_id)
	.bind(other_id)
	.fetch_one(&db.pool)
	.await?;

	Ok(exists)
}

/// Inserts both directed edges in one statement so the relation stays
/// symmetric even if the call races with itself.
pub async fn insert_friendship(db: &Db, user_id: i64, friend_id: i64) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO friendships (user_id, friend_id)
VALUES ($1, $2), ($2, $1)
ON CONFLICT (user_id, friend_id) DO NOTHING",
	)
	.bind(user_id)
	.bind(friend_id)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn delete_friendship(db: &Db, user_id: i64, friend_id: i64) -> Result<u64> {
	let result = sqlx::query(
		"\
DELETE FROM friendships
WHERE (user_id = $1 AND friend_id = $2)
	OR (user_id = $2 AND friend_id = $1)",
	)
	.bind(user_id)
	.bind(friend_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected())
}

pub async fn friends_with_usernames(db: &Db, user_id: i64) -> Result<Vec<(i64, String)>> {
	let rows = sqlx::query_as(
		"\
SELECT u.id, u.username
FROM friendships f
JOIN users u ON u.id = f.friend_id
WHERE f.user_id = $1
ORDER BY lower(u.username)",
	)
	.bind(user_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

// --- Recommendation signal reads ---

/// One row per distinct (intermediate friend, candidate) pair, restricted to
/// candidates with a public profile. The domain layer counts occurrences per
/// candidate to get mutual-path counts.
pub async fn foaf_paths(db: &Db, user_id: i64) -> Result<Vec<i64>> {
	let pairs: Vec<(i64, i64)> = sqlx::query_as(
		"\
SELECT DISTINCT f1.friend_id AS via_id, f2.friend_id AS candidate_id
FROM friendships f1
JOIN friendships f2 ON f2.user_id = f1.friend_id
JOIN profiles p ON p.user_id = f2.friend_id AND p.is_public
WHERE f1.user_id = $1",
	)
	.bind(user_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(pairs.into_iter().map(|(_, candidate_id)| candidate_id).collect())
}

pub async fn habit_names(db: &Db, user_id: i64) -> Result<Vec<String>> {
	let names = sqlx::query_scalar("SELECT DISTINCT name FROM habits WHERE user_id = $1")
		.bind(user_id)
		.fetch_all(&db.pool)
		.await?;

	Ok(names)
}

/// Public-profile users sharing at least one habit name with the requester.
/// Habits are matched by label, not by ID.
pub async fn similar_candidate_ids(db: &Db, user_id: i64) -> Result<Vec<i64>> {
	let ids = sqlx::query_scalar(
		"\
SELECT DISTINCT h.user_id
FROM habits h
JOIN profiles p ON p.user_id = h.user_id AND p.is_public
WHERE h.user_id <> $1
	AND h.name IN (SELECT name FROM habits WHERE user_id = $1)",
	)
	.bind(user_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(ids)
}

pub async fn habit_names_for(db: &Db, user_ids: &[i64]) -> Result<Vec<(i64, String)>> {
	let rows = sqlx::query_as("SELECT DISTINCT user_id, name FROM habits WHERE user_id = ANY($1)")
		.bind(user_ids)
		.fetch_all(&db.pool)
		.await?;

	Ok(rows)
}

/// Raw trending inputs for every public-profile user except the requester:
/// friendship edge count plus habit completions inside the inclusive day
/// window. Scoring and ordering happen in the domain layer.
pub async fn trending_rows(
	db: &Db,
	user_id: i64,
	window_start: Date,
	window_end: Date,
) -> Result<Vec<(i64, String, i64, i64)>> {
	let rows = sqlx::query_as(
		"\
SELECT
	u.id,
	u.username,
	(SELECT count(*) FROM friendships f WHERE f.user_id = u.id) AS friend_edges,
	(
		SELECT coalesce(sum(l.value), 0)
		FROM habit_logs l
		JOIN habits h ON h.id = l.habit_id
		WHERE h.user_id = u.id AND l.day BETWEEN $2 AND $3
	) AS completions
FROM users u
JOIN profiles p ON p.user_id = u.id AND p.is_public
WHERE u.id <> $1",
	)
	.bind(user_id)
	.bind(window_start)
	.bind(window_end)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Public-profile users outside the exclusion list, in stable ID order. The
/// caller owns the randomization.
pub async fn fill_pool(db: &Db, exclude: &[i64]) -> Result<Vec<i64>> {
	let ids = sqlx::query_scalar(
		"\
SELECT u.id
FROM users u
JOIN profiles p ON p.user_id = u.id AND p.is_public
WHERE u.id <> ALL($1)
ORDER BY u.id",
	)
	.bind(exclude)
	.fetch_all(&db.pool)
	.await?;

	Ok(ids)
}

// --- Posts and engagement ---

pub async fn insert_post(
	db: &Db,
	user_id: i64,
	habit_id: Option<i64>,
	content: &str,
	visibility: &str,
) -> Result<Post> {
	let post = sqlx::query_as(
		"\
INSERT INTO posts (user_id, habit_id, content, visibility)
VALUES ($1, $2, $3, $4)
RETURNING id, user_id, habit_id, content, visibility, created_at",
	)
	.bind(user_id)
	.bind(habit_id)
	.bind(content)
	.bind(visibility)
	.fetch_one(&db.pool)
	.await?;

	Ok(post)
}

pub async fn fetch_post(db: &Db, post_id: i64) -> Result<Option<Post>> {
	let post = sqlx::query_as(
		"SELECT id, user_id, habit_id, content, visibility, created_at FROM posts WHERE id = $1",
	)
	.bind(post_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(post)
}

/// Aggregate feed page for one viewer: own posts, all friends' posts, and
/// public posts on public profiles. Deliberately broader than the
/// single-profile listing. Newest first, ID as the tie-break.
pub async fn feed_page(db: &Db, viewer_id: i64, limit: i64, offset: i64) -> Result<Vec<PostListing>> {
	let sql = format!(
		"\
SELECT
{POST_LISTING_COLUMNS}$1) AS liked_by_me
FROM posts p
JOIN users u ON u.id = p.user_id
WHERE p.user_id = $1
	OR p.user_id IN (SELECT friend_id FROM friendships WHERE user_id = $1)
	OR (
		p.visibility = 'public'
		AND EXISTS (SELECT 1 FROM profiles pr WHERE pr.user_id = p.user_id AND pr.is_public)
	)
ORDER BY p.created_at DESC, p.id DESC
LIMIT $2 OFFSET $3",
	);
	let rows = sqlx::query_as(&sql)
		.bind(viewer_id)
		.bind(limit)
		.bind(offset)
		.fetch_all(&db.pool)
		.await?;

	Ok(rows)
}

/// One author's posts for a given viewer. When `only_public` is set the
/// query keeps `visibility = 'public'` rows only; the caller decides that
/// flag from the visibility policy.
pub async fn posts_by_author(
	db: &Db,
	viewer_id: i64,
	author_id: i64,
	only_public: bool,
	limit: i64,
	offset: i64,
) -> Result<Vec<PostListing>> {
	let mut builder = sqlx::QueryBuilder::new("SELECT\n");

	builder.push(POST_LISTING_COLUMNS);
	builder.push_bind(viewer_id);
	builder.push(") AS liked_by_me\nFROM posts p\nJOIN users u ON u.id = p.user_id\nWHERE p.user_id = ");
	builder.push_bind(author_id);

	if only_public {
		builder.push(" AND p.visibility = 'public'");
	}

	builder.push("\nORDER BY p.created_at DESC, p.id DESC\nLIMIT ");
	builder.push_bind(limit);
	builder.push(" OFFSET ");
	builder.push_bind(offset);

	let rows = builder.build_query_as().fetch_all(&db.pool).await?;

	Ok(rows)
}

/// Atomic presence toggle for a like. The delete and conditional insert run
/// in one statement against one snapshot, so concurrent duplicate calls from
/// the same user cannot double-toggle. Returns whether the like exists after
/// the call.
pub async fn toggle_like(db: &Db, post_id: i64, user_id: i64) -> Result<bool> {
	let inserted: Option<i64> = sqlx::query_scalar(
		"\
WITH removed AS (
	DELETE FROM post_likes
	WHERE post_id = $1 AND user_id = $2
	RETURNING post_id
)
INSERT INTO post_likes (post_id, user_id)
SELECT $1, $2
WHERE NOT EXISTS (SELECT 1 FROM removed)
ON CONFLICT (post_id, user_id) DO NOTHING
RETURNING post_id",
	)
	.bind(post_id)
	.bind(user_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(inserted.is_some())
}

pub async fn insert_comment(
	db: &Db,
	post_id: i64,
	user_id: i64,
	content: &str,
) -> Result<CommentRow> {
	let comment = sqlx::query_as(
		"\
WITH inserted AS (
	INSERT INTO post_comments (post_id, user_id, content)
	VALUES ($1, $2, $3)
	RETURNING id, post_id, user_id, content, created_at
)
SELECT i.id, i.post_id, i.user_id, u.username, i.content, i.created_at
FROM inserted i
JOIN users u ON u.id = i.user_id",
	)
	.bind(post_id)
	.bind(user_id)
	.bind(content)
	.fetch_one(&db.pool)
	.await?;

	Ok(comment)
}

pub async fn comments_for_post(db: &Db, post_id: i64) -> Result<Vec<CommentRow>> {
	let comments = sqlx::query_as(
		"\
SELECT c.id, c.post_id, c.user_id, u.username, c.content, c.created_at
FROM post_comments c
JOIN users u ON u.id = c.user_id
WHERE c.post_id = $1
ORDER BY c.id",
	)
	.bind(post_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(comments)
}
