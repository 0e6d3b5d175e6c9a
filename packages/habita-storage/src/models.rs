use time::{Date, OffsetDateTime};

#[derive(Debug, sqlx::FromRow)]
pub struct User {
	pub id: i64,
	pub email: String,
	pub username: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Profile {
	pub user_id: i64,
	pub first_name: String,
	pub last_name: String,
	pub gender: Option<String>,
	pub birth_date: Option<Date>,
	pub bio: Option<String>,
	pub is_public: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Habit {
	pub id: i64,
	pub user_id: i64,
	pub name: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Post {
	pub id: i64,
	pub user_id: i64,
	pub habit_id: Option<i64>,
	pub content: String,
	pub visibility: String,
	pub created_at: OffsetDateTime,
}

/// One feed or profile-listing row with its engagement counts, as produced by
/// the paginated listing queries.
#[derive(Debug, sqlx::FromRow)]
pub struct PostListing {
	pub id: i64,
	pub author_id: i64,
	pub username: String,
	pub content: String,
	pub habit_id: Option<i64>,
	pub visibility: String,
	pub created_at: OffsetDateTime,
	pub likes: i64,
	pub comments: i64,
	pub liked_by_me: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub struct CommentRow {
	pub id: i64,
	pub post_id: i64,
	pub user_id: i64,
	pub username: String,
	pub content: String,
	pub created_at: OffsetDateTime,
}

/// Display record a recommendation ID list resolves to.
#[derive(Debug, sqlx::FromRow)]
pub struct UserCard {
	pub id: i64,
	pub username: String,
	pub bio: Option<String>,
}
