pub mod accounts;
pub mod engagement;
pub mod feed;
pub mod friends;
pub mod habits;
pub mod posts;
pub mod recommend;
pub mod stats;
pub mod time_serde;

use std::sync::Arc;

use rand::seq::SliceRandom;
use time::{Date, OffsetDateTime};

pub use accounts::{
	LoginRequest, LoginResponse, ProfileOut, ProfileResponse, SignupRequest, SignupResponse,
	UpdateProfileRequest, UserOut,
};
pub use engagement::{
	AddCommentRequest, CommentOut, CommentsResponse, ToggleLikeRequest, ToggleLikeResponse,
};
pub use feed::{FeedRequest, FeedResponse, PostItem};
pub use friends::{
	AddFriendRequest, FriendOut, FriendsResponse, RemoveFriendRequest, RemoveFriendResponse,
};
pub use habits::{
	CreateHabitRequest, CreateHabitResponse, DeleteHabitRequest, HabitOut, HabitsResponse,
	MarkTodayRequest,
};
use habita_config::Config;
use habita_storage::{db::Db, queries};
pub use posts::{
	CreatePostRequest, PostOut, ProfilePostsRequest, ProfilePostsResponse, SinglePostRequest,
};
pub use recommend::{RecommendMix, RecommendRequest, RecommendResponse, RecommendedUser};
pub use stats::{HabitStat, WeeklyStatsResponse};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
	/// Malformed or out-of-range parameters. Raised before any query runs.
	InvalidRequest { message: String },
	/// Credential check failed.
	Unauthorized { message: String },
	/// The viewer exists but may not see the requested view. Kept distinct
	/// from NotFound on purpose: where policy reveals existence-but-private,
	/// this is the variant callers see.
	Forbidden { message: String },
	NotFound { message: String },
	Storage { message: String },
}
impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Unauthorized { message } => write!(f, "Unauthorized: {message}"),
			Self::Forbidden { message } => write!(f, "Forbidden: {message}"),
			Self::NotFound { message } => write!(f, "Not found: {message}"),
			Self::Storage { message } => write!(f, "Storage error: {message}"),
		}
	}
}
impl std::error::Error for ServiceError {}
impl From<sqlx::Error> for ServiceError {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
impl From<habita_storage::Error> for ServiceError {
	fn from(err: habita_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

/// Randomness seam for the recommendation fill pool. Tests substitute a
/// deterministic implementation to pin down fill membership.
pub trait ShuffleProvider
where
	Self: Send + Sync,
{
	fn shuffle(&self, ids: &mut [i64]);
}

struct ThreadRngShuffle;
impl ShuffleProvider for ThreadRngShuffle {
	fn shuffle(&self, ids: &mut [i64]) {
		ids.shuffle(&mut rand::thread_rng());
	}
}

pub struct HabitaService {
	pub cfg: Config,
	pub db: Db,
	pub shuffle: Arc<dyn ShuffleProvider>,
}
impl HabitaService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, shuffle: Arc::new(ThreadRngShuffle) }
	}

	pub fn with_shuffle(cfg: Config, db: Db, shuffle: Arc<dyn ShuffleProvider>) -> Self {
		Self { cfg, db, shuffle }
	}

	pub(crate) fn today(&self) -> Date {
		OffsetDateTime::now_utc().date()
	}

	pub(crate) async fn ensure_user_exists(&self, user_id: i64) -> ServiceResult<()> {
		if !queries::user_exists(&self.db, user_id).await? {
			return Err(ServiceError::NotFound { message: format!("User {user_id} not found.") });
		}

		Ok(())
	}
}

/// Stored visibility values always come from the `Visibility` enum; a
/// mismatch means the row was written outside this service.
pub(crate) fn stored_visibility(
	value: &str,
) -> ServiceResult<habita_domain::visibility::Visibility> {
	value.parse().map_err(|_| ServiceError::Storage {
		message: format!("Unknown stored visibility value: {value}."),
	})
}
