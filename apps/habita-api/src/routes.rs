use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use habita_service::{
	AddCommentRequest, AddFriendRequest, CommentsResponse, CreateHabitRequest, CreateHabitResponse,
	CreatePostRequest, DeleteHabitRequest, FeedRequest, FeedResponse, HabitsResponse, LoginRequest,
	LoginResponse, MarkTodayRequest, PostOut, ProfilePostsRequest, ProfilePostsResponse,
	ProfileResponse, RecommendRequest, RecommendResponse, RemoveFriendRequest,
	RemoveFriendResponse, ServiceError, SignupRequest, SignupResponse, SinglePostRequest,
	ToggleLikeRequest, ToggleLikeResponse, UpdateProfileRequest, WeeklyStatsResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/auth/signup", post(signup))
		.route("/v1/auth/login", post(login))
		.route("/v1/profile", get(profile).put(update_profile))
		.route("/v1/habits", get(habits).post(create_habit))
		.route("/v1/habits/{id}", delete(delete_habit))
		.route("/v1/logs/mark_today", post(mark_today))
		.route("/v1/stats/weekly", get(weekly_stats))
		.route("/v1/friends", get(friends).post(add_friend).delete(remove_friend))
		.route("/v1/posts", post(create_post))
		.route("/v1/posts/{id}", get(single_post))
		.route("/v1/posts/{id}/like", post(toggle_like))
		.route("/v1/posts/{id}/comments", get(comments).post(add_comment))
		.route("/v1/users/{id}/posts", get(profile_posts))
		.route("/v1/feed", get(feed))
		.route("/v1/recommendations", get(recommendations))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct UserQuery {
	user_id: i64,
}

#[derive(Debug, Deserialize)]
struct ViewerQuery {
	viewer_id: i64,
}

fn default_page() -> u32 {
	1
}

fn default_page_size() -> u32 {
	20
}

#[derive(Debug, Deserialize)]
struct PageQuery {
	user_id: i64,
	#[serde(default = "default_page")]
	page: u32,
	#[serde(default = "default_page_size")]
	page_size: u32,
}

#[derive(Debug, Deserialize)]
struct ProfilePostsQuery {
	viewer_id: i64,
	#[serde(default = "default_page")]
	page: u32,
	#[serde(default = "default_page_size")]
	page_size: u32,
	#[serde(default)]
	require_owner: bool,
}

#[derive(Debug, Deserialize)]
struct RecommendQuery {
	user_id: i64,
	limit: Option<u32>,
	window: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ActorBody {
	user_id: i64,
}

#[derive(Debug, Deserialize)]
struct CommentBody {
	user_id: i64,
	content: String,
}

async fn signup(
	State(state): State<AppState>,
	Json(payload): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
	let response = state.service.signup(payload).await?;

	Ok(Json(response))
}

async fn login(
	State(state): State<AppState>,
	Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
	let response = state.service.login(payload).await?;

	Ok(Json(response))
}

async fn profile(
	State(state): State<AppState>,
	Query(query): Query<UserQuery>,
) -> Result<Json<ProfileResponse>, ApiError> {
	let response = state.service.profile(query.user_id).await?;

	Ok(Json(response))
}

async fn update_profile(
	State(state): State<AppState>,
	Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
	let response = state.service.update_profile(payload).await?;

	Ok(Json(response))
}

async fn habits(
	State(state): State<AppState>,
	Query(query): Query<UserQuery>,
) -> Result<Json<HabitsResponse>, ApiError> {
	let response = state.service.habits(query.user_id).await?;

	Ok(Json(response))
}

async fn create_habit(
	State(state): State<AppState>,
	Json(payload): Json<CreateHabitRequest>,
) -> Result<Json<CreateHabitResponse>, ApiError> {
	let response = state.service.create_habit(payload).await?;

	Ok(Json(response))
}

async fn delete_habit(
	State(state): State<AppState>,
	Path(habit_id): Path<i64>,
	Query(query): Query<UserQuery>,
) -> Result<StatusCode, ApiError> {
	state.service.delete_habit(DeleteHabitRequest { habit_id, user_id: query.user_id }).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn mark_today(
	State(state): State<AppState>,
	Json(payload): Json<MarkTodayRequest>,
) -> Result<StatusCode, ApiError> {
	state.service.mark_today(payload).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn weekly_stats(
	State(state): State<AppState>,
	Query(query): Query<UserQuery>,
) -> Result<Json<WeeklyStatsResponse>, ApiError> {
	let response = state.service.weekly_stats(query.user_id).await?;

	Ok(Json(response))
}

async fn friends(
	State(state): State<AppState>,
	Query(query): Query<UserQuery>,
) -> Result<Json<habita_service::FriendsResponse>, ApiError> {
	let response = state.service.friends(query.user_id).await?;

	Ok(Json(response))
}

async fn add_friend(
	State(state): State<AppState>,
	Json(payload): Json<AddFriendRequest>,
) -> Result<StatusCode, ApiError> {
	state.service.add_friend(payload).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn remove_friend(
	State(state): State<AppState>,
	Json(payload): Json<RemoveFriendRequest>,
) -> Result<Json<RemoveFriendResponse>, ApiError> {
	let response = state.service.remove_friend(payload).await?;

	Ok(Json(response))
}

async fn create_post(
	State(state): State<AppState>,
	Json(payload): Json<CreatePostRequest>,
) -> Result<Json<PostOut>, ApiError> {
	let response = state.service.create_post(payload).await?;

	Ok(Json(response))
}

async fn single_post(
	State(state): State<AppState>,
	Path(post_id): Path<i64>,
	Query(query): Query<ViewerQuery>,
) -> Result<Json<PostOut>, ApiError> {
	let response =
		state.service.post(SinglePostRequest { post_id, viewer_id: query.viewer_id }).await?;

	Ok(Json(response))
}

async fn toggle_like(
	State(state): State<AppState>,
	Path(post_id): Path<i64>,
	Json(payload): Json<ActorBody>,
) -> Result<Json<ToggleLikeResponse>, ApiError> {
	let response =
		state.service.toggle_like(ToggleLikeRequest { post_id, user_id: payload.user_id }).await?;

	Ok(Json(response))
}

async fn comments(
	State(state): State<AppState>,
	Path(post_id): Path<i64>,
	Query(query): Query<ViewerQuery>,
) -> Result<Json<CommentsResponse>, ApiError> {
	let response = state.service.comments(post_id, query.viewer_id).await?;

	Ok(Json(response))
}

async fn add_comment(
	State(state): State<AppState>,
	Path(post_id): Path<i64>,
	Json(payload): Json<CommentBody>,
) -> Result<Json<habita_service::CommentOut>, ApiError> {
	let response = state
		.service
		.add_comment(AddCommentRequest {
			post_id,
			user_id: payload.user_id,
			content: payload.content,
		})
		.await?;

	Ok(Json(response))
}

async fn profile_posts(
	State(state): State<AppState>,
	Path(author_id): Path<i64>,
	Query(query): Query<ProfilePostsQuery>,
) -> Result<Json<ProfilePostsResponse>, ApiError> {
	let response = state
		.service
		.profile_posts(ProfilePostsRequest {
			author_id,
			viewer_id: query.viewer_id,
			page: query.page,
			page_size: query.page_size,
			require_owner: query.require_owner,
		})
		.await?;

	Ok(Json(response))
}

async fn feed(
	State(state): State<AppState>,
	Query(query): Query<PageQuery>,
) -> Result<Json<FeedResponse>, ApiError> {
	let response = state
		.service
		.feed(FeedRequest { user_id: query.user_id, page: query.page, page_size: query.page_size })
		.await?;

	Ok(Json(response))
}

async fn recommendations(
	State(state): State<AppState>,
	Query(query): Query<RecommendQuery>,
) -> Result<Json<RecommendResponse>, ApiError> {
	let response = state
		.service
		.recommend(RecommendRequest {
			user_id: query.user_id,
			limit: query.limit,
			window: query.window,
		})
		.await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, error_code) = match &err {
			ServiceError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
			ServiceError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "unauthorized"),
			ServiceError::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
			ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
			ServiceError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
		};

		if matches!(err, ServiceError::Storage { .. }) {
			tracing::error!(error = %err, "Storage failure while serving a request.");
		}

		Self { status, error_code: error_code.to_string(), message: err.to_string() }
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
