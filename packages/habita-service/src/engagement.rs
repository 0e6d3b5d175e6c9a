use time::OffsetDateTime;

use habita_storage::queries;

use crate::{HabitaService, ServiceError, ServiceResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToggleLikeRequest {
	pub post_id: i64,
	pub user_id: i64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToggleLikeResponse {
	pub liked: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AddCommentRequest {
	pub post_id: i64,
	pub user_id: i64,
	pub content: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CommentOut {
	pub id: i64,
	pub post_id: i64,
	pub user_id: i64,
	pub username: String,
	pub content: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CommentsResponse {
	pub items: Vec<CommentOut>,
}

impl HabitaService {
	/// Flips like presence in a single atomic statement; concurrent
	/// duplicate requests from one user cannot double-toggle.
	pub async fn toggle_like(&self, req: ToggleLikeRequest) -> ServiceResult<ToggleLikeResponse> {
		let post = self.fetch_viewable_post(req.post_id, req.user_id).await?;
		let liked = queries::toggle_like(&self.db, post.id, req.user_id).await?;

		Ok(ToggleLikeResponse { liked })
	}

	pub async fn add_comment(&self, req: AddCommentRequest) -> ServiceResult<CommentOut> {
		if req.content.trim().is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "content is required.".to_string(),
			});
		}

		let post = self.fetch_viewable_post(req.post_id, req.user_id).await?;
		let comment =
			queries::insert_comment(&self.db, post.id, req.user_id, req.content.trim()).await?;

		Ok(comment_out(comment))
	}

	pub async fn comments(&self, post_id: i64, viewer_id: i64) -> ServiceResult<CommentsResponse> {
		self.fetch_viewable_post(post_id, viewer_id).await?;

		let items = queries::comments_for_post(&self.db, post_id)
			.await?
			.into_iter()
			.map(comment_out)
			.collect();

		Ok(CommentsResponse { items })
	}

	async fn fetch_viewable_post(
		&self,
		post_id: i64,
		viewer_id: i64,
	) -> ServiceResult<habita_storage::models::Post> {
		let Some(post) = queries::fetch_post(&self.db, post_id).await? else {
			return Err(ServiceError::NotFound { message: format!("Post {post_id} not found.") });
		};

		self.ensure_post_viewable(&post, viewer_id).await?;

		Ok(post)
	}
}

fn comment_out(comment: habita_storage::models::CommentRow) -> CommentOut {
	CommentOut {
		id: comment.id,
		post_id: comment.post_id,
		user_id: comment.user_id,
		username: comment.username,
		content: comment.content,
		created_at: comment.created_at,
	}
}
