use time::OffsetDateTime;

use habita_domain::{paging::Page, visibility::Visibility};
use habita_storage::{models::PostListing, queries};

use crate::{HabitaService, ServiceError, ServiceResult, stored_visibility};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FeedRequest {
	pub user_id: i64,
	pub page: u32,
	pub page_size: u32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PostItem {
	pub id: i64,
	pub author_id: i64,
	pub username: String,
	pub content: String,
	pub habit_id: Option<i64>,
	pub visibility: Visibility,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	pub likes: i64,
	pub comments: i64,
	pub liked_by_me: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FeedResponse {
	pub items: Vec<PostItem>,
	pub page: u32,
	pub page_size: u32,
}

impl HabitaService {
	/// Aggregate feed for one viewer: own posts, everything friends posted
	/// regardless of each post's visibility flag, and public posts on public
	/// profiles. This union is intentionally broader than the single-profile
	/// listing; the discovery feed and the profile view are different
	/// surfaces.
	pub async fn feed(&self, req: FeedRequest) -> ServiceResult<FeedResponse> {
		let Some(page) = Page::new(req.page, req.page_size) else {
			return Err(ServiceError::InvalidRequest {
				message: "page must be >= 1 and page_size within [1, 50].".to_string(),
			});
		};

		self.ensure_user_exists(req.user_id).await?;

		let rows = queries::feed_page(&self.db, req.user_id, page.limit(), page.offset()).await?;
		let items = rows.into_iter().map(post_item).collect::<ServiceResult<Vec<_>>>()?;

		Ok(FeedResponse { items, page: page.page(), page_size: page.page_size() })
	}
}

pub(crate) fn post_item(row: PostListing) -> ServiceResult<PostItem> {
	let visibility = stored_visibility(&row.visibility)?;

	Ok(PostItem {
		id: row.id,
		author_id: row.author_id,
		username: row.username,
		content: row.content,
		habit_id: row.habit_id,
		visibility,
		created_at: row.created_at,
		likes: row.likes,
		comments: row.comments,
		liked_by_me: row.liked_by_me,
	})
}
