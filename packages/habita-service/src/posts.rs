use time::OffsetDateTime;

use habita_domain::{paging::Page, visibility, visibility::Visibility};
use habita_storage::{models::Post, queries};

use crate::{
	HabitaService, ServiceError, ServiceResult,
	feed::{PostItem, post_item},
	stored_visibility,
};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreatePostRequest {
	pub user_id: i64,
	pub habit_id: Option<i64>,
	pub content: String,
	pub visibility: Visibility,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PostOut {
	pub id: i64,
	pub author_id: i64,
	pub habit_id: Option<i64>,
	pub content: String,
	pub visibility: Visibility,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SinglePostRequest {
	pub post_id: i64,
	pub viewer_id: i64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProfilePostsRequest {
	pub author_id: i64,
	pub viewer_id: i64,
	pub page: u32,
	pub page_size: u32,
	/// When set, a non-owner viewer is rejected outright instead of being
	/// filtered down to an empty page.
	#[serde(default)]
	pub require_owner: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProfilePostsResponse {
	pub items: Vec<PostItem>,
	pub page: u32,
	pub page_size: u32,
	#[serde(rename = "self")]
	pub is_self: bool,
}

impl HabitaService {
	pub async fn create_post(&self, req: CreatePostRequest) -> ServiceResult<PostOut> {
		if req.content.trim().is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "content is required.".to_string(),
			});
		}

		self.ensure_user_exists(req.user_id).await?;

		if let Some(habit_id) = req.habit_id {
			match queries::habit_owner(&self.db, habit_id).await? {
				None =>
					return Err(ServiceError::NotFound {
						message: format!("Habit {habit_id} not found."),
					}),
				Some(owner_id) if owner_id != req.user_id =>
					return Err(ServiceError::Forbidden {
						message: "Habit belongs to another user.".to_string(),
					}),
				Some(_) => {},
			}
		}

		let post = queries::insert_post(
			&self.db,
			req.user_id,
			req.habit_id,
			req.content.trim(),
			req.visibility.as_str(),
		)
		.await?;
		let visibility = stored_visibility(&post.visibility)?;

		Ok(PostOut {
			id: post.id,
			author_id: post.user_id,
			habit_id: post.habit_id,
			content: post.content,
			visibility,
			created_at: post.created_at,
		})
	}

	pub async fn post(&self, req: SinglePostRequest) -> ServiceResult<PostOut> {
		let Some(post) = queries::fetch_post(&self.db, req.post_id).await? else {
			return Err(ServiceError::NotFound {
				message: format!("Post {} not found.", req.post_id),
			});
		};

		self.ensure_post_viewable(&post, req.viewer_id).await?;

		let visibility = stored_visibility(&post.visibility)?;

		Ok(PostOut {
			id: post.id,
			author_id: post.user_id,
			habit_id: post.habit_id,
			content: post.content,
			visibility,
			created_at: post.created_at,
		})
	}

	/// Posts authored by one target user, filtered strictly by the
	/// visibility policy against that owner. Unlike the feed, a stranger
	/// never sees `friends`-only rows here.
	pub async fn profile_posts(
		&self,
		req: ProfilePostsRequest,
	) -> ServiceResult<ProfilePostsResponse> {
		let Some(page) = Page::new(req.page, req.page_size) else {
			return Err(ServiceError::InvalidRequest {
				message: "page must be >= 1 and page_size within [1, 50].".to_string(),
			});
		};
		let is_self = req.author_id == req.viewer_id;

		// An authorization failure, not an empty page.
		if req.require_owner && !is_self {
			return Err(ServiceError::Forbidden {
				message: "Only the owner may view this listing.".to_string(),
			});
		}

		self.ensure_user_exists(req.author_id).await?;
		self.ensure_user_exists(req.viewer_id).await?;

		let only_public = if is_self {
			false
		} else if queries::are_friends(&self.db, req.viewer_id, req.author_id).await? {
			false
		} else {
			let owner_public = queries::fetch_profile(&self.db, req.author_id)
				.await?
				.map(|profile| profile.is_public)
				.unwrap_or(false);

			// Deliberately reveals that the profile exists but is private.
			if !owner_public {
				return Err(ServiceError::Forbidden {
					message: "This profile is private.".to_string(),
				});
			}

			true
		};
		let rows = queries::posts_by_author(
			&self.db,
			req.viewer_id,
			req.author_id,
			only_public,
			page.limit(),
			page.offset(),
		)
		.await?;
		let items = rows.into_iter().map(post_item).collect::<ServiceResult<Vec<_>>>()?;

		Ok(ProfilePostsResponse {
			items,
			page: page.page(),
			page_size: page.page_size(),
			is_self,
		})
	}

	/// Single-content visibility check shared by post fetch and engagement.
	pub(crate) async fn ensure_post_viewable(
		&self,
		post: &Post,
		viewer_id: i64,
	) -> ServiceResult<()> {
		if post.user_id == viewer_id {
			return Ok(());
		}

		let is_friend = queries::are_friends(&self.db, viewer_id, post.user_id).await?;
		let owner_public = queries::fetch_profile(&self.db, post.user_id)
			.await?
			.map(|profile| profile.is_public)
			.unwrap_or(false);
		let content = stored_visibility(&post.visibility)?;

		if !visibility::can_view(viewer_id, post.user_id, is_friend, owner_public, content) {
			return Err(ServiceError::Forbidden {
				message: "You may not view this post.".to_string(),
			});
		}

		Ok(())
	}
}
