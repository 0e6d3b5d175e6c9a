use habita_storage::queries;

use crate::{HabitaService, ServiceError, ServiceResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AddFriendRequest {
	pub user_id: i64,
	pub friend_id: i64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RemoveFriendRequest {
	pub user_id: i64,
	pub friend_id: i64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RemoveFriendResponse {
	pub removed: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FriendOut {
	pub id: i64,
	pub username: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FriendsResponse {
	pub friends: Vec<FriendOut>,
}

impl HabitaService {
	/// Friendship is undirected: both directed edges are written together so
	/// no read path ever observes a one-directional friendship.
	pub async fn add_friend(&self, req: AddFriendRequest) -> ServiceResult<()> {
		if req.user_id == req.friend_id {
			return Err(ServiceError::InvalidRequest {
				message: "Cannot befriend yourself.".to_string(),
			});
		}

		self.ensure_user_exists(req.user_id).await?;
		self.ensure_user_exists(req.friend_id).await?;

		queries::insert_friendship(&self.db, req.user_id, req.friend_id).await?;

		Ok(())
	}

	pub async fn remove_friend(
		&self,
		req: RemoveFriendRequest,
	) -> ServiceResult<RemoveFriendResponse> {
		self.ensure_user_exists(req.user_id).await?;

		let removed = queries::delete_friendship(&self.db, req.user_id, req.friend_id).await?;

		Ok(RemoveFriendResponse { removed: removed > 0 })
	}

	pub async fn friends(&self, user_id: i64) -> ServiceResult<FriendsResponse> {
		self.ensure_user_exists(user_id).await?;

		let friends = queries::friends_with_usernames(&self.db, user_id)
			.await?
			.into_iter()
			.map(|(id, username)| FriendOut { id, username })
			.collect();

		Ok(FriendsResponse { friends })
	}
}
