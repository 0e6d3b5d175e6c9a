use std::sync::Arc;

use habita_config::{Config, Postgres, Recommend, Security, Service, Storage};
use habita_service::{
	AddFriendRequest, CreateHabitRequest, CreatePostRequest, FeedRequest, HabitaService,
	MarkTodayRequest, ProfilePostsRequest, RecommendRequest, ServiceError, ShuffleProvider,
	SignupRequest,
};
use habita_storage::db::Db;
use habita_domain::visibility::Visibility;
use habita_testkit::TestDatabase;

/// Keeps the fill pool in its stable ID order so fill membership is exact.
struct IdentityShuffle;
impl ShuffleProvider for IdentityShuffle {
	fn shuffle(&self, _ids: &mut [i64]) {}
}

fn test_config(dsn: String) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage { postgres: Postgres { dsn, pool_max_conns: 2 } },
		security: Security { bind_localhost_only: true },
		recommend: Recommend { default_limit: 20, default_window: 7 },
	}
}

async fn test_service(test_db: &TestDatabase) -> HabitaService {
	let cfg = test_config(test_db.dsn().to_string());
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	HabitaService::with_shuffle(cfg, db, Arc::new(IdentityShuffle))
}

fn signup(username: &str, is_public: bool) -> SignupRequest {
	SignupRequest {
		email: format!("{username}@example.com"),
		username: username.to_string(),
		password: "pw".to_string(),
		first_name: username.to_string(),
		last_name: "tester".to_string(),
		gender: None,
		birth_date: None,
		is_public: Some(is_public),
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HABITA_PG_DSN to run."]
async fn recommendations_exclude_self_and_friends_and_never_duplicate() {
	let Some(base_dsn) = habita_testkit::env_dsn() else {
		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;

	// viewer -- friend -- {candidate_a, candidate_b}; candidate_c shares a
	// habit name with viewer.
	let viewer = service.signup(signup("viewer", true)).await.expect("signup").user.id;
	let friend = service.signup(signup("friend", true)).await.expect("signup").user.id;
	let candidate_a = service.signup(signup("anna", true)).await.expect("signup").user.id;
	let candidate_b = service.signup(signup("bruno", true)).await.expect("signup").user.id;
	let candidate_c = service.signup(signup("carla", true)).await.expect("signup").user.id;

	service
		.add_friend(AddFriendRequest { user_id: viewer, friend_id: friend })
		.await
		.expect("add_friend");
	service
		.add_friend(AddFriendRequest { user_id: friend, friend_id: candidate_a })
		.await
		.expect("add_friend");
	service
		.add_friend(AddFriendRequest { user_id: friend, friend_id: candidate_b })
		.await
		.expect("add_friend");
	service
		.create_habit(CreateHabitRequest { user_id: viewer, name: "run".to_string() })
		.await
		.expect("create_habit");
	service
		.create_habit(CreateHabitRequest { user_id: candidate_c, name: "run".to_string() })
		.await
		.expect("create_habit");

	let response = service
		.recommend(RecommendRequest { user_id: viewer, limit: Some(10), window: None })
		.await
		.expect("recommend");

	assert_eq!(response.window, 7);
	assert_eq!(response.mix.foaf, 3);
	assert_eq!(response.mix.similar, 3);
	assert_eq!(response.mix.trending, 2);
	assert_eq!(response.mix.fill, 2);

	let ids: Vec<i64> = response.items.iter().map(|item| item.id).collect();

	assert!(!ids.contains(&viewer));
	assert!(!ids.contains(&friend));

	let unique: std::collections::HashSet<_> = ids.iter().collect();

	assert_eq!(unique.len(), ids.len());
	// FOAF candidates come first: anna and bruno tie on one mutual path each,
	// so the lower ID wins.
	assert_eq!(ids[0], candidate_a);
	assert_eq!(ids[1], candidate_b);
	assert!(ids.contains(&candidate_c));

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HABITA_PG_DSN to run."]
async fn invalid_limit_is_rejected_before_any_query() {
	let Some(base_dsn) = habita_testkit::env_dsn() else {
		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;
	let result = service
		.recommend(RecommendRequest { user_id: 1, limit: Some(0), window: None })
		.await;

	assert!(matches!(result, Err(ServiceError::InvalidRequest { .. })));

	let result = service
		.recommend(RecommendRequest { user_id: 1, limit: Some(101), window: None })
		.await;

	assert!(matches!(result, Err(ServiceError::InvalidRequest { .. })));

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HABITA_PG_DSN to run."]
async fn feed_is_broader_than_profile_listing() {
	let Some(base_dsn) = habita_testkit::env_dsn() else {
		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;
	let viewer = service.signup(signup("viewer", true)).await.expect("signup").user.id;
	let friend = service.signup(signup("friend", true)).await.expect("signup").user.id;
	let stranger = service.signup(signup("stranger", true)).await.expect("signup").user.id;

	service
		.add_friend(AddFriendRequest { user_id: viewer, friend_id: friend })
		.await
		.expect("add_friend");

	let friends_only = service
		.create_post(CreatePostRequest {
			user_id: friend,
			habit_id: None,
			content: "friends only".to_string(),
			visibility: Visibility::Friends,
		})
		.await
		.expect("create_post");
	let public_post = service
		.create_post(CreatePostRequest {
			user_id: stranger,
			habit_id: None,
			content: "hello world".to_string(),
			visibility: Visibility::Public,
		})
		.await
		.expect("create_post");

	// The aggregate feed unions in the friend's friends-only post and the
	// stranger's public post.
	let feed = service
		.feed(FeedRequest { user_id: viewer, page: 1, page_size: 50 })
		.await
		.expect("feed");
	let feed_ids: Vec<i64> = feed.items.iter().map(|item| item.id).collect();

	assert!(feed_ids.contains(&friends_only.id));
	assert!(feed_ids.contains(&public_post.id));

	// The profile view of the same friend is stricter for a stranger: the
	// friends-only post stays hidden.
	let listing = service
		.profile_posts(ProfilePostsRequest {
			author_id: friend,
			viewer_id: stranger,
			page: 1,
			page_size: 50,
			require_owner: false,
		})
		.await
		.expect("profile_posts");

	assert!(listing.items.is_empty());

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HABITA_PG_DSN to run."]
async fn require_owner_violation_is_an_authorization_error() {
	let Some(base_dsn) = habita_testkit::env_dsn() else {
		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;
	let owner = service.signup(signup("owner", true)).await.expect("signup").user.id;
	let other = service.signup(signup("other", true)).await.expect("signup").user.id;
	let result = service
		.profile_posts(ProfilePostsRequest {
			author_id: owner,
			viewer_id: other,
			page: 1,
			page_size: 10,
			require_owner: true,
		})
		.await;

	assert!(matches!(result, Err(ServiceError::Forbidden { .. })));

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HABITA_PG_DSN to run."]
async fn weekly_stats_report_seven_day_window() {
	let Some(base_dsn) = habita_testkit::env_dsn() else {
		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;
	let user = service.signup(signup("runner", true)).await.expect("signup").user.id;
	let habit = service
		.create_habit(CreateHabitRequest { user_id: user, name: "run".to_string() })
		.await
		.expect("create_habit")
		.id;

	service
		.mark_today(MarkTodayRequest { user_id: user, habit_id: habit, value: 1 })
		.await
		.expect("mark_today");

	let stats = service.weekly_stats(user).await.expect("weekly_stats");

	assert_eq!(stats.items.len(), 1);

	let item = &stats.items[0];

	assert_eq!(item.habit_id, habit);
	assert_eq!(item.total_days, 7);
	assert_eq!(item.done, 1);
	assert!(item.today_done);

	// Unmarking today takes the rollup back to zero; the upsert overwrote the
	// earlier value.
	service
		.mark_today(MarkTodayRequest { user_id: user, habit_id: habit, value: 0 })
		.await
		.expect("mark_today");

	let stats = service.weekly_stats(user).await.expect("weekly_stats");

	assert_eq!(stats.items[0].done, 0);
	assert!(!stats.items[0].today_done);

	test_db.cleanup().await.expect("Failed to clean up test database.");
}
