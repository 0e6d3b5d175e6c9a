use habita_config::Postgres;
use habita_storage::{db::Db, queries};
use habita_testkit::TestDatabase;

#[tokio::test]
#[ignore = "Requires external Postgres. Set HABITA_PG_DSN to run."]
async fn db_connects_and_bootstraps() {
	let Some(base_dsn) = habita_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps; set HABITA_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");
	// Bootstrapping twice must be a no-op, not an error.
	db.ensure_schema().await.expect("Failed to re-run schema bootstrap.");

	for table in ["users", "profiles", "friendships", "habits", "habit_logs", "posts"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "{table}");
	}

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HABITA_PG_DSN to run."]
async fn friendship_edges_stay_symmetric() {
	let Some(base_dsn) = habita_testkit::env_dsn() else {
		eprintln!("Skipping friendship_edges_stay_symmetric; set HABITA_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let mut tx = db.pool.begin().await.expect("Failed to begin transaction.");
	let ana = queries::insert_user_tx(&mut tx, "ana@example.com", "ana", "pw")
		.await
		.expect("Failed to insert user.");
	let bob = queries::insert_user_tx(&mut tx, "bob@example.com", "bob", "pw")
		.await
		.expect("Failed to insert user.");

	tx.commit().await.expect("Failed to commit.");

	queries::insert_friendship(&db, ana, bob).await.expect("Failed to insert friendship.");

	assert!(queries::are_friends(&db, ana, bob).await.expect("Failed to query friendship."));
	assert!(queries::are_friends(&db, bob, ana).await.expect("Failed to query friendship."));

	queries::delete_friendship(&db, bob, ana).await.expect("Failed to delete friendship.");

	assert!(!queries::are_friends(&db, ana, bob).await.expect("Failed to query friendship."));
	assert!(!queries::are_friends(&db, bob, ana).await.expect("Failed to query friendship."));

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HABITA_PG_DSN to run."]
async fn like_toggle_flips_presence() {
	let Some(base_dsn) = habita_testkit::env_dsn() else {
		eprintln!("Skipping like_toggle_flips_presence; set HABITA_PG_DSN to run this test.");

		return;
	};
	let toggles = habita_testkit::with_test_db(&base_dsn, |test_db| {
		let dsn = test_db.dsn().to_string();

		async move {
			let cfg = Postgres { dsn, pool_max_conns: 1 };
			let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

			db.ensure_schema().await.expect("Failed to ensure schema.");

			let mut tx = db.pool.begin().await?;
			let ana = queries::insert_user_tx(&mut tx, "ana@example.com", "ana", "pw")
				.await
				.expect("Failed to insert user.");

			tx.commit().await?;

			let post = queries::insert_post(&db, ana, None, "first post", "public")
				.await
				.expect("Failed to insert post.");
			let first = queries::toggle_like(&db, post.id, ana).await.expect("Failed to toggle like.");
			let second =
				queries::toggle_like(&db, post.id, ana).await.expect("Failed to toggle like.");
			let third = queries::toggle_like(&db, post.id, ana).await.expect("Failed to toggle like.");

			Ok((first, second, third))
		}
	})
	.await
	.expect("Failed to run against the test database.");

	assert_eq!(toggles, (true, false, true));
}
