pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_users.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_users.sql")),
				"tables/002_profiles.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_profiles.sql")),
				"tables/003_friendships.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_friendships.sql")),
				"tables/004_habits.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_habits.sql")),
				"tables/005_habit_logs.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_habit_logs.sql")),
				"tables/006_posts.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_posts.sql")),
				"tables/007_post_likes.sql" =>
					out.push_str(include_str!("../../../sql/tables/007_post_likes.sql")),
				"tables/008_post_comments.sql" =>
					out.push_str(include_str!("../../../sql/tables/008_post_comments.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
