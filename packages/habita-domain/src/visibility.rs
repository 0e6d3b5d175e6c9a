use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Per-post audience flag. Stored as lowercase text.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
	Public,
	Friends,
}
impl Visibility {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Public => "public",
			Self::Friends => "friends",
		}
	}
}
impl FromStr for Visibility {
	type Err = UnknownVisibility;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"public" => Ok(Self::Public),
			"friends" => Ok(Self::Friends),
			_ => Err(UnknownVisibility { value: s.to_string() }),
		}
	}
}

#[derive(Debug)]
pub struct UnknownVisibility {
	pub value: String,
}
impl std::fmt::Display for UnknownVisibility {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Unknown visibility value: {}.", self.value)
	}
}
impl std::error::Error for UnknownVisibility {}

/// Whether `viewer_id` may see a single piece of content authored by `owner_id`.
///
/// Rules are evaluated in order: self, friend, then public-profile plus
/// public-post. An owner without a profile row is passed in as
/// `owner_profile_public = false`; absence of a profile is not an error here.
pub fn can_view(
	viewer_id: i64,
	owner_id: i64,
	viewer_is_friend: bool,
	owner_profile_public: bool,
	content: Visibility,
) -> bool {
	if viewer_id == owner_id {
		return true;
	}
	if viewer_is_friend {
		return true;
	}

	owner_profile_public && content == Visibility::Public
}
