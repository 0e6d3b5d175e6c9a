pub const MAX_PAGE_SIZE: u32 = 50;

/// Validated pagination parameters: `page >= 1`, `page_size` in
/// `[1, MAX_PAGE_SIZE]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Page {
	page: u32,
	page_size: u32,
}
impl Page {
	pub fn new(page: u32, page_size: u32) -> Option<Self> {
		if page < 1 || page_size < 1 || page_size > MAX_PAGE_SIZE {
			return None;
		}

		Some(Self { page, page_size })
	}

	pub fn page(&self) -> u32 {
		self.page
	}

	pub fn page_size(&self) -> u32 {
		self.page_size
	}

	pub fn offset(&self) -> i64 {
		i64::from(self.page - 1) * i64::from(self.page_size)
	}

	pub fn limit(&self) -> i64 {
		i64::from(self.page_size)
	}
}
