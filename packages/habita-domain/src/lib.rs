pub mod paging;
pub mod recommend;
pub mod rollup;
pub mod visibility;
