// Pagination of collection endpoints: query parsing, page envelopes and headers

pub mod page;
pub mod params;
pub mod response;

pub use page::{Page, PageLinks};
pub use params::{PageParams, PageRequest, Pagination};
pub use response::PagedResponse;
