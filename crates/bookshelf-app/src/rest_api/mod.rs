pub mod book;
pub mod paging;

pub use paging::Paging;
