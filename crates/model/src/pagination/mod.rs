pub mod page;
pub mod page_size;
pub mod paging_state;
