//! Plain types shared between the sonixd core library and its front ends.

mod library_item;
mod server_type;
mod sort_order;

pub use library_item::{CardDisplayType, LibraryItem};
pub use server_type::ServerType;
pub use sort_order::SortOrder;
