//! Comment listing
//!
//! Response model and the paginated source that walks one listing.

pub mod model;
pub mod source;

pub use model::{CommentPage, Member, Reply, UpAction};
pub use source::{PageCursor, PaginatedCommentSource};
