pub mod error;
pub mod filter_where;
pub mod listing;
pub mod pagination;
pub mod types;

pub use filter_where::FilterWhere;
pub use listing::{
    AdminVideoFilter, CreatorContentFilter, PlaylistFilter, SeriesFilter, SongFilter, UserSearch, VideoFilter,
};
pub use pagination::Pagination;
pub use types::*;
