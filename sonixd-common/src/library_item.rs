use serde::{Deserialize, Serialize};

/// Entity kind shown by a list view or a search tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LibraryItem {
    Album,
    AlbumArtist,
    Song,
}

impl LibraryItem {
    /// Path segment used in routes (`/search/:itemType`)
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryItem::Album => "album",
            LibraryItem::AlbumArtist => "albumArtist",
            LibraryItem::Song => "song",
        }
    }
}

/// How a list page lays out its items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardDisplayType {
    Card,
    Poster,
    Table,
}

#[allow(clippy::derivable_impls)]
impl Default for CardDisplayType {
    fn default() -> Self {
        CardDisplayType::Poster
    }
}
