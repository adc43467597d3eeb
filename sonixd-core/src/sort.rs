//! Album sort catalogs for each server type.
//!
//! Every server type carries its own fixed, ordered catalog of sorts the
//! album list header offers. Picking an entry also picks its default order.

use serde::{Deserialize, Serialize};
use sonixd_common::{ServerType, SortOrder};

/// Field an album list can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlbumListSort {
    AlbumArtist,
    Artist,
    CommunityRating,
    CriticRating,
    Duration,
    Favorited,
    Name,
    PlayCount,
    Random,
    Rating,
    RecentlyAdded,
    RecentlyPlayed,
    ReleaseDate,
    SongCount,
    Year,
}

impl AlbumListSort {
    pub const ALL: [AlbumListSort; 15] = [
        AlbumListSort::AlbumArtist,
        AlbumListSort::Artist,
        AlbumListSort::CommunityRating,
        AlbumListSort::CriticRating,
        AlbumListSort::Duration,
        AlbumListSort::Favorited,
        AlbumListSort::Name,
        AlbumListSort::PlayCount,
        AlbumListSort::Random,
        AlbumListSort::Rating,
        AlbumListSort::RecentlyAdded,
        AlbumListSort::RecentlyPlayed,
        AlbumListSort::ReleaseDate,
        AlbumListSort::SongCount,
        AlbumListSort::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlbumListSort::AlbumArtist => "albumArtist",
            AlbumListSort::Artist => "artist",
            AlbumListSort::CommunityRating => "communityRating",
            AlbumListSort::CriticRating => "criticRating",
            AlbumListSort::Duration => "duration",
            AlbumListSort::Favorited => "favorited",
            AlbumListSort::Name => "name",
            AlbumListSort::PlayCount => "playCount",
            AlbumListSort::Random => "random",
            AlbumListSort::Rating => "rating",
            AlbumListSort::RecentlyAdded => "recentlyAdded",
            AlbumListSort::RecentlyPlayed => "recentlyPlayed",
            AlbumListSort::ReleaseDate => "releaseDate",
            AlbumListSort::SongCount => "songCount",
            AlbumListSort::Year => "year",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

/// One entry of a sort dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDescriptor {
    /// Display label
    pub name: &'static str,
    pub value: AlbumListSort,
    /// Order applied when this sort is picked
    pub default_order: SortOrder,
}

const fn entry(name: &'static str, value: AlbumListSort, default_order: SortOrder) -> SortDescriptor {
    SortDescriptor {
        name,
        value,
        default_order,
    }
}

const JELLYFIN_SORTS: &[SortDescriptor] = &[
    entry("Album Artist", AlbumListSort::AlbumArtist, SortOrder::Asc),
    entry("Community Rating", AlbumListSort::CommunityRating, SortOrder::Desc),
    entry("Critic Rating", AlbumListSort::CriticRating, SortOrder::Desc),
    entry("Name", AlbumListSort::Name, SortOrder::Asc),
    entry("Random", AlbumListSort::Random, SortOrder::Asc),
    entry("Recently Added", AlbumListSort::RecentlyAdded, SortOrder::Desc),
    entry("Release Date", AlbumListSort::ReleaseDate, SortOrder::Desc),
];

const NAVIDROME_SORTS: &[SortDescriptor] = &[
    entry("Album Artist", AlbumListSort::AlbumArtist, SortOrder::Asc),
    entry("Artist", AlbumListSort::Artist, SortOrder::Asc),
    entry("Duration", AlbumListSort::Duration, SortOrder::Desc),
    entry("Most Played", AlbumListSort::PlayCount, SortOrder::Desc),
    entry("Name", AlbumListSort::Name, SortOrder::Asc),
    entry("Random", AlbumListSort::Random, SortOrder::Asc),
    entry("Rating", AlbumListSort::Rating, SortOrder::Desc),
    entry("Recently Added", AlbumListSort::RecentlyAdded, SortOrder::Desc),
    entry("Recently Played", AlbumListSort::RecentlyPlayed, SortOrder::Desc),
    entry("Song Count", AlbumListSort::SongCount, SortOrder::Desc),
    entry("Favorited", AlbumListSort::Favorited, SortOrder::Desc),
    entry("Year", AlbumListSort::Year, SortOrder::Desc),
];

// Only what getAlbumList2 can express
const SUBSONIC_SORTS: &[SortDescriptor] = &[
    entry("Album Artist", AlbumListSort::AlbumArtist, SortOrder::Asc),
    entry("Most Played", AlbumListSort::PlayCount, SortOrder::Desc),
    entry("Name", AlbumListSort::Name, SortOrder::Asc),
    entry("Random", AlbumListSort::Random, SortOrder::Asc),
    entry("Rating", AlbumListSort::Rating, SortOrder::Desc),
    entry("Recently Added", AlbumListSort::RecentlyAdded, SortOrder::Desc),
    entry("Recently Played", AlbumListSort::RecentlyPlayed, SortOrder::Desc),
    entry("Favorited", AlbumListSort::Favorited, SortOrder::Desc),
    entry("Year", AlbumListSort::Year, SortOrder::Desc),
];

/// Entry of the order dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDescriptor {
    pub name: &'static str,
    pub value: SortOrder,
}

pub const ORDER_CATALOG: &[OrderDescriptor] = &[
    OrderDescriptor {
        name: "Ascending",
        value: SortOrder::Asc,
    },
    OrderDescriptor {
        name: "Descending",
        value: SortOrder::Desc,
    },
];

/// Sort catalog offered for a server type.
pub fn sort_catalog(server_type: ServerType) -> &'static [SortDescriptor] {
    match server_type {
        ServerType::Jellyfin => JELLYFIN_SORTS,
        ServerType::Navidrome => NAVIDROME_SORTS,
        ServerType::Subsonic => SUBSONIC_SORTS,
    }
}

pub fn find_sort(server_type: ServerType, value: AlbumListSort) -> Option<&'static SortDescriptor> {
    sort_catalog(server_type).iter().find(|d| d.value == value)
}

/// Label for the sort button. "Unknown" when there is no server or the
/// current sort isn't part of the server's catalog.
pub fn sort_by_label(server_type: Option<ServerType>, value: AlbumListSort) -> &'static str {
    server_type
        .and_then(|t| find_sort(t, value))
        .map(|d| d.name)
        .unwrap_or("Unknown")
}

/// Order applied when `value` is picked; ascending if the catalog lacks it.
pub fn default_order(server_type: ServerType, value: AlbumListSort) -> SortOrder {
    find_sort(server_type, value)
        .map(|d| d.default_order)
        .unwrap_or(SortOrder::Asc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_value_round_trips_through_str() {
        for sort in AlbumListSort::ALL {
            assert_eq!(AlbumListSort::parse(sort.as_str()), Some(sort));
        }
        assert_eq!(AlbumListSort::parse("loudness"), None);
    }

    #[test]
    fn catalogs_have_no_duplicate_values() {
        for server_type in [ServerType::Subsonic, ServerType::Navidrome, ServerType::Jellyfin] {
            let catalog = sort_catalog(server_type);
            for (i, a) in catalog.iter().enumerate() {
                assert!(
                    catalog[i + 1..].iter().all(|b| b.value != a.value),
                    "{:?} listed twice for {}",
                    a.value,
                    server_type
                );
            }
        }
    }

    #[test]
    fn label_is_unknown_without_server() {
        assert_eq!(sort_by_label(None, AlbumListSort::Name), "Unknown");
    }

    #[test]
    fn label_is_unknown_when_sort_not_offered() {
        assert_eq!(
            sort_by_label(Some(ServerType::Jellyfin), AlbumListSort::SongCount),
            "Unknown"
        );
        assert_eq!(
            sort_by_label(Some(ServerType::Navidrome), AlbumListSort::SongCount),
            "Song Count"
        );
    }

    #[test]
    fn default_order_comes_from_catalog() {
        assert_eq!(
            default_order(ServerType::Jellyfin, AlbumListSort::CommunityRating),
            SortOrder::Desc
        );
        assert_eq!(
            default_order(ServerType::Navidrome, AlbumListSort::Artist),
            SortOrder::Asc
        );
        assert_eq!(
            default_order(ServerType::Jellyfin, AlbumListSort::Duration),
            SortOrder::Asc
        );
    }
}
