use sonixd_common::LibraryItem;

/// Screens of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppRoute {
    Home,
    Login,
    LibraryAlbums,
    LibraryArtists,
    Playing,
    Search,
}

impl AppRoute {
    pub fn all() -> &'static [AppRoute] {
        &[
            AppRoute::Home,
            AppRoute::Login,
            AppRoute::LibraryAlbums,
            AppRoute::LibraryArtists,
            AppRoute::Playing,
            AppRoute::Search,
        ]
    }

    /// Route pattern; `:itemType` is a path parameter
    pub fn path(&self) -> &'static str {
        match self {
            AppRoute::Home => "/",
            AppRoute::Login => "/login",
            AppRoute::LibraryAlbums => "/library/albums",
            AppRoute::LibraryArtists => "/library/artists",
            AppRoute::Playing => "/playing",
            AppRoute::Search => "/search/:itemType",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, AppRoute::Login)
    }

    pub fn from_path(path: &str) -> Option<AppRoute> {
        let path = path.split('?').next().unwrap_or(path);
        if path.starts_with("/search/") {
            return Some(AppRoute::Search);
        }
        Self::all().iter().copied().find(|r| r.path() == path)
    }
}

/// `/search/<item>` for one search tab
pub fn generate_search_path(item_type: LibraryItem) -> String {
    AppRoute::Search
        .path()
        .replace(":itemType", item_type.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_login_is_public() {
        let public: Vec<_> = AppRoute::all()
            .iter()
            .filter(|r| !r.requires_auth())
            .collect();
        assert_eq!(public, vec![&AppRoute::Login]);
    }

    #[test]
    fn search_path_fills_item_type() {
        assert_eq!(generate_search_path(LibraryItem::Album), "/search/album");
        assert_eq!(
            generate_search_path(LibraryItem::AlbumArtist),
            "/search/albumArtist"
        );
    }

    #[test]
    fn paths_resolve_back_to_routes() {
        for route in AppRoute::all() {
            if *route != AppRoute::Search {
                assert_eq!(AppRoute::from_path(route.path()), Some(*route));
            }
        }
        assert_eq!(
            AppRoute::from_path("/search/song?query=abc"),
            Some(AppRoute::Search)
        );
        assert_eq!(AppRoute::from_path("/nowhere"), None);
    }
}
