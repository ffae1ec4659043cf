use serde::{Deserialize, Serialize};

/// Upstream identifier of a catalog entry
pub type ItemId = i64;

/// A catalog entry (a movie)
///
/// `is_favorite` is derived data: the authoritative membership lives in the
/// FavoritesStore and the flag only reflects what was known when this value
/// was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default, skip_deserializing)]
    pub is_favorite: bool,
}

impl Item {
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            overview: String::new(),
            poster_path: None,
            vote_average: 0.0,
            is_favorite: false,
        }
    }

    /// Copy of this item with the favorite flag replaced
    pub fn with_favorite(&self, is_favorite: bool) -> Self {
        Self {
            is_favorite,
            ..self.clone()
        }
    }
}
