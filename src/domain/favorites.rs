// src/domain/favorites.rs
//
// Overlay of the favorites set onto fetched items. Pure: inputs are never
// mutated and every output is a fresh value.

use std::collections::HashSet;

use super::{Item, ItemId};

/// Favorite membership, owned by the FavoritesStore
pub type FavoriteSet = HashSet<ItemId>;

pub struct FavoritesMerger;

impl FavoritesMerger {
    /// Copies of `items` with `is_favorite` set from membership in `favorite_ids`
    pub fn merge(items: &[Item], favorite_ids: &FavoriteSet) -> Vec<Item> {
        items
            .iter()
            .map(|item| Self::merge_one(item, favorite_ids))
            .collect()
    }

    pub fn merge_one(item: &Item, favorite_ids: &FavoriteSet) -> Item {
        item.with_favorite(favorite_ids.contains(&item.id))
    }

    /// Only the favorited items, flag forced on
    pub fn filter_favorites(items: &[Item], favorite_ids: &FavoriteSet) -> Vec<Item> {
        items
            .iter()
            .filter(|item| favorite_ids.contains(&item.id))
            .map(|item| item.with_favorite(true))
            .collect()
    }
}
