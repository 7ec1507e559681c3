use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::reorder::{ContainerId, Containers, ItemId, OrderedContainer};

/// Who can see a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Team,
    Public,
}

/// Role of a member on a board or team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
}

/// A card on a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields not modelled here, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A list (column) on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardList {
    pub id: u64,
    pub title: String,
    /// Display-only grouping; cards shown here also live in a real list.
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full board payload as cached under `["board", id]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: u64,
    pub title: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub lists: Vec<BoardList>,
    /// Fields not modelled here, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Board {
    /// Returns the board's lists as reorderable containers, in display order.
    pub fn containers(&self) -> Containers {
        self.lists
            .iter()
            .map(|list| {
                let items = list.cards.iter().map(|card| ItemId(card.id));
                let container = if list.is_virtual {
                    OrderedContainer::virtual_container(items)
                } else {
                    OrderedContainer::new(items)
                };
                (ContainerId(list.id), container)
            })
            .collect()
    }

    /// Rearranges the cards of every non-virtual list to match `layout`.
    ///
    /// Lists missing from `layout` are left untouched. Ids in `layout`
    /// that no list on this board carries are skipped.
    pub fn apply_layout(&mut self, layout: &Containers) {
        let mut cards: HashMap<u64, Card> = HashMap::new();
        for list in self.lists.iter().filter(|l| !l.is_virtual) {
            for card in &list.cards {
                cards.insert(card.id, card.clone());
            }
        }

        for list in self.lists.iter_mut().filter(|l| !l.is_virtual) {
            if let Some(container) = layout.get(&ContainerId(list.id)) {
                list.cards = container
                    .items()
                    .iter()
                    .filter_map(|item| cards.get(&item.0).cloned())
                    .collect();
            }
        }
    }

    /// Summary as shown on the dashboard.
    pub fn summary(&self) -> BoardSummary {
        BoardSummary {
            id: self.id,
            title: self.title.clone(),
            visibility: self.visibility,
            is_favorite: self.is_favorite,
            extra: Map::new(),
        }
    }
}

/// Board entry on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub id: u64,
    pub title: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Dashboard payload as cached under `["dashboard"]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(default)]
    pub boards: Vec<BoardSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dashboard {
    /// Boards marked as favorite, in dashboard order.
    pub fn favorites(&self) -> impl Iterator<Item = &BoardSummary> {
        self.boards.iter().filter(|b| b.is_favorite)
    }

    pub fn board(&self, id: u64) -> Option<&BoardSummary> {
        self.boards.iter().find(|b| b.id == id)
    }

    /// Sets the favorite flag of a board. Returns false if it is not listed.
    pub fn set_favorite(&mut self, id: u64, favorite: bool) -> bool {
        match self.boards.iter_mut().find(|b| b.id == id) {
            Some(board) => {
                board.is_favorite = favorite;
                true
            },
            None => false,
        }
    }

    /// Removes a board. Returns false if it is not listed.
    pub fn remove_board(&mut self, id: u64) -> bool {
        let before = self.boards.len();
        self.boards.retain(|b| b.id != id);
        self.boards.len() != before
    }
}

/// A member of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMember {
    pub user_id: u64,
    pub nickname: String,
    pub role: MemberRole,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
