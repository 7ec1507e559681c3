//! Resource descriptors: cache key plus loading request.

use kanban_remote::Endpoint;

use super::keys;
use crate::query::Resource;

pub fn dashboard() -> Resource {
    Resource::new(keys::dashboard(), Endpoint::Dashboard)
}

pub fn board(id: u64) -> Resource {
    Resource::new(keys::board(id), Endpoint::Board(id))
}

pub fn board_members(id: u64) -> Resource {
    Resource::new(keys::board_members(id), Endpoint::BoardMembers(id))
}

pub fn teams() -> Resource {
    Resource::new(keys::teams(), Endpoint::Teams)
}

pub fn team(id: u64) -> Resource {
    Resource::new(keys::team(id), Endpoint::Team(id))
}

pub fn me() -> Resource {
    Resource::new(keys::me(), Endpoint::Me)
}

pub fn my_activity() -> Resource {
    Resource::new(keys::my_activity(), Endpoint::MyActivity)
}
