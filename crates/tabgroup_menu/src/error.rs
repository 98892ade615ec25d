use serde::Serialize;

use tabgroup_host::{GroupId, HostError};

/// Why a link could not be placed into a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", content = "message")]
pub enum PlacementError {
    /// The clicked menu id is neither `newGroup` nor `group-<id>`.
    #[error("invalid menu target: {0}")]
    InvalidTarget(String),
    /// The group was closed between the menu being drawn and the click.
    #[error("group {0} no longer exists")]
    GroupNotFound(GroupId),
    /// The host accepted the grouping call but the tab did not end up grouped.
    #[error("failed to add tab to group: {0}")]
    GroupingFailed(String),
    #[error("failed to create new tab: {0}")]
    TabCreationFailed(String),
    #[error(transparent)]
    Host(#[from] HostError),
}

pub type PlacementResult<T> = Result<T, PlacementError>;

impl From<PlacementError> for String {
    fn from(e: PlacementError) -> Self {
        e.to_string()
    }
}
