//! Host data model.
//!
//! These mirror the shapes the browser hands to extensions: tabs, windows,
//! tab groups, context-menu items, and the notifications fired when any of
//! them change. Field names serialize in camelCase to match the host wire
//! format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type TabId = i64;
pub type WindowId = i64;
pub type GroupId = i64;

/// Group id the host reports for a tab that is not in any group.
pub const TAB_GROUP_ID_NONE: GroupId = -1;

/// Colors the host allows for a tab group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

impl GroupColor {
    pub const ALL: [GroupColor; 9] = [
        GroupColor::Grey,
        GroupColor::Blue,
        GroupColor::Red,
        GroupColor::Yellow,
        GroupColor::Green,
        GroupColor::Pink,
        GroupColor::Purple,
        GroupColor::Cyan,
        GroupColor::Orange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupColor::Grey => "grey",
            GroupColor::Blue => "blue",
            GroupColor::Red => "red",
            GroupColor::Yellow => "yellow",
            GroupColor::Green => "green",
            GroupColor::Pink => "pink",
            GroupColor::Purple => "purple",
            GroupColor::Cyan => "cyan",
            GroupColor::Orange => "orange",
        }
    }
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupColor::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown group color '{}'", s))
    }
}

/// Read-only view of a tab group as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabGroup {
    pub id: GroupId,
    pub window_id: WindowId,
    #[serde(default)]
    pub title: Option<String>,
    pub color: GroupColor,
    #[serde(default)]
    pub collapsed: bool,
}

impl TabGroup {
    /// The user-assigned title, if the group has a non-empty one.
    pub fn named_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    pub window_id: WindowId,
    pub group_id: GroupId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl Tab {
    /// The group this tab belongs to, with the host's sentinel mapped to `None`.
    pub fn group(&self) -> Option<GroupId> {
        (self.group_id != TAB_GROUP_ID_NONE).then_some(self.group_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub id: WindowId,
    #[serde(default)]
    pub focused: bool,
    /// Only filled when the window list was requested populated.
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTabProperties {
    pub url: String,
    pub active: bool,
    pub window_id: Option<WindowId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTabsOptions {
    pub tab_ids: Vec<TabId>,
    /// Existing group to join. `None` asks the host to allocate a new group.
    pub group_id: Option<GroupId>,
}

/// Where a context-menu item is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuContext {
    All,
    Page,
    Link,
    Selection,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemOptions {
    pub id: String,
    pub parent_id: Option<String>,
    pub title: String,
    pub contexts: Vec<MenuContext>,
}

/// Payload of a context-menu click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickInfo {
    pub menu_item_id: String,
    pub parent_menu_item_id: Option<String>,
    pub link_url: Option<String>,
}

/// Notifications the host fires at the background process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    GroupCreated(TabGroup),
    GroupRemoved(TabGroup),
    GroupUpdated(TabGroup),
    MenuShown,
    MenuClicked { info: ClickInfo, tab: Option<Tab> },
}

impl HostEvent {
    /// Host-side listener name, used as the reconciliation reason.
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::GroupCreated(_) => "onCreated",
            HostEvent::GroupRemoved(_) => "onRemoved",
            HostEvent::GroupUpdated(_) => "onUpdated",
            HostEvent::MenuShown => "onShown",
            HostEvent::MenuClicked { .. } => "onClicked",
        }
    }
}

/// A set of named API permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    pub permissions: Vec<String>,
}

impl PermissionSet {
    pub fn new<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }
}
