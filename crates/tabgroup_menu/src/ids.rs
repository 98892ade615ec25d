//! Context-menu id wire format.

use tabgroup_host::GroupId;

/// Top-level "Open in Tab Group" entry.
pub const MENU_PARENT_ID: &str = "openInGroup";
/// Reserved leaf that opens the link in a brand new group.
pub const MENU_NEW_GROUP_ID: &str = "newGroup";
/// Prefix of the per-group leaves, followed by the decimal group id.
pub const MENU_GROUP_PREFIX: &str = "group-";

/// Where a clicked menu leaf asks the link to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    NewGroup,
    Group(GroupId),
}

impl MenuTarget {
    /// Parses a menu item id. Only `newGroup` and `group-<digits>` are valid.
    pub fn parse(menu_item_id: &str) -> Option<Self> {
        if menu_item_id == MENU_NEW_GROUP_ID {
            return Some(MenuTarget::NewGroup);
        }
        let digits = menu_item_id.strip_prefix(MENU_GROUP_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<GroupId>().ok().map(MenuTarget::Group)
    }

    pub fn menu_id(&self) -> String {
        match self {
            MenuTarget::NewGroup => MENU_NEW_GROUP_ID.to_string(),
            MenuTarget::Group(id) => group_menu_id(*id),
        }
    }
}

pub fn group_menu_id(group_id: GroupId) -> String {
    format!("{}{}", MENU_GROUP_PREFIX, group_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_targets() {
        assert_eq!(MenuTarget::parse("newGroup"), Some(MenuTarget::NewGroup));
        assert_eq!(MenuTarget::parse("group-42"), Some(MenuTarget::Group(42)));
        assert_eq!(MenuTarget::parse("group-0"), Some(MenuTarget::Group(0)));
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        for id in [
            "",
            "openInGroup",
            "group-",
            "group--1",
            "group-+3",
            "group-12abc",
            "group- 7",
            "Group-7",
            "group-99999999999999999999",
        ] {
            assert_eq!(MenuTarget::parse(id), None, "{} should be rejected", id);
        }
    }

    #[test]
    fn test_menu_id_matches_parse() {
        assert_eq!(MenuTarget::Group(7).menu_id(), "group-7");
        assert_eq!(MenuTarget::NewGroup.menu_id(), MENU_NEW_GROUP_ID);
        assert_eq!(group_menu_id(15), "group-15");
    }
}
