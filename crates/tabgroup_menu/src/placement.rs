//! Opens a clicked link in a new or existing tab group.
//!
//! A tab is created first and grouped second, so every failure after the
//! tab exists removes it again before the error is returned. Removal is
//! best-effort: if the host refuses, the orphan is logged and left behind.

use std::sync::Arc;

use tabgroup_host::{
    CreateTabProperties, GroupId, GroupTabsOptions, HostServices, Tab, TabId, WindowId,
    TAB_GROUP_ID_NONE,
};
use tabgroup_shared::diagnostics;

use crate::error::{PlacementError, PlacementResult};
use crate::ids::MenuTarget;
use crate::reconciler::MenuReconciler;

/// Reason passed to the reconciler after a link joins an existing group.
pub const LAST_USED_UPDATE_REASON: &str = "lastUsedGroupUpdate";

pub struct TabPlacer {
    host: HostServices,
    reconciler: Arc<MenuReconciler>,
}

impl TabPlacer {
    pub fn new(host: HostServices, reconciler: Arc<MenuReconciler>) -> Self {
        Self { host, reconciler }
    }

    /// Opens `link_url` in a background tab and moves it into the group the
    /// menu id names. Joining an existing group makes it the last used one;
    /// a fresh group does not.
    pub async fn place_link(
        &self,
        link_url: &str,
        source_window_id: WindowId,
        target_menu_id: &str,
    ) -> PlacementResult<Tab> {
        let target = MenuTarget::parse(target_menu_id)
            .ok_or_else(|| PlacementError::InvalidTarget(target_menu_id.to_string()))?;
        diagnostics::log(format!(
            "place_link_start target={} window={}",
            target_menu_id, source_window_id
        ));

        let (tab, group_id) = match target {
            MenuTarget::NewGroup => self.place_in_new_group(link_url, source_window_id).await?,
            MenuTarget::Group(group_id) => {
                let placed = self.place_in_group(link_url, group_id).await?;
                self.remember_group(group_id).await;
                placed
            }
        };
        diagnostics::log(format!(
            "place_link_done tab={} group={}",
            tab.id, group_id
        ));
        Ok(tab)
    }

    async fn place_in_new_group(
        &self,
        link_url: &str,
        window_id: WindowId,
    ) -> PlacementResult<(Tab, GroupId)> {
        let tab = self.open_tab(link_url, window_id).await?;
        let result = self.join_new_group(tab.id).await;
        self.settle(tab.id, result).await
    }

    async fn join_new_group(&self, tab_id: TabId) -> PlacementResult<(Tab, GroupId)> {
        let group_id = self
            .host
            .tabs
            .group_tabs(GroupTabsOptions {
                tab_ids: vec![tab_id],
                group_id: None,
            })
            .await?;
        if group_id == TAB_GROUP_ID_NONE {
            return Err(PlacementError::GroupingFailed(
                "host returned no group id".to_string(),
            ));
        }

        let tab = self.host.tabs.get_tab(tab_id).await?;
        if tab.group().is_none() {
            return Err(PlacementError::GroupingFailed(format!(
                "tab {} is not in a group",
                tab_id
            )));
        }
        Ok((tab, group_id))
    }

    async fn place_in_group(
        &self,
        link_url: &str,
        group_id: GroupId,
    ) -> PlacementResult<(Tab, GroupId)> {
        // The menu may be older than the group list; check before creating.
        let groups = self.host.all_tab_groups().await?;
        let group = groups
            .into_iter()
            .find(|group| group.id == group_id)
            .ok_or(PlacementError::GroupNotFound(group_id))?;

        let tab = self.open_tab(link_url, group.window_id).await?;
        let result = self.join_group(tab.id, group_id).await;
        self.settle(tab.id, result).await
    }

    async fn join_group(&self, tab_id: TabId, group_id: GroupId) -> PlacementResult<(Tab, GroupId)> {
        self.host
            .tabs
            .group_tabs(GroupTabsOptions {
                tab_ids: vec![tab_id],
                group_id: Some(group_id),
            })
            .await?;

        let tab = self.host.tabs.get_tab(tab_id).await?;
        if tab.group() != Some(group_id) {
            return Err(PlacementError::GroupingFailed(format!(
                "tab {} did not join group {}",
                tab_id, group_id
            )));
        }
        Ok((tab, group_id))
    }

    async fn open_tab(&self, link_url: &str, window_id: WindowId) -> PlacementResult<Tab> {
        self.host
            .tabs
            .create_tab(CreateTabProperties {
                url: link_url.to_string(),
                active: false,
                window_id: Some(window_id),
            })
            .await
            .map_err(|err| PlacementError::TabCreationFailed(err.to_string()))
    }

    /// Removes the tab when the placement failed, then hands the result back.
    async fn settle<T>(&self, tab_id: TabId, result: PlacementResult<T>) -> PlacementResult<T> {
        if let Err(err) = &result {
            diagnostics::warn(format!("placement_rollback tab={} error={}", tab_id, err));
            if let Err(remove_err) = self.host.tabs.remove_tab(tab_id).await {
                diagnostics::error(format!(
                    "orphan_tab_remove_failed tab={} error={}",
                    tab_id, remove_err
                ));
            }
        }
        result
    }

    async fn remember_group(&self, group_id: GroupId) {
        if let Err(err) = self.reconciler.last_used().save(group_id).await {
            diagnostics::error(format!(
                "last_used_group_save_failed id={} error={}",
                group_id, err
            ));
            return;
        }
        self.reconciler.reconcile(LAST_USED_UPDATE_REASON).await;
    }
}
