//! Keeps the "Open in Tab Group" submenu in step with the live tab groups.
//!
//! Each pass tears down the per-group leaves it created last time, queries
//! every window for its groups, and recreates one leaf per group with the
//! most recently used group first. Passes never overlap: a call that finds a
//! pass in flight returns [`ReconcileOutcome::Skipped`] instead of waiting.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;

use tabgroup_host::{
    GroupId, HostError, HostResult, HostServices, MenuContext, MenuItemOptions, TabGroup,
};
use tabgroup_shared::diagnostics;

use crate::config::MenuConfig;
use crate::ids::{group_menu_id, MENU_NEW_GROUP_ID, MENU_PARENT_ID};
use crate::last_used::LastUsedGroup;
use crate::mirror::{MenuEntry, MenuMirror};

/// What a call to [`MenuReconciler::reconcile`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Another pass held the update lock.
    Skipped,
    Completed {
        created: usize,
        removed: usize,
        /// Individual menu create/remove calls the host rejected.
        failures: usize,
    },
    /// The group query failed; the menu keeps whatever survived removal.
    Aborted(HostError),
}

pub struct MenuReconciler {
    host: HostServices,
    config: MenuConfig,
    last_used: Arc<LastUsedGroup>,
    /// Doubles as the update lock.
    mirror: Mutex<MenuMirror>,
}

impl MenuReconciler {
    pub fn new(host: HostServices, config: MenuConfig) -> Self {
        let last_used = Arc::new(LastUsedGroup::new(host.storage.clone()));
        Self {
            host,
            config,
            last_used,
            mirror: Mutex::new(MenuMirror::new()),
        }
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn last_used(&self) -> &Arc<LastUsedGroup> {
        &self.last_used
    }

    /// True while a pass (or install/clear) holds the update lock.
    pub fn is_updating(&self) -> bool {
        self.mirror.try_lock().is_err()
    }

    /// Rebuilds the group leaves. Never fails; the outcome is informational.
    pub async fn reconcile(&self, reason: &str) -> ReconcileOutcome {
        let Ok(mut mirror) = self.mirror.try_lock() else {
            diagnostics::log(format!("menu_update_skipped reason={}", reason));
            return ReconcileOutcome::Skipped;
        };
        diagnostics::log(format!(
            "menu_update_start reason={} tracked={}",
            reason,
            mirror.len()
        ));

        let outcome = self.run_pass(&mut mirror).await;
        match &outcome {
            ReconcileOutcome::Completed {
                created,
                removed,
                failures,
            } => diagnostics::log(format!(
                "menu_update_done reason={} created={} removed={} failures={}",
                reason, created, removed, failures
            )),
            ReconcileOutcome::Aborted(err) => diagnostics::error(format!(
                "menu_update_failed reason={} error={}",
                reason, err
            )),
            ReconcileOutcome::Skipped => {}
        }
        outcome
    }

    async fn run_pass(&self, mirror: &mut MenuMirror) -> ReconcileOutcome {
        let mut removed = 0;
        let mut failures = 0;

        for entry in mirror.group_entries() {
            match self.host.menus.remove(&entry.id).await {
                Ok(()) => {
                    mirror.forget(&entry.id);
                    removed += 1;
                }
                Err(err) => {
                    failures += 1;
                    diagnostics::error(format!(
                        "menu_item_remove_failed id={} error={}",
                        entry.id, err
                    ));
                }
            }
        }

        let mut groups = match self.host.all_tab_groups().await {
            Ok(groups) => groups,
            Err(err) => return ReconcileOutcome::Aborted(err),
        };

        let last_used = self.last_used.ensure_loaded().await;
        if let Some(last_used) = last_used {
            // Stable, so everything else keeps host order.
            groups.sort_by_key(|group| group.id != last_used);
        }

        let creations = groups.iter().map(|group| {
            let options = self.entry_options(group, last_used);
            let menus = self.host.menus.clone();
            async move {
                let id = options.id.clone();
                (id, menus.create(options).await)
            }
        });

        let mut created = 0;
        for (id, result) in join_all(creations).await {
            match result {
                Ok(_) => {
                    mirror.track(id, Some(MENU_PARENT_ID));
                    created += 1;
                }
                Err(err) => {
                    failures += 1;
                    diagnostics::error(format!("menu_item_create_failed id={} error={}", id, err));
                }
            }
        }

        ReconcileOutcome::Completed {
            created,
            removed,
            failures,
        }
    }

    fn entry_options(&self, group: &TabGroup, last_used: Option<GroupId>) -> MenuItemOptions {
        let starred = last_used == Some(group.id);
        MenuItemOptions {
            id: group_menu_id(group.id),
            parent_id: Some(MENU_PARENT_ID.to_string()),
            title: entry_title(group, starred, &self.config.last_used_marker),
            contexts: vec![MenuContext::Link],
        }
    }

    /// Resets the native tree to the parent entry and the "new group" leaf.
    /// Waits for any running pass instead of skipping.
    pub async fn install_permanent_entries(&self) -> HostResult<()> {
        let mut mirror = self.mirror.lock().await;
        self.host.menus.remove_all().await?;
        mirror.clear();

        let parent = MenuItemOptions {
            id: MENU_PARENT_ID.to_string(),
            parent_id: None,
            title: self.config.parent_title.clone(),
            contexts: vec![MenuContext::Link],
        };
        let parent_id = self.host.menus.create(parent).await?;
        mirror.track(parent_id, None);

        let new_group = MenuItemOptions {
            id: MENU_NEW_GROUP_ID.to_string(),
            parent_id: Some(MENU_PARENT_ID.to_string()),
            title: self.config.new_group_title.clone(),
            contexts: vec![MenuContext::Link],
        };
        let new_group_id = self.host.menus.create(new_group).await?;
        mirror.track(new_group_id, Some(MENU_PARENT_ID));

        diagnostics::log("menu_permanent_entries_installed");
        Ok(())
    }

    /// Removes every native menu item and forgets them.
    pub async fn clear_menu(&self) -> HostResult<()> {
        let mut mirror = self.mirror.lock().await;
        let result = self.host.menus.remove_all().await;
        mirror.clear();
        result
    }

    pub async fn mirror_snapshot(&self) -> Vec<MenuEntry> {
        self.mirror.lock().await.entries().to_vec()
    }
}

/// Leaf title: the group's own title, or its color when it has none.
pub fn entry_title(group: &TabGroup, starred: bool, marker: &str) -> String {
    let title = match group.named_title() {
        Some(title) => title.to_string(),
        None => format!("Unnamed Group ({})", group.color),
    };
    if starred {
        format!("{} {}", marker, title)
    } else {
        title
    }
}
