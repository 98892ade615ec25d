//! In-memory browser host.
//!
//! Implements every host service over plain process memory, close enough to
//! the real browser that the background process cannot tell the difference:
//! grouping a tab without a target allocates a fresh group, closing the last
//! tab of a group removes the group, removing a menu item removes its
//! children. User-side actions (`create_group`, `click_menu`, ...) fire the
//! same notifications the browser would.
//!
//! Failure paths are driven through [`Faults`], and group queries can be held
//! open with [`MemoryBrowser::pause_group_queries`] to observe work that is in
//! flight.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, Semaphore};

use crate::error::{HostError, HostResult};
use crate::model::{
    ClickInfo, CreateTabProperties, GroupColor, GroupId, GroupTabsOptions, HostEvent,
    MenuItemOptions, PermissionSet, Tab, TabGroup, TabId, Window, WindowId, TAB_GROUP_ID_NONE,
};
use crate::service::{
    ContextMenuService, EventSource, HostFuture, KeyValueStore, PermissionService,
    TabGroupService, TabService, WindowService,
};

const EVENT_CAPACITY: usize = 256;

/// Switches that make individual host calls fail.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub fail_create_tab: bool,
    pub fail_group_tabs: bool,
    /// `group_tabs` reports success but leaves the tabs where they were.
    pub decline_grouping: bool,
    pub fail_get_tab: bool,
    pub fail_remove_tab: bool,
    pub fail_query_groups: bool,
    pub fail_storage: bool,
    /// Menu ids whose creation is rejected.
    pub fail_menu_create: HashSet<String>,
    /// Menu ids whose removal is rejected.
    pub fail_menu_remove: HashSet<String>,
}

#[derive(Default)]
struct BrowserState {
    windows: Vec<WindowId>,
    tabs: Vec<Tab>,
    groups: Vec<TabGroup>,
    menu: Vec<MenuItemOptions>,
    values: HashMap<String, Value>,
    granted: HashSet<String>,
    next_window_id: WindowId,
    next_tab_id: TabId,
    next_group_id: GroupId,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl BrowserState {
    fn ensure_window(&mut self, window_id: WindowId) {
        if !self.windows.contains(&window_id) {
            self.windows.push(window_id);
            self.next_window_id = self.next_window_id.max(window_id);
        }
    }

    fn push_tab(&mut self, window_id: WindowId, url: &str, active: bool) -> Tab {
        let tab = Tab {
            id: next_id(&mut self.next_tab_id),
            window_id,
            group_id: TAB_GROUP_ID_NONE,
            url: Some(url.to_string()),
            active,
        };
        self.tabs.push(tab.clone());
        tab
    }

    fn new_group(&mut self, window_id: WindowId, title: Option<String>, color: GroupColor) -> TabGroup {
        let group = TabGroup {
            id: next_id(&mut self.next_group_id),
            window_id,
            title,
            color,
            collapsed: false,
        };
        self.groups.push(group.clone());
        group
    }

    /// Drops groups that no longer hold any tab and returns them.
    fn prune_empty_groups(&mut self) -> Vec<TabGroup> {
        let tabs = &self.tabs;
        let (kept, removed): (Vec<TabGroup>, Vec<TabGroup>) = self
            .groups
            .drain(..)
            .partition(|group| tabs.iter().any(|tab| tab.group_id == group.id));
        self.groups = kept;
        removed
    }

    fn menu_item(&self, id: &str) -> Option<&MenuItemOptions> {
        self.menu.iter().find(|item| item.id == id)
    }
}

/// A browser that lives entirely in memory.
pub struct MemoryBrowser {
    state: Mutex<BrowserState>,
    faults: Mutex<Faults>,
    events: broadcast::Sender<HostEvent>,
    query_gate: Mutex<Option<Arc<Semaphore>>>,
    queries_waiting: AtomicUsize,
}

impl MemoryBrowser {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(BrowserState::default()),
            faults: Mutex::new(Faults::default()),
            events,
            query_gate: Mutex::new(None),
            queries_waiting: AtomicUsize::new(0),
        }
    }

    pub fn grant<I, S>(&self, permissions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.lock();
        state.granted.extend(permissions.into_iter().map(Into::into));
    }

    pub fn revoke(&self, permission: &str) {
        self.state.lock().granted.remove(permission);
    }

    pub fn update_faults<F>(&self, f: F)
    where
        F: FnOnce(&mut Faults),
    {
        f(&mut self.faults.lock());
    }

    /// Holds every subsequent `query_groups` call until resumed.
    pub fn pause_group_queries(&self) {
        *self.query_gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn resume_group_queries(&self) {
        if let Some(gate) = self.query_gate.lock().take() {
            gate.close();
        }
    }

    /// Number of `query_groups` calls currently held by the pause gate.
    pub fn waiting_group_queries(&self) -> usize {
        self.queries_waiting.load(Ordering::SeqCst)
    }

    pub fn open_window(&self) -> WindowId {
        let mut state = self.state.lock();
        let id = next_id(&mut state.next_window_id);
        state.windows.push(id);
        id
    }

    pub fn open_tab(&self, window_id: WindowId, url: &str) -> HostResult<Tab> {
        let mut state = self.state.lock();
        if !state.windows.contains(&window_id) {
            return Err(HostError::NotFound(format!("No window with id: {}", window_id)));
        }
        Ok(state.push_tab(window_id, url, true))
    }

    /// Creates a group holding one fresh tab, as a user dragging a tab into a
    /// new group would. Unknown windows are opened on the fly.
    pub fn create_group(
        &self,
        window_id: WindowId,
        title: Option<&str>,
        color: GroupColor,
    ) -> TabGroup {
        let group = {
            let mut state = self.state.lock();
            state.ensure_window(window_id);
            let tab = state.push_tab(window_id, "about:blank", false);
            let group = state.new_group(window_id, title.map(str::to_string), color);
            if let Some(entry) = state.tabs.iter_mut().find(|t| t.id == tab.id) {
                entry.group_id = group.id;
            }
            group
        };
        self.emit(HostEvent::GroupCreated(group.clone()));
        group
    }

    pub fn update_group(
        &self,
        group_id: GroupId,
        title: Option<String>,
        color: Option<GroupColor>,
    ) -> HostResult<TabGroup> {
        let group = {
            let mut state = self.state.lock();
            let group = state
                .groups
                .iter_mut()
                .find(|group| group.id == group_id)
                .ok_or_else(|| HostError::NotFound(format!("No group with id: {}", group_id)))?;
            if title.is_some() {
                group.title = title;
            }
            if let Some(color) = color {
                group.color = color;
            }
            group.clone()
        };
        self.emit(HostEvent::GroupUpdated(group.clone()));
        Ok(group)
    }

    /// Closes every tab in the group, which removes the group itself.
    pub fn close_group(&self, group_id: GroupId) -> HostResult<TabGroup> {
        let removed = {
            let mut state = self.state.lock();
            if !state.groups.iter().any(|group| group.id == group_id) {
                return Err(HostError::NotFound(format!("No group with id: {}", group_id)));
            }
            state.tabs.retain(|tab| tab.group_id != group_id);
            state.prune_empty_groups()
        };
        let mut closed = None;
        for group in removed {
            if group.id == group_id {
                closed = Some(group.clone());
            }
            self.emit(HostEvent::GroupRemoved(group));
        }
        closed.ok_or_else(|| HostError::NotFound(format!("No group with id: {}", group_id)))
    }

    pub fn show_menu(&self) {
        self.emit(HostEvent::MenuShown);
    }

    /// Fires a click on an existing menu item from the given tab.
    pub fn click_menu(
        &self,
        menu_item_id: &str,
        link_url: Option<&str>,
        source_tab: Option<TabId>,
    ) -> HostResult<()> {
        let event = {
            let state = self.state.lock();
            let item = state.menu_item(menu_item_id).ok_or_else(|| {
                HostError::NotFound(format!("No menu item with id: {}", menu_item_id))
            })?;
            let tab = source_tab.and_then(|id| state.tabs.iter().find(|t| t.id == id).cloned());
            HostEvent::MenuClicked {
                info: ClickInfo {
                    menu_item_id: item.id.clone(),
                    parent_menu_item_id: item.parent_id.clone(),
                    link_url: link_url.map(str::to_string),
                },
                tab,
            }
        };
        self.emit(event);
        Ok(())
    }

    pub fn windows(&self) -> Vec<WindowId> {
        self.state.lock().windows.clone()
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.state.lock().tabs.clone()
    }

    pub fn tab(&self, tab_id: TabId) -> Option<Tab> {
        self.state.lock().tabs.iter().find(|t| t.id == tab_id).cloned()
    }

    pub fn groups(&self) -> Vec<TabGroup> {
        self.state.lock().groups.clone()
    }

    pub fn menu_items(&self) -> Vec<MenuItemOptions> {
        self.state.lock().menu.clone()
    }

    /// Direct children of a menu item, in creation order.
    pub fn menu_children(&self, parent_id: &str) -> Vec<MenuItemOptions> {
        self.state
            .lock()
            .menu
            .iter()
            .filter(|item| item.parent_id.as_deref() == Some(parent_id))
            .cloned()
            .collect()
    }

    pub fn stored(&self, key: &str) -> Option<Value> {
        self.state.lock().values.get(key).cloned()
    }

    pub fn seed_value(&self, key: &str, value: Value) {
        self.state.lock().values.insert(key.to_string(), value);
    }

    fn emit(&self, event: HostEvent) {
        // No subscribers is not an error: nobody is listening yet.
        let _ = self.events.send(event);
    }

    fn create_tab_now(&self, properties: CreateTabProperties) -> HostResult<Tab> {
        if self.faults.lock().fail_create_tab {
            return Err(HostError::Rejected("Tabs cannot be created right now".to_string()));
        }
        let mut state = self.state.lock();
        let window_id = match properties.window_id {
            Some(id) if state.windows.contains(&id) => id,
            Some(id) => return Err(HostError::NotFound(format!("No window with id: {}", id))),
            None => *state
                .windows
                .first()
                .ok_or_else(|| HostError::Rejected("No current window".to_string()))?,
        };
        Ok(state.push_tab(window_id, &properties.url, properties.active))
    }

    fn get_tab_now(&self, tab_id: TabId) -> HostResult<Tab> {
        if self.faults.lock().fail_get_tab {
            return Err(HostError::Rejected("Tab lookup failed".to_string()));
        }
        self.tab(tab_id)
            .ok_or_else(|| HostError::NotFound(format!("No tab with id: {}", tab_id)))
    }

    fn remove_tab_now(&self, tab_id: TabId) -> HostResult<()> {
        if self.faults.lock().fail_remove_tab {
            return Err(HostError::Rejected("Tabs cannot be edited right now".to_string()));
        }
        let removed = {
            let mut state = self.state.lock();
            let before = state.tabs.len();
            state.tabs.retain(|tab| tab.id != tab_id);
            if state.tabs.len() == before {
                return Err(HostError::NotFound(format!("No tab with id: {}", tab_id)));
            }
            state.prune_empty_groups()
        };
        for group in removed {
            self.emit(HostEvent::GroupRemoved(group));
        }
        Ok(())
    }

    fn group_tabs_now(&self, options: GroupTabsOptions) -> HostResult<GroupId> {
        let (decline, fail) = {
            let faults = self.faults.lock();
            (faults.decline_grouping, faults.fail_group_tabs)
        };
        if fail {
            return Err(HostError::Rejected("Tabs cannot be grouped right now".to_string()));
        }
        if options.tab_ids.is_empty() {
            return Err(HostError::Rejected("At least one tab must be specified".to_string()));
        }

        let mut created = None;
        let (group_id, removed) = {
            let mut state = self.state.lock();
            let mut window_id = None;
            for tab_id in &options.tab_ids {
                let tab = state
                    .tabs
                    .iter()
                    .find(|tab| tab.id == *tab_id)
                    .ok_or_else(|| HostError::NotFound(format!("No tab with id: {}", tab_id)))?;
                window_id.get_or_insert(tab.window_id);
            }
            let Some(first_window) = window_id else {
                return Err(HostError::Rejected("No tabs to group".to_string()));
            };

            let (group_id, group_window) = match options.group_id {
                Some(id) => {
                    let group = state
                        .groups
                        .iter()
                        .find(|group| group.id == id)
                        .ok_or_else(|| HostError::NotFound(format!("No group with id: {}", id)))?;
                    (group.id, group.window_id)
                }
                None if decline => (next_id(&mut state.next_group_id), first_window),
                None => {
                    let color_index = (state.next_group_id as usize) % GroupColor::ALL.len();
                    let group = state.new_group(first_window, None, GroupColor::ALL[color_index]);
                    let ids = (group.id, group.window_id);
                    created = Some(group);
                    ids
                }
            };

            if decline {
                return Ok(group_id);
            }

            for tab in state.tabs.iter_mut() {
                if options.tab_ids.contains(&tab.id) {
                    tab.group_id = group_id;
                    tab.window_id = group_window;
                }
            }
            (group_id, state.prune_empty_groups())
        };

        if let Some(group) = created {
            self.emit(HostEvent::GroupCreated(group));
        }
        for group in removed {
            self.emit(HostEvent::GroupRemoved(group));
        }
        Ok(group_id)
    }

    fn query_groups_now(&self, window_id: WindowId) -> HostResult<Vec<TabGroup>> {
        if self.faults.lock().fail_query_groups {
            return Err(HostError::Rejected("Tab groups unavailable".to_string()));
        }
        let state = self.state.lock();
        if !state.windows.contains(&window_id) {
            return Err(HostError::NotFound(format!("No window with id: {}", window_id)));
        }
        Ok(state
            .groups
            .iter()
            .filter(|group| group.window_id == window_id)
            .cloned()
            .collect())
    }

    fn create_menu_item(&self, options: MenuItemOptions) -> HostResult<String> {
        if self.faults.lock().fail_menu_create.contains(&options.id) {
            return Err(HostError::Rejected(format!(
                "Menu item {} could not be created",
                options.id
            )));
        }
        let mut state = self.state.lock();
        if state.menu_item(&options.id).is_some() {
            return Err(HostError::Rejected(format!(
                "Cannot create item with duplicate id {}",
                options.id
            )));
        }
        if let Some(parent) = options.parent_id.as_deref() {
            if state.menu_item(parent).is_none() {
                return Err(HostError::NotFound(format!(
                    "Cannot find menu item with id {}",
                    parent
                )));
            }
        }
        let id = options.id.clone();
        state.menu.push(options);
        Ok(id)
    }

    fn remove_menu_item(&self, id: &str) -> HostResult<()> {
        if self.faults.lock().fail_menu_remove.contains(id) {
            return Err(HostError::Rejected(format!(
                "Menu item {} could not be removed",
                id
            )));
        }
        let mut state = self.state.lock();
        if state.menu_item(id).is_none() {
            return Err(HostError::NotFound(format!(
                "Cannot find menu item with id {}",
                id
            )));
        }
        let mut doomed = vec![id.to_string()];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let current = doomed[cursor].clone();
            doomed.extend(
                state
                    .menu
                    .iter()
                    .filter(|item| item.parent_id.as_deref() == Some(current.as_str()))
                    .map(|item| item.id.clone()),
            );
            cursor += 1;
        }
        state.menu.retain(|item| !doomed.contains(&item.id));
        Ok(())
    }

    fn check_storage(&self) -> HostResult<()> {
        if self.faults.lock().fail_storage {
            return Err(HostError::Storage("storage quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl TabService for MemoryBrowser {
    fn create_tab(&self, properties: CreateTabProperties) -> HostFuture<'_, Tab> {
        Box::pin(async move { self.create_tab_now(properties) })
    }

    fn get_tab(&self, tab_id: TabId) -> HostFuture<'_, Tab> {
        Box::pin(async move { self.get_tab_now(tab_id) })
    }

    fn remove_tab(&self, tab_id: TabId) -> HostFuture<'_, ()> {
        Box::pin(async move { self.remove_tab_now(tab_id) })
    }

    fn group_tabs(&self, options: GroupTabsOptions) -> HostFuture<'_, GroupId> {
        Box::pin(async move { self.group_tabs_now(options) })
    }
}

impl TabGroupService for MemoryBrowser {
    fn query_groups(&self, window_id: WindowId) -> HostFuture<'_, Vec<TabGroup>> {
        Box::pin(async move {
            let gate = self.query_gate.lock().clone();
            if let Some(gate) = gate {
                self.queries_waiting.fetch_add(1, Ordering::SeqCst);
                // Resolves once the gate is closed by `resume_group_queries`.
                let _ = gate.acquire().await;
                self.queries_waiting.fetch_sub(1, Ordering::SeqCst);
            }
            self.query_groups_now(window_id)
        })
    }
}

impl WindowService for MemoryBrowser {
    fn get_all_windows(&self, populate: bool) -> HostFuture<'_, Vec<Window>> {
        Box::pin(async move {
            let state = self.state.lock();
            Ok(state
                .windows
                .iter()
                .enumerate()
                .map(|(index, id)| Window {
                    id: *id,
                    focused: index == 0,
                    tabs: if populate {
                        state
                            .tabs
                            .iter()
                            .filter(|tab| tab.window_id == *id)
                            .cloned()
                            .collect()
                    } else {
                        Vec::new()
                    },
                })
                .collect())
        })
    }
}

impl ContextMenuService for MemoryBrowser {
    fn create(&self, options: MenuItemOptions) -> HostFuture<'_, String> {
        Box::pin(async move { self.create_menu_item(options) })
    }

    fn remove<'a>(&'a self, id: &'a str) -> HostFuture<'a, ()> {
        Box::pin(async move { self.remove_menu_item(id) })
    }

    fn remove_all(&self) -> HostFuture<'_, ()> {
        Box::pin(async move {
            self.state.lock().menu.clear();
            Ok(())
        })
    }
}

impl KeyValueStore for MemoryBrowser {
    fn get<'a>(&'a self, key: &'a str) -> HostFuture<'a, Option<Value>> {
        Box::pin(async move {
            self.check_storage()?;
            Ok::<_, HostError>(self.stored(key))
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: Value) -> HostFuture<'a, ()> {
        Box::pin(async move {
            self.check_storage()?;
            self.seed_value(key, value);
            Ok::<_, HostError>(())
        })
    }
}

impl PermissionService for MemoryBrowser {
    fn contains<'a>(&'a self, permissions: &'a PermissionSet) -> HostFuture<'a, bool> {
        Box::pin(async move {
            let state = self.state.lock();
            Ok(permissions
                .iter()
                .all(|permission| state.granted.contains(permission)))
        })
    }
}

impl EventSource for MemoryBrowser {
    fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MenuContext;

    fn item(id: &str, parent: Option<&str>) -> MenuItemOptions {
        MenuItemOptions {
            id: id.to_string(),
            parent_id: parent.map(str::to_string),
            title: id.to_string(),
            contexts: vec![MenuContext::Link],
        }
    }

    #[tokio::test]
    async fn test_group_tabs_without_target_allocates_group() {
        let browser = MemoryBrowser::new();
        let window = browser.open_window();
        let mut events = browser.subscribe();

        let tab = browser
            .create_tab(CreateTabProperties {
                url: "https://example.com".to_string(),
                active: false,
                window_id: None,
            })
            .await
            .unwrap();
        assert_eq!(tab.window_id, window);
        assert_eq!(tab.group(), None);

        let group_id = browser
            .group_tabs(GroupTabsOptions {
                tab_ids: vec![tab.id],
                group_id: None,
            })
            .await
            .unwrap();
        assert_ne!(group_id, TAB_GROUP_ID_NONE);
        assert_eq!(browser.get_tab(tab.id).await.unwrap().group(), Some(group_id));
        assert!(matches!(events.try_recv(), Ok(HostEvent::GroupCreated(g)) if g.id == group_id));
    }

    #[tokio::test]
    async fn test_declined_grouping_leaves_tab_ungrouped() {
        let browser = MemoryBrowser::new();
        let window = browser.open_window();
        let tab = browser.open_tab(window, "https://example.com").unwrap();
        browser.update_faults(|faults| faults.decline_grouping = true);

        let group_id = browser
            .group_tabs(GroupTabsOptions {
                tab_ids: vec![tab.id],
                group_id: None,
            })
            .await
            .unwrap();
        assert_ne!(group_id, TAB_GROUP_ID_NONE);
        assert_eq!(browser.tab(tab.id).unwrap().group(), None);
        assert!(browser.groups().is_empty());
    }

    #[tokio::test]
    async fn test_removing_last_tab_removes_group() {
        let browser = MemoryBrowser::new();
        let window = browser.open_window();
        let group = browser.create_group(window, Some("Work"), GroupColor::Blue);
        let mut events = browser.subscribe();
        let tab = browser
            .tabs()
            .into_iter()
            .find(|tab| tab.group_id == group.id)
            .unwrap();

        browser.remove_tab(tab.id).await.unwrap();
        assert!(browser.groups().is_empty());
        assert_eq!(events.try_recv(), Ok(HostEvent::GroupRemoved(group)));
        assert!(matches!(
            browser.remove_tab(tab.id).await,
            Err(HostError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_menu_rejects_duplicates_and_orphans() {
        let browser = MemoryBrowser::new();
        browser.create(item("root", None)).await.unwrap();
        assert!(matches!(
            browser.create(item("root", None)).await,
            Err(HostError::Rejected(_))
        ));
        assert!(matches!(
            browser.create(item("leaf", Some("missing"))).await,
            Err(HostError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_menu_remove_takes_children() {
        let browser = MemoryBrowser::new();
        browser.create(item("root", None)).await.unwrap();
        browser.create(item("child", Some("root"))).await.unwrap();
        browser.create(item("grandchild", Some("child"))).await.unwrap();
        browser.create(item("other", None)).await.unwrap();

        browser.remove("root").await.unwrap();
        let ids: Vec<String> = browser.menu_items().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["other".to_string()]);
    }

    #[tokio::test]
    async fn test_click_menu_reports_parent_and_tab() {
        let browser = MemoryBrowser::new();
        let window = browser.open_window();
        let source = browser.open_tab(window, "https://source.test").unwrap();
        browser.create(item("root", None)).await.unwrap();
        browser.create(item("leaf", Some("root"))).await.unwrap();
        let mut events = browser.subscribe();

        browser
            .click_menu("leaf", Some("https://link.test"), Some(source.id))
            .unwrap();
        match events.try_recv().unwrap() {
            HostEvent::MenuClicked { info, tab } => {
                assert_eq!(info.menu_item_id, "leaf");
                assert_eq!(info.parent_menu_item_id.as_deref(), Some("root"));
                assert_eq!(info.link_url.as_deref(), Some("https://link.test"));
                assert_eq!(tab, Some(source));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_permissions_require_every_entry() {
        let browser = MemoryBrowser::new();
        browser.grant(["tabs", "storage"]);
        let partial = PermissionSet::new(["tabs"]);
        let full = PermissionSet::new(["tabs", "storage", "tabGroups"]);
        assert!(browser.contains(&partial).await.unwrap());
        assert!(!browser.contains(&full).await.unwrap());
    }

    #[tokio::test]
    async fn test_paused_queries_wait_for_resume() {
        let browser = Arc::new(MemoryBrowser::new());
        let window = browser.open_window();
        browser.pause_group_queries();

        let task = tokio::spawn({
            let browser = browser.clone();
            async move { browser.query_groups(window).await }
        });
        while browser.waiting_group_queries() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(!task.is_finished());

        browser.resume_group_queries();
        assert_eq!(task.await.unwrap(), Ok(Vec::new()));
    }
}
