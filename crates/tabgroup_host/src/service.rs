//! Async contracts for the browser host.
//!
//! Every call returns a boxed future so a service can sit behind
//! `Arc<dyn Trait>` and be swapped between the real host, the in-memory
//! browser, and the file store without the callers becoming generic.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::HostResult;
use crate::model::{
    CreateTabProperties, GroupId, GroupTabsOptions, HostEvent, MenuItemOptions, PermissionSet,
    Tab, TabGroup, TabId, Window, WindowId,
};
use tabgroup_shared::diagnostics;

pub type HostFuture<'a, T> = BoxFuture<'a, HostResult<T>>;

pub trait TabService: Send + Sync {
    fn create_tab(&self, properties: CreateTabProperties) -> HostFuture<'_, Tab>;
    fn get_tab(&self, tab_id: TabId) -> HostFuture<'_, Tab>;
    fn remove_tab(&self, tab_id: TabId) -> HostFuture<'_, ()>;
    /// Groups the tabs and returns the id of the group they ended up in.
    fn group_tabs(&self, options: GroupTabsOptions) -> HostFuture<'_, GroupId>;
}

pub trait TabGroupService: Send + Sync {
    fn query_groups(&self, window_id: WindowId) -> HostFuture<'_, Vec<TabGroup>>;
}

pub trait WindowService: Send + Sync {
    fn get_all_windows(&self, populate: bool) -> HostFuture<'_, Vec<Window>>;
}

pub trait ContextMenuService: Send + Sync {
    /// Creates a menu item and returns its id.
    fn create(&self, options: MenuItemOptions) -> HostFuture<'_, String>;
    fn remove<'a>(&'a self, id: &'a str) -> HostFuture<'a, ()>;
    fn remove_all(&self) -> HostFuture<'_, ()>;
}

pub trait KeyValueStore: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> HostFuture<'a, Option<Value>>;
    fn set<'a>(&'a self, key: &'a str, value: Value) -> HostFuture<'a, ()>;
}

pub trait PermissionService: Send + Sync {
    fn contains<'a>(&'a self, permissions: &'a PermissionSet) -> HostFuture<'a, bool>;
}

pub trait EventSource: Send + Sync {
    /// Starts a new subscription to host notifications.
    fn subscribe(&self) -> broadcast::Receiver<HostEvent>;
}

/// The full set of host services the background process talks to.
#[derive(Clone)]
pub struct HostServices {
    pub tabs: Arc<dyn TabService>,
    pub groups: Arc<dyn TabGroupService>,
    pub windows: Arc<dyn WindowService>,
    pub menus: Arc<dyn ContextMenuService>,
    pub storage: Arc<dyn KeyValueStore>,
    pub permissions: Arc<dyn PermissionService>,
    pub events: Arc<dyn EventSource>,
}

impl HostServices {
    /// Builds the bundle from a single object implementing every service.
    pub fn from_host<T>(host: Arc<T>) -> Self
    where
        T: TabService
            + TabGroupService
            + WindowService
            + ContextMenuService
            + KeyValueStore
            + PermissionService
            + EventSource
            + 'static,
    {
        Self {
            tabs: host.clone(),
            groups: host.clone(),
            windows: host.clone(),
            menus: host.clone(),
            storage: host.clone(),
            permissions: host.clone(),
            events: host,
        }
    }

    /// Replaces the key-value store, e.g. with a file-backed one.
    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = storage;
        self
    }

    /// Every tab group across every window, in host enumeration order.
    pub async fn all_tab_groups(&self) -> HostResult<Vec<TabGroup>> {
        let windows = self.windows.get_all_windows(true).await?;
        let mut all_groups = Vec::new();
        for window in &windows {
            let groups = self.groups.query_groups(window.id).await?;
            all_groups.extend(groups);
        }
        diagnostics::log(format!(
            "all_tab_groups windows={} groups={}",
            windows.len(),
            all_groups.len()
        ));
        Ok(all_groups)
    }
}
