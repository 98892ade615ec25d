//! Composition root of the background process.
//!
//! Wires one reconciler, one placer, and one dispatcher over a shared
//! [`HostServices`] bundle, and runs the install and suspend routines.

use std::sync::Arc;

use tabgroup_host::{HostResult, HostServices, PermissionSet};
use tabgroup_shared::diagnostics;

use crate::config::MenuConfig;
use crate::dispatcher::EventDispatcher;
use crate::placement::TabPlacer;
use crate::reconciler::{MenuReconciler, ReconcileOutcome};

/// Host permissions the process cannot work without.
pub const REQUIRED_PERMISSIONS: [&str; 4] = ["tabs", "contextMenus", "tabGroups", "storage"];

pub const INSTALL_REASON: &str = "onInstalled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(ReconcileOutcome),
    /// Nothing was touched.
    MissingPermissions,
}

pub struct Background {
    host: HostServices,
    reconciler: Arc<MenuReconciler>,
    dispatcher: EventDispatcher,
}

impl Background {
    pub fn new(host: HostServices, config: MenuConfig) -> Self {
        let reconciler = Arc::new(MenuReconciler::new(host.clone(), config));
        let placer = Arc::new(TabPlacer::new(host.clone(), reconciler.clone()));
        let dispatcher = EventDispatcher::new(host.events.clone(), reconciler.clone(), placer);
        Self {
            host,
            reconciler,
            dispatcher,
        }
    }

    pub fn reconciler(&self) -> &Arc<MenuReconciler> {
        &self.reconciler
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Registers the host event listeners.
    pub fn start(&self) -> bool {
        self.dispatcher.register()
    }

    pub async fn check_permissions(&self) -> bool {
        let required = PermissionSet::new(REQUIRED_PERMISSIONS);
        match self.host.permissions.contains(&required).await {
            Ok(true) => true,
            Ok(false) => {
                diagnostics::error(format!(
                    "permissions_missing required={}",
                    REQUIRED_PERMISSIONS.join(",")
                ));
                false
            }
            Err(err) => {
                diagnostics::error(format!("permission_check_failed error={}", err));
                false
            }
        }
    }

    /// Resets the menu to its permanent entries and fills in the groups.
    pub async fn install(&self) -> HostResult<InstallOutcome> {
        if !self.check_permissions().await {
            return Ok(InstallOutcome::MissingPermissions);
        }
        self.reconciler.install_permanent_entries().await?;
        let outcome = self.reconciler.reconcile(INSTALL_REASON).await;
        diagnostics::log(format!("background_installed outcome={:?}", outcome));
        Ok(InstallOutcome::Installed(outcome))
    }

    /// Stops listening, drops pending updates, and clears the menu.
    pub async fn suspend(&self) {
        diagnostics::log("background_suspending");
        self.dispatcher.deregister();
        if let Err(err) = self.reconciler.clear_menu().await {
            diagnostics::error(format!("menu_clear_failed error={}", err));
        }
    }
}
