//! Routes host notifications to the reconciler and the tab placer.
//!
//! Every notification schedules a debounced menu update. Clicks on a leaf of
//! the "Open in Tab Group" submenu are also handed to the [`TabPlacer`].

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use tabgroup_host::{ClickInfo, EventSource, HostEvent, Tab};
use tabgroup_shared::diagnostics;

use crate::debounce::Debouncer;
use crate::ids::MENU_PARENT_ID;
use crate::placement::TabPlacer;
use crate::reconciler::MenuReconciler;

pub struct EventDispatcher {
    events: Arc<dyn EventSource>,
    router: EventRouter,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl EventDispatcher {
    pub fn new(
        events: Arc<dyn EventSource>,
        reconciler: Arc<MenuReconciler>,
        placer: Arc<TabPlacer>,
    ) -> Self {
        let debouncer = Arc::new(Debouncer::new(reconciler.config().debounce()));
        Self {
            events,
            router: EventRouter {
                reconciler,
                placer,
                debouncer,
            },
            listener: Mutex::new(None),
        }
    }

    /// Starts listening. A second call while registered only logs a warning.
    pub fn register(&self) -> bool {
        let mut listener = self.listener.lock();
        if listener.is_some() {
            diagnostics::warn("event_listeners_already_registered");
            return false;
        }
        // Subscribe before spawning so nothing fired after `register` is missed.
        let receiver = self.events.subscribe();
        let router = self.router.clone();
        *listener = Some(tokio::spawn(router.run(receiver)));
        diagnostics::log("event_listeners_registered");
        true
    }

    /// Stops listening and drops any update still waiting out its delay.
    pub fn deregister(&self) -> bool {
        let Some(listener) = self.listener.lock().take() else {
            return false;
        };
        listener.abort();
        self.router.debouncer.cancel();
        diagnostics::log("event_listeners_removed");
        true
    }

    pub fn is_registered(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Schedules a menu update after the quiet period.
    pub fn request_update(&self, reason: &str) {
        self.router.request_update(reason);
    }

    pub fn update_pending(&self) -> bool {
        self.router.debouncer.is_pending()
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.abort();
        }
    }
}

#[derive(Clone)]
struct EventRouter {
    reconciler: Arc<MenuReconciler>,
    placer: Arc<TabPlacer>,
    debouncer: Arc<Debouncer>,
}

impl EventRouter {
    async fn run(self, mut receiver: broadcast::Receiver<HostEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route(event),
                Err(RecvError::Lagged(skipped)) => {
                    diagnostics::warn(format!("host_events_lagged skipped={}", skipped));
                    self.request_update("lagged");
                }
                Err(RecvError::Closed) => {
                    diagnostics::log("host_events_closed");
                    break;
                }
            }
        }
    }

    fn route(&self, event: HostEvent) {
        let reason = event.name();
        diagnostics::log(format!("host_event name={}", reason));
        if let HostEvent::MenuClicked { info, tab } = event {
            if info.parent_menu_item_id.as_deref() == Some(MENU_PARENT_ID) {
                let placer = self.placer.clone();
                tokio::spawn(async move {
                    handle_click(&placer, info, tab).await;
                });
            }
        }
        self.request_update(reason);
    }

    fn request_update(&self, reason: &str) {
        let reconciler = self.reconciler.clone();
        let reason = reason.to_string();
        self.debouncer.schedule(async move {
            reconciler.reconcile(&reason).await;
        });
    }
}

/// Handles one submenu click. Failures are logged here and go no further.
pub async fn handle_click(placer: &TabPlacer, info: ClickInfo, tab: Option<Tab>) -> Option<Tab> {
    let Some(tab) = tab else {
        diagnostics::error(format!(
            "menu_click_rejected item={} reason=no_source_tab",
            info.menu_item_id
        ));
        return None;
    };
    if tab.window_id <= 0 {
        diagnostics::error(format!(
            "menu_click_rejected item={} reason=no_source_window",
            info.menu_item_id
        ));
        return None;
    }
    let Some(link_url) = info.link_url.as_deref() else {
        diagnostics::error(format!(
            "menu_click_rejected item={} reason=no_link_url",
            info.menu_item_id
        ));
        return None;
    };

    match placer
        .place_link(link_url, tab.window_id, &info.menu_item_id)
        .await
    {
        Ok(placed) => Some(placed),
        Err(err) => {
            diagnostics::error(format!(
                "menu_click_failed item={} error={}",
                info.menu_item_id, err
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tabgroup_host::{GroupColor, HostServices, MemoryBrowser, WindowId};

    use crate::config::MenuConfig;
    use crate::ids::{group_menu_id, MENU_NEW_GROUP_ID};

    struct Fixture {
        browser: Arc<MemoryBrowser>,
        window: WindowId,
        placer: Arc<TabPlacer>,
        dispatcher: EventDispatcher,
    }

    async fn fixture() -> Fixture {
        let browser = Arc::new(MemoryBrowser::new());
        let window = browser.open_window();
        let host = HostServices::from_host(browser.clone());
        let reconciler = Arc::new(MenuReconciler::new(host.clone(), MenuConfig::default()));
        reconciler.install_permanent_entries().await.unwrap();
        let placer = Arc::new(TabPlacer::new(host.clone(), reconciler.clone()));
        let dispatcher = EventDispatcher::new(host.events.clone(), reconciler, placer.clone());
        Fixture {
            browser,
            window,
            placer,
            dispatcher,
        }
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn submenu_ids(browser: &MemoryBrowser) -> Vec<String> {
        browser
            .menu_children(MENU_PARENT_ID)
            .into_iter()
            .map(|item| item.id)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_is_idempotent() {
        let fx = fixture().await;
        assert!(fx.dispatcher.register());
        assert!(!fx.dispatcher.register());
        assert!(fx.dispatcher.is_registered());

        assert!(fx.dispatcher.deregister());
        assert!(!fx.dispatcher.deregister());
        assert!(fx.dispatcher.register());
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_burst_coalesces_into_one_update() {
        let fx = fixture().await;
        fx.dispatcher.register();
        settle().await;

        let a = fx.browser.create_group(fx.window, Some("A"), GroupColor::Red);
        let b = fx.browser.create_group(fx.window, Some("B"), GroupColor::Blue);
        fx.browser.update_group(a.id, Some("A2".to_string()), None).unwrap();
        settle().await;
        assert!(fx.dispatcher.update_pending());
        assert_eq!(submenu_ids(&fx.browser), vec![MENU_NEW_GROUP_ID.to_string()]);

        tokio::time::sleep(Duration::from_millis(499)).await;
        settle().await;
        assert_eq!(submenu_ids(&fx.browser), vec![MENU_NEW_GROUP_ID.to_string()]);

        tokio::time::sleep(Duration::from_millis(10)).await;
        settle().await;
        assert_eq!(
            submenu_ids(&fx.browser),
            vec![
                MENU_NEW_GROUP_ID.to_string(),
                group_menu_id(a.id),
                group_menu_id(b.id)
            ]
        );
        let titles: Vec<String> = fx
            .browser
            .menu_children(MENU_PARENT_ID)
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert_eq!(titles[1], "A2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_update_without_listeners() {
        let fx = fixture().await;
        let group = fx.browser.create_group(fx.window, Some("A"), GroupColor::Red);

        fx.dispatcher.request_update("manual");
        assert!(fx.dispatcher.update_pending());
        tokio::time::sleep(Duration::from_millis(600)).await;
        settle().await;
        assert_eq!(
            submenu_ids(&fx.browser),
            vec![MENU_NEW_GROUP_ID.to_string(), group_menu_id(group.id)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deregister_cancels_pending_update() {
        let fx = fixture().await;
        fx.dispatcher.register();
        settle().await;

        fx.browser.create_group(fx.window, Some("A"), GroupColor::Red);
        settle().await;
        assert!(fx.dispatcher.update_pending());
        fx.dispatcher.deregister();

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(submenu_ids(&fx.browser), vec![MENU_NEW_GROUP_ID.to_string()]);

        // Events after deregistration are ignored.
        fx.browser.create_group(fx.window, Some("B"), GroupColor::Blue);
        settle().await;
        assert!(!fx.dispatcher.update_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submenu_click_places_link() {
        let fx = fixture().await;
        fx.dispatcher.register();
        settle().await;
        let source = fx.browser.open_tab(fx.window, "https://source.test").unwrap();

        fx.browser
            .click_menu(MENU_NEW_GROUP_ID, Some("https://link.test"), Some(source.id))
            .unwrap();
        settle().await;

        let placed = fx
            .browser
            .tabs()
            .into_iter()
            .find(|tab| tab.url.as_deref() == Some("https://link.test"))
            .unwrap();
        assert!(placed.group().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clicks_outside_submenu_are_ignored() {
        let fx = fixture().await;
        fx.dispatcher.register();
        settle().await;
        let source = fx.browser.open_tab(fx.window, "https://source.test").unwrap();

        fx.browser
            .click_menu(MENU_PARENT_ID, Some("https://link.test"), Some(source.id))
            .unwrap();
        settle().await;
        assert_eq!(fx.browser.tabs().len(), 1);
        // The click still counts as menu activity.
        assert!(fx.dispatcher.update_pending());
    }

    #[tokio::test]
    async fn test_handle_click_rejects_incomplete_clicks() {
        let fx = fixture().await;
        let source = fx.browser.open_tab(fx.window, "https://source.test").unwrap();
        let info = ClickInfo {
            menu_item_id: MENU_NEW_GROUP_ID.to_string(),
            parent_menu_item_id: Some(MENU_PARENT_ID.to_string()),
            link_url: Some("https://link.test".to_string()),
        };

        assert_eq!(handle_click(&fx.placer, info.clone(), None).await, None);

        for window_id in [-1, 0] {
            let mut windowless = source.clone();
            windowless.window_id = window_id;
            assert_eq!(
                handle_click(&fx.placer, info.clone(), Some(windowless)).await,
                None
            );
        }

        let no_link = ClickInfo {
            link_url: None,
            ..info.clone()
        };
        assert_eq!(handle_click(&fx.placer, no_link, Some(source.clone())).await, None);
        assert_eq!(fx.browser.tabs().len(), 1);

        let placed = handle_click(&fx.placer, info, Some(source)).await;
        assert!(placed.is_some_and(|tab| tab.group().is_some()));
    }

    #[tokio::test]
    async fn test_handle_click_swallows_placement_errors() {
        let fx = fixture().await;
        let source = fx.browser.open_tab(fx.window, "https://source.test").unwrap();
        let info = ClickInfo {
            menu_item_id: group_menu_id(404),
            parent_menu_item_id: Some(MENU_PARENT_ID.to_string()),
            link_url: Some("https://link.test".to_string()),
        };
        assert_eq!(handle_click(&fx.placer, info, Some(source)).await, None);
        assert_eq!(fx.browser.tabs().len(), 1);
    }
}
