//! "Open link in tab group" background process.
//!
//! Maintains a context-menu submenu listing every open tab group and opens
//! clicked links in the chosen group:
//!
//! - [`MenuReconciler`] rebuilds the submenu from the live groups, one pass
//!   at a time, with the most recently used group starred and first.
//! - [`TabPlacer`] creates the tab, groups it, and rolls the tab back when
//!   grouping fails.
//! - [`EventDispatcher`] turns host notifications into debounced menu
//!   updates and routes submenu clicks to the placer.
//! - [`Background`] composes the three and runs install/suspend.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let host = HostServices::from_host(browser);
//! let background = Background::new(host, MenuConfig::default());
//! background.start();
//! background.install().await?;
//! ```

pub mod background;
pub mod config;
pub mod debounce;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod last_used;
pub mod mirror;
pub mod placement;
pub mod reconciler;

pub use background::{Background, InstallOutcome, REQUIRED_PERMISSIONS};
pub use config::MenuConfig;
pub use debounce::Debouncer;
pub use dispatcher::{handle_click, EventDispatcher};
pub use error::{PlacementError, PlacementResult};
pub use ids::{group_menu_id, MenuTarget, MENU_GROUP_PREFIX, MENU_NEW_GROUP_ID, MENU_PARENT_ID};
pub use last_used::{LastUsedGroup, LAST_USED_GROUP_KEY};
pub use mirror::{MenuEntry, MenuMirror};
pub use placement::TabPlacer;
pub use reconciler::{entry_title, MenuReconciler, ReconcileOutcome};
