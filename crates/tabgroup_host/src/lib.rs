//! Browser host contracts for the tab-group link opener.
//!
//! The background process never talks to the browser directly; it goes
//! through the async service traits in [`service`], bundled as
//! [`HostServices`]. Two implementations ship with the crate:
//!
//! - [`memory::MemoryBrowser`], a full in-memory browser used by tests and
//!   the simulator binary.
//! - [`storage::FileStore`], a JSON-file key-value store.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let browser = Arc::new(MemoryBrowser::new());
//! let store = Arc::new(FileStore::open_profile("default")?);
//! let host = HostServices::from_host(browser).with_storage(store);
//!
//! for group in host.all_tab_groups().await? {
//!     println!("{} {:?}", group.id, group.title);
//! }
//! ```

pub mod error;
pub mod memory;
pub mod model;
pub mod service;
pub mod storage;

pub use error::{HostError, HostResult, StorageError, StorageResult};
pub use memory::{Faults, MemoryBrowser};
pub use model::{
    ClickInfo, CreateTabProperties, GroupColor, GroupId, GroupTabsOptions, HostEvent,
    MenuContext, MenuItemOptions, PermissionSet, Tab, TabGroup, TabId, Window, WindowId,
    TAB_GROUP_ID_NONE,
};
pub use service::{
    ContextMenuService, EventSource, HostFuture, HostServices, KeyValueStore, PermissionService,
    TabGroupService, TabService, WindowService,
};
pub use storage::FileStore;
