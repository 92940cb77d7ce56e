//! Terminal browser for users, their snapshots and snapshot fields served by
//! the cortex REST API.

pub mod config;
pub mod fields;
pub mod list;
pub mod nav;
pub mod state;
pub mod theme;
pub mod ui;
pub mod view;

pub use config::{load_config, BrowserConfig, ConfigError};
pub use fields::{Dispatch, FieldError, FieldRegistry, FieldRenderer};
pub use list::{ListContainer, ListEntry};
pub use nav::{FetchOutcome, Level, Navigator, NavigatorSettings, Request, Ticket};
pub use view::{Activation, PanelId, Status, View};
