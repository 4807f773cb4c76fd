//! System tray model for the geo-cli indicator.
//!
//! The indicator core never touches a GUI toolkit. It describes the menu as a
//! tree of [`MenuNode`] values, resolves the tray icon through
//! [`IconManager`], and talks to whichever backend renders them through
//! channels:
//! - [`TrayEvent`]: events from the tray to the core (menu activations)
//! - [`TrayUpdate`]: updates from the core to the tray (menu, icon)
//!
//! # Backends
//! - [`run_headless`] logs updates; used with `--no-tray` and in tests.
//! - `ksni_backend` (feature `desktop`) exports a StatusNotifierItem over
//!   D-Bus, which GNOME (with the AppIndicator extension) and KDE display.

mod icon;
#[cfg(feature = "desktop")]
pub mod ksni_backend;
mod menu;
mod tray;

pub use icon::{DbState, IconAsset, IconChange, IconManager};
pub use menu::{
    ActionItem, AnalyzerMode, GatewayCommand, MenuAction, MenuBuilder, MenuNode, SubmenuItem,
    ToggleId, ToggleItem,
};
pub use tray::{TrayConfig, TrayEndpoint, TrayEvent, TrayHandle, TrayUpdate, run_headless};
