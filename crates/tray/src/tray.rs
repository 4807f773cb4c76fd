//! Tray handle, events, and update types.
//!
//! The indicator core owns a [`TrayHandle`]; the rendering backend owns the
//! matching [`TrayEndpoint`]. Both sides only exchange values over channels,
//! so the core never blocks on the GUI and can be driven in tests without
//! one.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::icon::IconChange;
use crate::menu::{MenuAction, MenuNode};

/// Configuration for the system tray.
#[derive(Debug, Clone)]
pub struct TrayConfig {
    /// Application id registered with the status notifier host.
    pub id: String,
    /// Title shown by hosts that display one.
    pub title: String,
    /// Directory holding the icon assets.
    pub icon_dir: PathBuf,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            id: "geo.indicator".into(),
            title: "geo-cli".into(),
            icon_dir: PathBuf::from("res"),
        }
    }
}

/// Events emitted by the tray to the indicator core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayEvent {
    /// A menu item was clicked.
    Activated(MenuAction),
    /// The icon was middle-clicked.
    SecondaryActivate,
}

/// Updates sent from the indicator core to the tray.
#[derive(Debug, Clone, PartialEq)]
pub enum TrayUpdate {
    /// Replace the whole menu.
    Menu(Vec<MenuNode>),
    /// Swap the icon.
    Icon(IconChange),
    /// Request tray shutdown.
    Shutdown,
}

/// Backend side of the tray channels.
#[derive(Debug)]
pub struct TrayEndpoint {
    pub config: TrayConfig,
    pub events: mpsc::UnboundedSender<TrayEvent>,
    pub updates: mpsc::UnboundedReceiver<TrayUpdate>,
}

/// Core side of the tray channels.
pub struct TrayHandle {
    update_tx: mpsc::UnboundedSender<TrayUpdate>,
    event_rx: mpsc::UnboundedReceiver<TrayEvent>,
    menu: Option<Vec<MenuNode>>,
    icon: Option<IconChange>,
}

impl TrayHandle {
    /// Creates a handle and the endpoint to give to a backend.
    pub fn new(config: TrayConfig) -> (Self, TrayEndpoint) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let handle = Self {
            update_tx,
            event_rx,
            menu: None,
            icon: None,
        };
        let endpoint = TrayEndpoint {
            config,
            events: event_tx,
            updates: update_rx,
        };
        (handle, endpoint)
    }

    /// Sends `menu` to the backend unless it equals the last one sent.
    ///
    /// Returns `true` when an update was sent.
    pub fn set_menu(&mut self, menu: Vec<MenuNode>) -> bool {
        if self.menu.as_ref() == Some(&menu) {
            return false;
        }
        self.menu = Some(menu.clone());
        self.send(TrayUpdate::Menu(menu));
        true
    }

    pub fn set_icon(&mut self, change: IconChange) {
        self.icon = Some(change);
        self.send(TrayUpdate::Icon(change));
    }

    /// Requests the backend to shut down.
    pub fn shutdown(&self) {
        self.send(TrayUpdate::Shutdown);
    }

    /// Waits for the next tray event; `None` once the backend is gone.
    pub async fn recv_event(&mut self) -> Option<TrayEvent> {
        self.event_rx.recv().await
    }

    /// Tries to receive a tray event (non-blocking).
    pub fn try_recv_event(&mut self) -> Option<TrayEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Last menu sent to the backend.
    pub fn menu(&self) -> Option<&[MenuNode]> {
        self.menu.as_deref()
    }

    /// Last icon sent to the backend.
    pub fn icon(&self) -> Option<IconChange> {
        self.icon
    }

    fn send(&self, update: TrayUpdate) {
        if self.update_tx.send(update).is_err() {
            tracing::debug!("tray backend gone, dropping update");
        }
    }
}

/// Backend that only logs updates. Returns on shutdown or when the core
/// drops its handle.
pub async fn run_headless(mut endpoint: TrayEndpoint) {
    tracing::info!(id = %endpoint.config.id, "running without a tray icon");
    while let Some(update) = endpoint.updates.recv().await {
        match update {
            TrayUpdate::Menu(menu) => tracing::debug!(items = menu.len(), "menu updated"),
            TrayUpdate::Icon(change) => {
                tracing::info!(icon = change.asset.name(), "{}", change.tooltip)
            }
            TrayUpdate::Shutdown => break,
        }
    }
    tracing::debug!("headless tray stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::{DbState, IconManager};
    use crate::menu::MenuBuilder;

    #[test]
    fn tray_config_default() {
        let config = TrayConfig::default();
        assert_eq!(config.id, "geo.indicator");
        assert_eq!(config.title, "geo-cli");
    }

    #[test]
    fn identical_menus_are_sent_once() {
        let (mut handle, mut endpoint) = TrayHandle::new(TrayConfig::default());
        let menu = MenuBuilder::new().action("Quit", MenuAction::Quit).build();

        assert!(handle.set_menu(menu.clone()));
        assert!(!handle.set_menu(menu.clone()));
        assert!(matches!(endpoint.updates.try_recv(), Ok(TrayUpdate::Menu(_))));
        assert!(endpoint.updates.try_recv().is_err());
        assert_eq!(handle.menu(), Some(menu.as_slice()));
    }

    #[test]
    fn icon_updates_are_forwarded() {
        let (mut handle, mut endpoint) = TrayHandle::new(TrayConfig::default());
        let mut icons = IconManager::new();
        let change = icons.set_db_state(DbState::DbRunning).unwrap();

        handle.set_icon(change);
        assert_eq!(endpoint.updates.try_recv().unwrap(), TrayUpdate::Icon(change));
        assert_eq!(handle.icon(), Some(change));
    }

    #[test]
    fn events_flow_from_backend_to_core() {
        let (mut handle, endpoint) = TrayHandle::new(TrayConfig::default());
        assert!(handle.try_recv_event().is_none());

        endpoint
            .events
            .send(TrayEvent::Activated(MenuAction::Quit))
            .unwrap();
        assert_eq!(handle.try_recv_event(), Some(TrayEvent::Activated(MenuAction::Quit)));
    }

    #[tokio::test]
    async fn headless_backend_stops_on_shutdown() {
        let (mut handle, endpoint) = TrayHandle::new(TrayConfig::default());
        let task = tokio::spawn(run_headless(endpoint));

        handle.set_menu(MenuBuilder::new().separator().build());
        handle.shutdown();
        task.await.unwrap();

        // The endpoint (and its event sender) is gone with the backend.
        assert_eq!(handle.recv_event().await, None);
    }
}
