//! StatusNotifierItem backend built on `ksni`.

use tokio::sync::mpsc;

use crate::icon::{IconAsset, IconChange};
use crate::menu::{MenuAction, MenuNode};
use crate::tray::{TrayConfig, TrayEndpoint, TrayEvent, TrayUpdate};

struct GeoTray {
    config: TrayConfig,
    menu: Vec<MenuNode>,
    icon: IconChange,
    events: mpsc::UnboundedSender<TrayEvent>,
}

impl GeoTray {
    fn emit(&self, event: TrayEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("indicator core gone, dropping tray event");
        }
    }
}

fn convert(nodes: &[MenuNode]) -> Vec<ksni::MenuItem<GeoTray>> {
    nodes.iter().map(convert_node).collect()
}

fn convert_node(node: &MenuNode) -> ksni::MenuItem<GeoTray> {
    match node {
        MenuNode::Action(item) => {
            let action = item.action.clone();
            ksni::menu::StandardItem {
                label: item.label.clone(),
                enabled: item.enabled && action.is_some(),
                activate: Box::new(move |tray: &mut GeoTray| {
                    if let Some(action) = &action {
                        tray.emit(TrayEvent::Activated(action.clone()));
                    }
                }),
                ..Default::default()
            }
            .into()
        }
        MenuNode::Toggle(item) => {
            let toggle = item.toggle;
            ksni::menu::CheckmarkItem {
                label: item.label.clone(),
                enabled: item.enabled,
                checked: item.checked,
                activate: Box::new(move |tray: &mut GeoTray| {
                    tray.emit(TrayEvent::Activated(MenuAction::Toggle(toggle)));
                }),
                ..Default::default()
            }
            .into()
        }
        MenuNode::Submenu(item) => ksni::menu::SubMenu {
            label: item.label.clone(),
            enabled: item.enabled,
            submenu: convert(&item.children),
            ..Default::default()
        }
        .into(),
        MenuNode::Separator => ksni::MenuItem::Separator,
    }
}

impl ksni::Tray for GeoTray {
    fn id(&self) -> String {
        self.config.id.clone()
    }

    fn title(&self) -> String {
        self.config.title.clone()
    }

    fn icon_theme_path(&self) -> String {
        self.config.icon_dir.to_string_lossy().into_owned()
    }

    fn icon_name(&self) -> String {
        self.icon.asset.name().to_string()
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            title: self.icon.tooltip.to_string(),
            ..Default::default()
        }
    }

    fn secondary_activate(&mut self, _x: i32, _y: i32) {
        self.emit(TrayEvent::SecondaryActivate);
    }

    fn menu(&self) -> Vec<ksni::MenuItem<Self>> {
        convert(&self.menu)
    }
}

/// Registers the tray on the session bus and pumps updates into it until
/// shutdown. Blocks the calling thread; run it with `spawn_blocking`.
pub fn run(endpoint: TrayEndpoint) {
    let TrayEndpoint {
        config,
        events,
        mut updates,
    } = endpoint;

    let initial = IconAsset::Red;
    let service = ksni::TrayService::new(GeoTray {
        config,
        menu: Vec::new(),
        icon: IconChange {
            asset: initial,
            tooltip: initial.tooltip(),
        },
        events,
    });
    let handle = service.handle();
    service.spawn();
    tracing::info!("tray icon registered");

    while let Some(update) = updates.blocking_recv() {
        match update {
            TrayUpdate::Menu(menu) => handle.update(|tray| tray.menu = menu),
            TrayUpdate::Icon(change) => handle.update(|tray| tray.icon = change),
            TrayUpdate::Shutdown => break,
        }
    }

    handle.shutdown();
    tracing::debug!("tray icon removed");
}
