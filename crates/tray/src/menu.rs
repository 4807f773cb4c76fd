//! Menu tree for the tray dropdown.

/// Config-backed check items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleId {
    AutoSwitchDb,
    AutoNpmInstall,
    AutoServerConfig,
    ShowNotifications,
    SortReleaseAware,
    SortDescending,
}

/// Analyzer selection passed to `geo analyze`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerMode {
    All,
    Choose,
    Previous,
}

/// Gateway submenu commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayCommand {
    Start,
    Stop,
    Restart,
    Build,
    BuildSolution,
    Clean,
}

/// Actions that can be triggered from the tray menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    StopDb,
    DbSsh,
    DbPsql,
    /// Copy the named database, or the running one when `None`.
    CopyDb(Option<String>),
    StartDb(String),
    RemoveDb(String),
    CreateDb,
    /// The user clicked a check item.
    Toggle(ToggleId),
    SetDbForRelease,
    MygStart,
    MygBuild,
    Gateway(GatewayCommand),
    RunAnalyzers(AnalyzerMode),
    NpmInstall,
    ConvertIds,
    ConvertIdsFromClipboard,
    RunTests,
    CreateAccessRequest,
    StartNewTunnel,
    /// Re-run a previously used `geo ar tunnel` argument string.
    StartPreviousTunnel(String),
    /// SSH through an open IAP tunnel on the given port.
    SshOverTunnel(String),
    Update,
    ViewReadme,
    Disable,
    Quit,
}

/// A clickable (or disabled informational) item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionItem {
    pub label: String,
    pub enabled: bool,
    pub action: Option<MenuAction>,
}

/// A check item bound to a persisted boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleItem {
    pub label: String,
    pub checked: bool,
    pub enabled: bool,
    pub toggle: ToggleId,
}

/// An item that opens a nested menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmenuItem {
    pub label: String,
    pub enabled: bool,
    pub children: Vec<MenuNode>,
}

/// One node of the menu tree. Hidden items are simply not emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuNode {
    Action(ActionItem),
    Toggle(ToggleItem),
    Submenu(SubmenuItem),
    Separator,
}

impl MenuNode {
    pub fn label(&self) -> Option<&str> {
        match self {
            MenuNode::Action(item) => Some(&item.label),
            MenuNode::Toggle(item) => Some(&item.label),
            MenuNode::Submenu(item) => Some(&item.label),
            MenuNode::Separator => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            MenuNode::Action(item) => item.enabled,
            MenuNode::Toggle(item) => item.enabled,
            MenuNode::Submenu(item) => item.enabled,
            MenuNode::Separator => false,
        }
    }

    pub fn children(&self) -> &[MenuNode] {
        match self {
            MenuNode::Submenu(item) => &item.children,
            _ => &[],
        }
    }

    /// Depth-first search for the first node whose label equals `label`.
    pub fn find<'a>(nodes: &'a [MenuNode], label: &str) -> Option<&'a MenuNode> {
        for node in nodes {
            if node.label() == Some(label) {
                return Some(node);
            }
            if let Some(found) = Self::find(node.children(), label) {
                return Some(found);
            }
        }
        None
    }

    /// Depth-first search for the first node that triggers `action`.
    pub fn find_action<'a>(nodes: &'a [MenuNode], action: &MenuAction) -> Option<&'a MenuNode> {
        for node in nodes {
            if let MenuNode::Action(item) = node
                && item.action.as_ref() == Some(action)
            {
                return Some(node);
            }
            if let Some(found) = Self::find_action(node.children(), action) {
                return Some(found);
            }
        }
        None
    }
}

/// Assembles a `Vec<MenuNode>` in order.
#[derive(Debug, Default)]
pub struct MenuBuilder {
    nodes: Vec<MenuNode>,
}

impl MenuBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(self, label: impl Into<String>, action: MenuAction) -> Self {
        self.action_enabled(label, action, true)
    }

    pub fn action_enabled(
        mut self,
        label: impl Into<String>,
        action: MenuAction,
        enabled: bool,
    ) -> Self {
        self.nodes.push(MenuNode::Action(ActionItem {
            label: label.into(),
            enabled,
            action: Some(action),
        }));
        self
    }

    /// A disabled, informational item.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.nodes.push(MenuNode::Action(ActionItem {
            label: label.into(),
            enabled: false,
            action: None,
        }));
        self
    }

    pub fn toggle(mut self, label: impl Into<String>, toggle: ToggleId, checked: bool) -> Self {
        self.nodes.push(MenuNode::Toggle(ToggleItem {
            label: label.into(),
            checked,
            enabled: true,
            toggle,
        }));
        self
    }

    pub fn submenu(
        self,
        label: impl Into<String>,
        build: impl FnOnce(MenuBuilder) -> MenuBuilder,
    ) -> Self {
        self.submenu_enabled(label, true, build)
    }

    pub fn submenu_enabled(
        mut self,
        label: impl Into<String>,
        enabled: bool,
        build: impl FnOnce(MenuBuilder) -> MenuBuilder,
    ) -> Self {
        self.nodes.push(MenuNode::Submenu(SubmenuItem {
            label: label.into(),
            enabled,
            children: build(MenuBuilder::new()).build(),
        }));
        self
    }

    pub fn separator(mut self) -> Self {
        self.nodes.push(MenuNode::Separator);
        self
    }

    /// Appends a prebuilt node.
    pub fn node(mut self, node: MenuNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Applies `f` only when `condition` holds.
    pub fn when(self, condition: bool, f: impl FnOnce(MenuBuilder) -> MenuBuilder) -> Self {
        if condition { f(self) } else { self }
    }

    pub fn build(self) -> Vec<MenuNode> {
        self.nodes
    }
}
