//! IAP tunnel lists under "Access Request".

/// A previously used `gcloud` IAP tunnel command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelCommand {
    /// Fourth space-separated token of the command, used as the label.
    pub tag: String,
    pub command: String,
}

/// Parses `AR_IAP_CMDS` (`@`-separated). Commands without a fourth token
/// are skipped.
pub fn parse_previous(raw: &str) -> Vec<TunnelCommand> {
    raw.split('@')
        .map(str::trim)
        .filter(|cmd| !cmd.is_empty())
        .filter_map(|cmd| match cmd.split(' ').nth(3) {
            Some(tag) if !tag.is_empty() => Some(TunnelCommand {
                tag: tag.to_string(),
                command: cmd.to_string(),
            }),
            _ => {
                tracing::debug!(command = cmd, "ignoring malformed IAP command");
                None
            }
        })
        .collect()
}

/// "Start Previous" commands, in config order.
#[derive(Debug, Default)]
pub struct PreviousTunnels {
    items: Vec<TunnelCommand>,
}

impl PreviousTunnels {
    pub fn items(&self) -> &[TunnelCommand] {
        &self.items
    }

    /// Updates from `AR_IAP_CMDS`, falling back to the single `AR_IAP_CMD`.
    /// Returns `true` if the list changed.
    pub fn update(&mut self, cmds: Option<&str>, single: Option<&str>) -> bool {
        let raw = match cmds.map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => single.unwrap_or_default(),
        };
        let items = parse_previous(raw);
        if items == self.items {
            return false;
        }
        self.items = items;
        true
    }
}

/// A tunnel reported by `geo dev open-iap-tunnels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTunnel {
    pub name: String,
    pub port: String,
}

/// Parses `name=port|name=port`. Names shorter than three characters are
/// skipped.
pub fn parse_open(raw: &str) -> Vec<OpenTunnel> {
    raw.split('|')
        .filter_map(|pair| {
            let (name, port) = pair.trim().split_once('=')?;
            let (name, port) = (name.trim(), port.trim());
            (name.len() >= 3 && !port.is_empty()).then(|| OpenTunnel {
                name: name.to_string(),
                port: port.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct OpenTunnels {
    items: Vec<OpenTunnel>,
}

impl OpenTunnels {
    pub const PLACEHOLDER: &'static str = "There are no open IAP tunnels";

    pub fn items(&self) -> &[OpenTunnel] {
        &self.items
    }

    /// Returns `true` if the list changed.
    pub fn update(&mut self, raw: &str) -> bool {
        let items = parse_open(raw);
        if items == self.items {
            return false;
        }
        self.items = items;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMD_A: &str =
        "gcloud compute start-iap-tunnel server-a 22 --local-host-port=localhost:10022";
    const CMD_B: &str =
        "gcloud compute start-iap-tunnel server-b 22 --local-host-port=localhost:10023";

    #[test]
    fn previous_commands_use_fourth_token() {
        let items = parse_previous(&format!("{CMD_A}@{CMD_B}@"));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].tag, "server-a");
        assert_eq!(items[1].command, CMD_B);
    }

    #[test]
    fn malformed_commands_are_skipped() {
        assert!(parse_previous("gcloud compute").is_empty());
        assert!(parse_previous("").is_empty());
    }

    #[test]
    fn single_command_fallback() {
        let mut previous = PreviousTunnels::default();
        assert!(previous.update(Some(""), Some(CMD_A)));
        assert_eq!(previous.items()[0].tag, "server-a");

        assert!(!previous.update(None, Some(CMD_A)));
        assert!(previous.update(Some(format!("{CMD_B}@{CMD_A}").as_str()), Some(CMD_A)));
        assert_eq!(previous.items()[0].tag, "server-b");
    }

    #[test]
    fn open_tunnels_skip_short_names() {
        let items = parse_open("server-a=10022|ab=1|broken|server-b=10023");
        assert_eq!(
            items,
            vec![
                OpenTunnel {
                    name: "server-a".into(),
                    port: "10022".into()
                },
                OpenTunnel {
                    name: "server-b".into(),
                    port: "10023".into()
                },
            ]
        );
    }

    #[test]
    fn open_tunnels_update_only_on_change() {
        let mut open = OpenTunnels::default();
        assert!(!open.update(""));
        assert!(open.update("server-a=10022"));
        assert!(!open.update("server-a=10022"));
        assert!(open.update(""));
        assert!(open.items().is_empty());
    }
}
