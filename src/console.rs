//! Line commands for driving the simulated browser by hand.

use std::fmt::Write;

use tabgroup_host::{GroupColor, GroupId, MenuItemOptions, Tab, TabGroup, TabId, WindowId};

pub const HELP: &str = "\
commands:
  window                                  open a browser window
  group <window> <color> [title...]       create a tab group
  rename <group> <title...>               retitle a group
  close-group <group>                     close every tab in a group
  show                                    fire a menu-shown notification
  menu                                    print the context menu tree
  tabs                                    print tabs with their groups
  click <menu-item> <url> [source-tab]    click a menu item on a link
  update                                  run a menu update now
  install                                 rerun the install routine
  settings                                print the effective settings
  suspend                                 suspend the background process
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Window,
    Group {
        window: WindowId,
        color: GroupColor,
        title: Option<String>,
    },
    Rename {
        group: GroupId,
        title: String,
    },
    CloseGroup(GroupId),
    Show,
    Menu,
    Tabs,
    Click {
        item: String,
        link: String,
        source: Option<TabId>,
    },
    Update,
    Install,
    Settings,
    Suspend,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match name {
        "window" => Command::Window,
        "group" => {
            let window = number(rest.first(), "window id")?;
            let color = rest
                .get(1)
                .ok_or_else(|| "missing group color".to_string())?
                .parse::<GroupColor>()?;
            Command::Group {
                window,
                color,
                title: joined(&rest[2.min(rest.len())..]),
            }
        }
        "rename" => {
            let group = number(rest.first(), "group id")?;
            let title = joined(&rest[1.min(rest.len())..])
                .ok_or_else(|| "missing title".to_string())?;
            Command::Rename { group, title }
        }
        "close-group" => Command::CloseGroup(number(rest.first(), "group id")?),
        "show" => Command::Show,
        "menu" => Command::Menu,
        "tabs" => Command::Tabs,
        "click" => {
            let item = rest
                .first()
                .ok_or_else(|| "missing menu item id".to_string())?
                .to_string();
            let link = rest
                .get(1)
                .ok_or_else(|| "missing link url".to_string())?
                .to_string();
            let source = match rest.get(2) {
                Some(_) => Some(number(rest.get(2), "source tab id")?),
                None => None,
            };
            Command::Click { item, link, source }
        }
        "update" => Command::Update,
        "install" => Command::Install,
        "settings" => Command::Settings,
        "suspend" => Command::Suspend,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}', try `help`", other)),
    };
    Ok(Some(command))
}

fn number(word: Option<&&str>, what: &str) -> Result<i64, String> {
    let word = word.ok_or_else(|| format!("missing {}", what))?;
    word.parse::<i64>()
        .map_err(|_| format!("invalid {} '{}'", what, word))
}

fn joined(words: &[&str]) -> Option<String> {
    (!words.is_empty()).then(|| words.join(" "))
}

/// Indented menu tree, children under their parent in creation order.
pub fn render_menu(items: &[MenuItemOptions]) -> String {
    let mut out = String::new();
    if items.is_empty() {
        out.push_str("(menu is empty)\n");
        return out;
    }
    render_children(items, None, 0, &mut out);
    out
}

fn render_children(items: &[MenuItemOptions], parent: Option<&str>, depth: usize, out: &mut String) {
    for item in items.iter().filter(|item| item.parent_id.as_deref() == parent) {
        let _ = writeln!(out, "{}{} [{}]", "  ".repeat(depth), item.title, item.id);
        render_children(items, Some(&item.id), depth + 1, out);
    }
}

pub fn render_tabs(tabs: &[Tab], groups: &[TabGroup]) -> String {
    let mut out = String::new();
    for tab in tabs {
        let group = match tab.group() {
            Some(id) => {
                let label = groups
                    .iter()
                    .find(|group| group.id == id)
                    .map(|group| match group.named_title() {
                        Some(title) => title.to_string(),
                        None => group.color.to_string(),
                    })
                    .unwrap_or_else(|| "?".to_string());
                format!("group {} ({})", id, label)
            }
            None => "ungrouped".to_string(),
        };
        let _ = writeln!(
            out,
            "tab {} window {} {} {}",
            tab.id,
            tab.window_id,
            group,
            tab.url.as_deref().unwrap_or("")
        );
    }
    if out.is_empty() {
        out.push_str("(no tabs)\n");
    }
    out
}
