mod console;
mod settings;

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use tabgroup_host::{FileStore, HostResult, HostServices, MemoryBrowser, TabId};
use tabgroup_menu::{Background, InstallOutcome, REQUIRED_PERMISSIONS};
use tabgroup_shared::{diagnostics, paths};

use crate::console::Command;
use crate::settings::AppSettings;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args();
    let mut settings = AppSettings::load();
    if let Some(profile) = args.profile {
        settings.profile = profile;
    }
    diagnostics::set_enabled(settings.debug || args.debug);

    let store = FileStore::open_profile(settings.profile.clone())
        .with_context(|| format!("failed to open storage profile '{}'", settings.profile))?;
    let browser = Arc::new(MemoryBrowser::new());
    browser.grant(REQUIRED_PERMISSIONS);
    let window = browser.open_window();
    let host = HostServices::from_host(browser.clone()).with_storage(Arc::new(store));

    let background = Background::new(host, settings.menu.clone());
    background.start();
    if let InstallOutcome::MissingPermissions = background.install().await? {
        bail!("required permissions not granted: {}", REQUIRED_PERMISSIONS.join(", "));
    }
    diagnostics::log(format!(
        "simulator_start profile={} storage={}",
        settings.profile,
        paths::profile_dir(&settings.profile).display()
    ));
    println!(
        "tabgroup-linker ready, window {} open. Type `help` for commands.",
        window
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match console::parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };
        if !run_command(&browser, &background, &settings, command).await {
            break;
        }
    }

    background.suspend().await;
    diagnostics::log("simulator_exit");
    Ok(())
}

struct Args {
    profile: Option<String>,
    debug: bool,
}

fn parse_args() -> Args {
    let mut profile = None;
    let mut debug = false;
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--profile" => profile = iter.next(),
            "--debug" => debug = true,
            _ => {}
        }
    }
    Args { profile, debug }
}

/// Runs one command. Returns false when the loop should stop.
async fn run_command(
    browser: &MemoryBrowser,
    background: &Background,
    settings: &AppSettings,
    command: Command,
) -> bool {
    match command {
        Command::Window => println!("opened window {}", browser.open_window()),
        Command::Group {
            window,
            color,
            title,
        } => {
            let group = browser.create_group(window, title.as_deref(), color);
            println!("created group {} in window {}", group.id, group.window_id);
        }
        Command::Rename { group, title } => report(
            browser
                .update_group(group, Some(title), None)
                .map(|group| format!("renamed group {}", group.id)),
        ),
        Command::CloseGroup(group) => report(
            browser
                .close_group(group)
                .map(|group| format!("closed group {}", group.id)),
        ),
        Command::Show => browser.show_menu(),
        Command::Menu => print!("{}", console::render_menu(&browser.menu_items())),
        Command::Tabs => print!(
            "{}",
            console::render_tabs(&browser.tabs(), &browser.groups())
        ),
        Command::Click { item, link, source } => {
            let result = match source {
                Some(tab_id) => Ok(tab_id),
                None => default_source_tab(browser),
            };
            report(result.and_then(|tab_id| {
                browser
                    .click_menu(&item, Some(&link), Some(tab_id))
                    .map(|()| format!("clicked {} from tab {}", item, tab_id))
            }));
        }
        Command::Update => {
            let outcome = background.reconciler().reconcile("console").await;
            println!("{:?}", outcome);
        }
        Command::Install => {
            background.start();
            match background.install().await {
                Ok(outcome) => println!("{:?}", outcome),
                Err(err) => eprintln!("install failed: {}", err),
            }
        }
        Command::Settings => match settings.to_toml() {
            Ok(text) => print!("{}", text),
            Err(err) => eprintln!("{}", err),
        },
        Command::Suspend => {
            background.suspend().await;
            println!("suspended; `install` brings the menu back");
        }
        Command::Help => println!("{}", console::HELP),
        Command::Quit => return false,
    }
    true
}

/// A tab in the first window to click from, opening one if the window is empty.
fn default_source_tab(browser: &MemoryBrowser) -> HostResult<TabId> {
    let windows = browser.windows();
    let Some(window) = windows.first().copied() else {
        return Ok(browser.open_tab(browser.open_window(), "about:newtab")?.id);
    };
    match browser.tabs().into_iter().find(|tab| tab.window_id == window) {
        Some(tab) => Ok(tab.id),
        None => Ok(browser.open_tab(window, "about:newtab")?.id),
    }
}

fn report(result: HostResult<String>) {
    match result {
        Ok(message) => println!("{}", message),
        Err(err) => eprintln!("error: {}", err),
    }
}
