//! System tray icon and menu.

use anyhow::Context;
use micbuddy_core::{APP_NAME_PRETTY, Status};
use tracing::warn;
use tray_icon::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::{TrayIcon, TrayIconBuilder};

use crate::coordinator::Indicators;
use crate::icon::status_icon;

/// Menu entries the user can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ResetPosition,
    CopyConfigPath,
    Quit,
}

pub struct Tray {
    menu: Menu,
    connection: MenuItem,
    mic: MenuItem,
    reset_position: MenuItem,
    copy_config: MenuItem,
    quit: MenuItem,
    icon: Option<TrayIcon>,
    status: Status,
}

impl Tray {
    /// Builds the menu. The icon itself is created later by [`Tray::show`].
    pub fn new() -> anyhow::Result<Self> {
        let status = Status::default();
        let connection = MenuItem::new(status.connection_text(), false, None);
        let mic = MenuItem::new(status.mic_text(), false, None);
        let reset_position = MenuItem::new("Reset Position", true, None);
        let copy_config = MenuItem::new("Copy config path", true, None);
        let quit = MenuItem::new("Quit", true, None);

        let menu = Menu::new();
        menu.append_items(&[
            // the name of the app
            &MenuItem::new(APP_NAME_PRETTY, false, None),
            &PredefinedMenuItem::separator(),
            &connection,
            &mic,
            &PredefinedMenuItem::separator(),
            &reset_position,
            &copy_config,
            &PredefinedMenuItem::separator(),
            &quit,
        ])
        .context("Failed to build tray menu")?;

        Ok(Self {
            menu,
            connection,
            mic,
            reset_position,
            copy_config,
            quit,
            icon: None,
            status,
        })
    }

    /// Creates the tray icon. Must run once the event loop is running.
    pub fn show(&mut self) -> anyhow::Result<()> {
        let icon = TrayIconBuilder::new()
            .with_menu(Box::new(self.menu.clone()))
            .with_tooltip(APP_NAME_PRETTY)
            .with_icon(status_icon(self.status.live)?)
            .build()
            .context("Failed to create tray icon")?;
        self.icon = Some(icon);
        Ok(())
    }

    pub fn hide(&mut self) {
        self.icon.take();
    }

    pub fn action(&self, event: &MenuEvent) -> Option<MenuAction> {
        let id = event.id();
        if id == self.reset_position.id() {
            Some(MenuAction::ResetPosition)
        } else if id == self.copy_config.id() {
            Some(MenuAction::CopyConfigPath)
        } else if id == self.quit.id() {
            Some(MenuAction::Quit)
        } else {
            None
        }
    }
}

impl Indicators for Tray {
    fn update(&mut self, status: Status) {
        self.connection.set_text(status.connection_text());
        self.mic.set_text(status.mic_text());

        let tint_changed = status.live != self.status.live;
        self.status = status;
        if !tint_changed {
            return;
        }
        if let Some(icon) = &self.icon {
            let result = status_icon(status.live).and_then(|image| {
                icon.set_icon(Some(image)).context("Failed to set tray icon")
            });
            if let Err(e) = result {
                warn!("Failed to update tray icon: {:#}", e);
            }
        }
    }
}
