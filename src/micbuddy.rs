use std::time::Instant;

use anyhow::Result;
use arboard::Clipboard;
use micbuddy::coordinator::Coordinator;
use micbuddy::event::MicBuddyEvent;
use micbuddy::overlay::Overlay;
use micbuddy::tray::{MenuAction, Tray};
use micbuddy::watcher::ObsWatcher;
use micbuddy::{Config, ConfigManager, DEFAULT_LOG_LEVEL, FRAME_INTERVAL, VERSION};
use tao::event::{Event, StartCause};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tray_icon::menu::MenuEvent;

fn main() -> Result<()> {
    // Initialize the logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MICBUDDY_LOG")
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        )
        .init();

    // Load config
    let config_manager = ConfigManager::new()?;
    let mut config = config_manager.load()?;
    // save back the config to create the file if it doesn't exist
    config_manager.save(&config)?;

    let mut clipboard = Clipboard::new()?;

    // Set up the event loop and the windows it owns
    let event_loop: EventLoop<MicBuddyEvent> = EventLoopBuilder::with_user_event().build();
    let event_sender = event_loop.create_proxy();

    let mut overlay = Overlay::new(&event_loop, &config)?;
    if config.position().is_none() {
        if let Some((x, y)) = overlay.reset_position() {
            save_position(&config_manager, &mut config, x, y);
        }
    }

    let overlay_id = overlay.window_id();
    let mut coordinator = Coordinator::new(overlay, Tray::new()?);
    let menu_channel = MenuEvent::receiver();

    // OBS polling runs on its own runtime and reports through the proxy
    let mut watcher = Some(ObsWatcher::start(&config, event_sender)?);

    let mut next_frame = Instant::now() + FRAME_INTERVAL;

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::NewEvents(StartCause::Init) => {
                // We create the icon once the event loop is actually running
                // to prevent issues like https://github.com/tauri-apps/tray-icon/issues/90
                if let Err(e) = coordinator.indicators().show() {
                    error!("{:#}", e);
                }

                // We have to request a redraw here to have the icon actually show up.
                // Tao only exposes a redraw method on the Window so we use core-foundation directly.
                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};

                    let rl = CFRunLoopGetMain();
                    CFRunLoopWakeUp(rl);
                }

                info!(version = VERSION, "Mic Buddy ready");
            }
            Event::UserEvent(event) => coordinator.handle(event),
            Event::WindowEvent {
                window_id, event, ..
            } if window_id == overlay_id => {
                if let Some((x, y)) = coordinator.overlay().handle_window_event(&event) {
                    save_position(&config_manager, &mut config, x, y);
                }
            }
            Event::RedrawRequested(_) => {
                if let Err(e) = coordinator.overlay().redraw() {
                    warn!("Failed to draw overlay: {:#}", e);
                }
            }
            _ => {}
        }

        if let Ok(event) = menu_channel.try_recv() {
            match coordinator.indicators().action(&event) {
                Some(MenuAction::ResetPosition) => {
                    if let Some((x, y)) = coordinator.overlay().reset_position() {
                        save_position(&config_manager, &mut config, x, y);
                    }
                }
                Some(MenuAction::CopyConfigPath) => {
                    if let Err(e) =
                        clipboard.set_text(config_manager.config_path().to_string_lossy().into_owned())
                    {
                        error!("Failed to copy config path to clipboard: {}", e);
                    }
                }
                Some(MenuAction::Quit) => {
                    if let Some(watcher) = watcher.take() {
                        watcher.stop();
                    }
                    coordinator.indicators().hide();
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                None => {}
            }
        }

        // Fixed-rate animation tick
        let now = Instant::now();
        if now >= next_frame {
            if let Err(e) = coordinator.overlay().frame() {
                warn!("Failed to draw overlay: {:#}", e);
            }
            next_frame += FRAME_INTERVAL;
            if next_frame <= now {
                // fell behind, skip the missed frames
                next_frame = now + FRAME_INTERVAL;
            }
        }
        *control_flow = ControlFlow::WaitUntil(next_frame);
    });
}

fn save_position(config_manager: &ConfigManager, config: &mut Config, x: i32, y: i32) {
    config.set_position(x, y);
    if let Err(e) = config_manager.save(config) {
        warn!("Failed to save overlay position: {:#}", e);
    }
}
