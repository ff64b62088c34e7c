//! Applies connection events to the overlay and the tray.
//!
//! Events arrive on the UI thread through the event loop proxy, so the
//! overlay's animation state is only ever touched from the thread that
//! renders it.

use micbuddy_core::Status;
use tracing::info;

use crate::event::MicBuddyEvent;

/// The face window, as seen by the coordinator.
pub trait OverlayControl {
    fn show(&mut self);
    fn hide(&mut self);
    fn set_live(&mut self, live: bool);
}

/// Tray icon tint and status lines.
pub trait Indicators {
    fn update(&mut self, status: Status);
}

pub struct Coordinator<O, I> {
    overlay: O,
    indicators: I,
    status: Status,
}

impl<O: OverlayControl, I: Indicators> Coordinator<O, I> {
    pub fn new(overlay: O, indicators: I) -> Self {
        Self {
            overlay,
            indicators,
            status: Status::default(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn overlay(&mut self) -> &mut O {
        &mut self.overlay
    }

    pub fn indicators(&mut self) -> &mut I {
        &mut self.indicators
    }

    pub fn handle(&mut self, event: MicBuddyEvent) {
        let mut status = self.status;
        match event {
            MicBuddyEvent::Connectivity(true) => {
                status.connected = true;
                self.overlay.show();
            }
            MicBuddyEvent::Connectivity(false) => {
                status.connected = false;
                self.overlay.hide();
            }
            MicBuddyEvent::Live(live) => {
                status.live = live;
                self.overlay.set_live(live);
            }
        }

        if status != self.status {
            info!(connected = status.connected, live = status.live, "status changed");
            self.status = status;
            self.indicators.update(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct FakeOverlay {
        visible: bool,
        target: Option<bool>,
        calls: Vec<&'static str>,
    }

    impl OverlayControl for FakeOverlay {
        fn show(&mut self) {
            self.visible = true;
            self.calls.push("show");
        }

        fn hide(&mut self) {
            self.visible = false;
            self.calls.push("hide");
        }

        fn set_live(&mut self, live: bool) {
            self.target = Some(live);
            self.calls.push("set_live");
        }
    }

    #[derive(Debug, Default)]
    struct FakeIndicators {
        updates: Vec<Status>,
    }

    impl Indicators for FakeIndicators {
        fn update(&mut self, status: Status) {
            self.updates.push(status);
        }
    }

    fn coordinator() -> Coordinator<FakeOverlay, FakeIndicators> {
        Coordinator::new(FakeOverlay::default(), FakeIndicators::default())
    }

    #[test]
    fn test_host_absent_keeps_overlay_hidden() {
        let mut c = coordinator();
        c.handle(MicBuddyEvent::Connectivity(false));
        assert!(!c.overlay().visible);
        assert_eq!(c.status(), Status::default());
        // nothing changed, so the tray is left alone
        assert!(c.indicators().updates.is_empty());
    }

    #[test]
    fn test_connect_then_live_shows_pink() {
        let mut c = coordinator();
        c.handle(MicBuddyEvent::Connectivity(true));
        c.handle(MicBuddyEvent::Live(true));

        assert!(c.overlay().visible);
        assert_eq!(c.overlay().target, Some(true));
        assert_eq!(
            c.indicators().updates,
            vec![
                Status {
                    connected: true,
                    live: false
                },
                Status {
                    connected: true,
                    live: true
                },
            ]
        );
    }

    #[test]
    fn test_muted_mic_flips_target() {
        let mut c = coordinator();
        c.handle(MicBuddyEvent::Connectivity(true));
        c.handle(MicBuddyEvent::Live(true));
        c.handle(MicBuddyEvent::Live(false));

        assert_eq!(c.overlay().target, Some(false));
        assert_eq!(c.status().mic_text(), "Mic Status: Muted");
    }

    #[test]
    fn test_disconnect_hides_and_keeps_last_mic_state() {
        let mut c = coordinator();
        c.handle(MicBuddyEvent::Connectivity(true));
        c.handle(MicBuddyEvent::Live(true));
        c.handle(MicBuddyEvent::Connectivity(false));

        assert!(!c.overlay().visible);
        assert_eq!(
            c.status(),
            Status {
                connected: false,
                live: true
            }
        );
        assert_eq!(c.status().connection_text(), "OBS Status: Waiting…");
    }

    #[test]
    fn test_repeated_events_update_tray_once() {
        let mut c = coordinator();
        for _ in 0..3 {
            c.handle(MicBuddyEvent::Connectivity(true));
            c.handle(MicBuddyEvent::Live(true));
        }
        assert!(c.overlay().visible);
        assert_eq!(c.indicators().updates.len(), 2);
        // every live signal still reaches the face
        let set_live = c.overlay().calls.iter().filter(|c| **c == "set_live").count();
        assert_eq!(set_live, 3);
    }

    #[test]
    fn test_reconnect_after_fault() {
        let mut c = coordinator();
        c.handle(MicBuddyEvent::Connectivity(true));
        c.handle(MicBuddyEvent::Live(true));
        c.handle(MicBuddyEvent::Connectivity(false));
        c.handle(MicBuddyEvent::Connectivity(true));

        assert!(c.overlay().visible);
        assert_eq!(
            c.overlay().calls,
            vec!["show", "set_live", "hide", "show"]
        );
    }
}
