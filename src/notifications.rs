//! Toast and on-screen indicator state
//!
//! Pure model driven by engine events; the GUI renders whatever is visible at
//! the current instant and repaints at [`NotificationPresenter::next_change`].

use std::time::{Duration, Instant};
use tracing::debug;

use crate::constants::notifications;
use crate::engine::EngineEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Success colour
    Started,
    /// Accent colour
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub text: &'static str,
    expires_at: Instant,
}

pub struct NotificationPresenter {
    toast: Option<Toast>,
    /// Set while the engine runs with the OSD enabled
    osd_since: Option<Instant>,
    toast_duration: Duration,
    pulse: Duration,
}

impl Default for NotificationPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationPresenter {
    pub fn new() -> Self {
        Self {
            toast: None,
            osd_since: None,
            toast_duration: Duration::from_millis(notifications::TOAST_DISPLAY_MS),
            pulse: Duration::from_millis(notifications::OSD_PULSE_MS),
        }
    }

    /// React to an engine event with the user's current toggles
    pub fn handle(&mut self, event: EngineEvent, show_toast: bool, show_osd: bool, now: Instant) {
        let (kind, text) = match event {
            EngineEvent::Started => {
                if show_osd {
                    self.osd_since = Some(now);
                }
                (ToastKind::Started, "Clicker Started")
            }
            EngineEvent::Stopped { .. } => {
                self.osd_since = None;
                (ToastKind::Stopped, "Clicker Stopped")
            }
        };

        if show_toast {
            debug!(text, "Showing toast");
            self.toast = Some(Toast { kind, text, expires_at: now + self.toast_duration });
        }
    }

    /// OSD toggled in settings while the engine may be running
    pub fn set_osd_enabled(&mut self, enabled: bool, running: bool, now: Instant) {
        self.osd_since = match (enabled && running, self.osd_since) {
            (true, Some(since)) => Some(since),
            (true, None) => Some(now),
            (false, _) => None,
        };
    }

    /// Toast to draw at `now`, dropping it once expired
    pub fn toast(&mut self, now: Instant) -> Option<&Toast> {
        if self.toast.as_ref().is_some_and(|t| now >= t.expires_at) {
            self.toast = None;
        }
        self.toast.as_ref()
    }

    pub fn osd_visible(&self) -> bool {
        self.osd_since.is_some()
    }

    /// Whether the pulsing dot is lit (toggles every pulse period)
    pub fn osd_dot_lit(&self, now: Instant) -> bool {
        match self.osd_since {
            Some(since) => {
                let phase = now.saturating_duration_since(since).as_millis() / self.pulse.as_millis().max(1);
                phase % 2 == 0
            }
            None => false,
        }
    }

    /// Next instant the rendered state changes on its own
    pub fn next_change(&self, now: Instant) -> Option<Instant> {
        let toast = self.toast.as_ref().map(|t| t.expires_at);
        let pulse = self.osd_since.map(|since| {
            let pulse_ms = self.pulse.as_millis().max(1);
            let elapsed = now.saturating_duration_since(since).as_millis();
            let next = (elapsed / pulse_ms + 1) * pulse_ms;
            since + Duration::from_millis(next as u64)
        });

        match (toast, pulse) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
