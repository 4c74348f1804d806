//! Global start/stop hotkey
//!
//! [`HotkeyListener`] keeps exactly one combo registered through a
//! [`HotkeyBackend`]. On X11 the combo is a passive key grab on the root
//! window; a background thread pumps X events and forwards presses over a
//! channel so the engine is only ever touched from the UI thread.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::{ConnectionExt as _, GrabMode, Keycode, ModMask, Window};
use x11rb::protocol::{ErrorKind, Event};
use x11rb::rust_connection::RustConnection;

use crate::constants::timing;
use crate::error::HotkeyError;
use crate::types::HotkeyCombo;
use crate::x11_utils::{self, X11Context, LOCK_VARIANTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    Pressed,
}

/// OS-level registration of a single key combination
pub trait HotkeyBackend {
    fn grab(&mut self, combo: &HotkeyCombo) -> Result<(), HotkeyError>;

    fn ungrab(&mut self, combo: &HotkeyCombo);
}

/// Owns the one active registration
///
/// `register` is atomic: afterwards either the new combo or the previous one
/// is active, never both and never neither.
pub struct HotkeyListener {
    backend: Box<dyn HotkeyBackend>,
    active: Option<HotkeyCombo>,
}

impl HotkeyListener {
    pub fn new(backend: Box<dyn HotkeyBackend>) -> Self {
        Self { backend, active: None }
    }

    pub fn active(&self) -> Option<&HotkeyCombo> {
        self.active.as_ref()
    }

    /// Grab `combo`, releasing the previous combo only once the new grab holds
    pub fn register(&mut self, combo: &HotkeyCombo) -> Result<(), HotkeyError> {
        if self.active.as_ref() == Some(combo) {
            debug!(hotkey = %combo, "Hotkey already registered");
            return Ok(());
        }

        self.backend.grab(combo)?;
        if let Some(previous) = self.active.take() {
            self.backend.ungrab(&previous);
        }
        info!(hotkey = %combo, "Registered global hotkey");
        self.active = Some(combo.clone());
        Ok(())
    }

    /// Release the current registration, if any
    pub fn unregister(&mut self) {
        if let Some(combo) = self.active.take() {
            self.backend.ungrab(&combo);
            info!(hotkey = %combo, "Unregistered global hotkey");
        }
    }

    /// Unregister then register `combo`; on failure the previous combo is restored
    pub fn rebind(&mut self, combo: &HotkeyCombo) -> Result<(), HotkeyError> {
        if self.active.as_ref() == Some(combo) {
            return Ok(());
        }

        let previous = self.active.clone();
        self.unregister();

        match self.register(combo) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(hotkey = %combo, error = %e, "Hotkey rebind failed");
                if let Some(previous) = previous {
                    match self.register(&previous) {
                        Ok(()) => info!(hotkey = %previous, "Restored previous hotkey"),
                        Err(restore) => {
                            error!(hotkey = %previous, error = %restore, "Failed to restore previous hotkey")
                        }
                    }
                }
                Err(e)
            }
        }
    }
}

/// Key and modifier mask currently grabbed, shared with the event pump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GrabbedKey {
    keycode: Keycode,
    modifiers: u16,
}

/// Passive key grabs on the root window
pub struct X11HotkeyGrabber {
    conn: Arc<RustConnection>,
    root: Window,
    grabbed: Arc<Mutex<Option<GrabbedKey>>>,
}

impl X11HotkeyGrabber {
    pub fn new(ctx: &X11Context) -> Self {
        Self {
            conn: Arc::clone(&ctx.conn),
            root: ctx.root,
            grabbed: Arc::new(Mutex::new(None)),
        }
    }

    fn resolve(&self, combo: &HotkeyCombo) -> Result<GrabbedKey, HotkeyError> {
        let keysym = x11_utils::keysym_for(combo.key())
            .ok_or_else(|| HotkeyError::UnknownKey(combo.key().to_string()))?;
        let keycode = x11_utils::keycode_for_keysym(&self.conn, keysym)
            .map_err(|e| HotkeyError::Backend(format!("{:#}", e)))?
            .ok_or_else(|| HotkeyError::UnknownKey(combo.key().to_string()))?;
        Ok(GrabbedKey { keycode, modifiers: x11_utils::modifier_mask(combo.modifiers) })
    }

    fn grab_one(&self, key: GrabbedKey, lock: u16) -> Result<(), ReplyError> {
        self.conn
            .grab_key(
                false,
                self.root,
                ModMask::from(key.modifiers | lock),
                key.keycode,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )?
            .check()
    }

    fn ungrab_one(&self, key: GrabbedKey, lock: u16) {
        let result = self
            .conn
            .ungrab_key(key.keycode, self.root, ModMask::from(key.modifiers | lock))
            .map(|cookie| cookie.ignore_error());
        if let Err(e) = result {
            debug!(error = %e, "Failed to send ungrab request");
        }
    }

    /// Start the thread that turns grabbed key presses into [`HotkeyEvent`]s
    ///
    /// `wake` is called after each send so the UI can drain the channel.
    pub fn spawn_event_pump<F>(&self, sender: Sender<HotkeyEvent>, wake: F) -> thread::JoinHandle<()>
    where
        F: Fn() + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let grabbed = Arc::clone(&self.grabbed);

        thread::spawn(move || {
            info!("Hotkey event pump started");
            let mut debounce = Debouncer::new(Duration::from_millis(timing::HOTKEY_DEBOUNCE_MS));

            loop {
                let event = match conn.wait_for_event() {
                    Ok(event) => event,
                    Err(e) => {
                        error!(error = %e, "X connection lost, hotkey event pump exiting");
                        return;
                    }
                };

                let Event::KeyPress(press) = event else {
                    continue;
                };

                let current = grabbed.lock().ok().and_then(|guard| *guard);
                let Some(key) = current else {
                    continue;
                };
                let modifiers = x11_utils::significant_modifiers(u16::from(press.state));
                if press.detail != key.keycode || modifiers != key.modifiers {
                    debug!(keycode = press.detail, state = modifiers, "Ignoring unrelated key press");
                    continue;
                }

                if !debounce.accept(Instant::now()) {
                    debug!("Hotkey press debounced");
                    continue;
                }

                debug!("Hotkey pressed");
                if sender.send(HotkeyEvent::Pressed).is_err() {
                    info!("Hotkey receiver dropped, event pump exiting");
                    return;
                }
                wake();
            }
        })
    }
}

impl HotkeyBackend for X11HotkeyGrabber {
    fn grab(&mut self, combo: &HotkeyCombo) -> Result<(), HotkeyError> {
        let key = self.resolve(combo)?;

        for (done, lock) in LOCK_VARIANTS.iter().enumerate() {
            if let Err(e) = self.grab_one(key, *lock) {
                // Roll back the variants that did succeed
                for undo in &LOCK_VARIANTS[..done] {
                    self.ungrab_one(key, *undo);
                }
                let _ = self.conn.flush();

                return Err(match e {
                    ReplyError::X11Error(x) if x.error_kind == ErrorKind::Access => {
                        HotkeyError::Conflict(combo.to_string())
                    }
                    other => HotkeyError::Backend(other.to_string()),
                });
            }
        }

        if let Ok(mut guard) = self.grabbed.lock() {
            *guard = Some(key);
        }
        debug!(hotkey = %combo, keycode = key.keycode, modifiers = key.modifiers, "Key grabbed");
        Ok(())
    }

    fn ungrab(&mut self, combo: &HotkeyCombo) {
        let key = match self.resolve(combo) {
            Ok(key) => key,
            Err(e) => {
                warn!(hotkey = %combo, error = %e, "Cannot resolve hotkey to release");
                return;
            }
        };

        for lock in LOCK_VARIANTS {
            self.ungrab_one(key, lock);
        }
        if let Err(e) = self.conn.flush() {
            warn!(error = %e, "Failed to flush X connection after ungrab");
        }

        if let Ok(mut guard) = self.grabbed.lock()
            && *guard == Some(key)
        {
            *guard = None;
        }
    }
}

/// Drops presses that arrive within `window` of the last accepted one
/// (keyboard auto-repeat while the hotkey is held)
#[derive(Debug)]
struct Debouncer {
    window: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    fn accept(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last
            && now.duration_since(last) < self.window
        {
            return false;
        }
        self.last = Some(now);
        true
    }
}
