//! Composition root: owns the settings and routes actions between components
//!
//! Everything here runs on the UI thread. The hotkey pump and update worker
//! only reach the controller through channels drained in [`AppController::poll`].

use std::sync::mpsc::{self, Receiver};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::{ClickSettings, ConfigStore};
use crate::engine::{ClickEngine, EngineEvent};
use crate::error::{HotkeyError, ValidationError};
use crate::hotkeys::{HotkeyEvent, HotkeyListener};
use crate::location_picker::{DryRunPreview, LocationPicker};
use crate::notifications::NotificationPresenter;
use crate::types::{HotkeyCombo, Point};
use crate::updater::{self, UpdateStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateState {
    NotChecked,
    Checking,
    Done(UpdateStatus),
}

pub struct AppController {
    settings: ClickSettings,
    store: ConfigStore,
    engine: ClickEngine,
    hotkeys: HotkeyListener,
    hotkey_rx: Receiver<HotkeyEvent>,
    presenter: NotificationPresenter,
    picker: LocationPicker,
    dry_run: Option<DryRunPreview>,
    update_rx: Option<Receiver<UpdateStatus>>,
    update_state: UpdateState,
    validation_error: Option<ValidationError>,
    hotkey_error: Option<HotkeyError>,
    /// Set when the configured hotkey couldn't be grabbed at startup
    hotkey_notice: Option<String>,
    last_run_clicks: Option<u64>,
    shut_down: bool,
}

impl AppController {
    /// Wire components together and register the configured hotkey
    pub fn new(
        store: ConfigStore,
        engine: ClickEngine,
        hotkeys: HotkeyListener,
        hotkey_rx: Receiver<HotkeyEvent>,
    ) -> Self {
        let settings = store.load();
        let mut controller = Self {
            settings,
            store,
            engine,
            hotkeys,
            hotkey_rx,
            presenter: NotificationPresenter::new(),
            picker: LocationPicker::new(),
            dry_run: None,
            update_rx: None,
            update_state: UpdateState::NotChecked,
            validation_error: None,
            hotkey_error: None,
            hotkey_notice: None,
            last_run_clicks: None,
            shut_down: false,
        };
        controller.register_startup_hotkey();
        controller
    }

    /// Configured combo, else the default, else run without a hotkey
    ///
    /// A fallback is not written back, so the configured combo is tried again
    /// on the next launch.
    fn register_startup_hotkey(&mut self) {
        let configured = self.settings.hotkey.clone();
        let Err(e) = self.hotkeys.register(&configured) else {
            return;
        };
        warn!(hotkey = %configured, error = %e, "Configured hotkey unavailable");

        let fallback = HotkeyCombo::default();
        if fallback != configured {
            match self.hotkeys.register(&fallback) {
                Ok(()) => {
                    self.hotkey_notice = Some(format!("{e}. Using {fallback} instead."));
                    return;
                }
                Err(fallback_err) => {
                    warn!(hotkey = %fallback, error = %fallback_err, "Default hotkey unavailable too");
                }
            }
        }

        error!("Running without a global hotkey");
        self.hotkey_notice = Some(format!("{e}. No global hotkey is active."));
    }

    pub fn settings(&self) -> &ClickSettings {
        &self.settings
    }

    /// Apply an edit to the settings and persist it
    ///
    /// Edits made while running apply to the next run.
    pub fn update_settings(&mut self, edit: impl FnOnce(&mut ClickSettings)) {
        let before = self.settings.clone();
        edit(&mut self.settings);
        self.settings.validate_and_clamp();
        if self.settings == before {
            return;
        }

        if self.settings.show_osd != before.show_osd {
            self.presenter
                .set_osd_enabled(self.settings.show_osd, self.engine.is_running(), Instant::now());
        }
        if self.picker.is_open() {
            self.picker.set_saved(self.settings.locations().len());
        }
        // A fixed edit may make the last error stale
        if self.validation_error.is_some() && self.settings.validate().is_ok() {
            self.validation_error = None;
        }
        self.save();
    }

    fn save(&self) {
        if let Err(e) = self.store.save(&self.settings) {
            error!(error = %format!("{:#}", e), "Failed to save settings");
        }
    }

    pub fn engine(&self) -> &ClickEngine {
        &self.engine
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn start(&mut self, now: Instant) {
        self.validation_error = self.engine.start(&self.settings, now).err();
        if let Some(e) = &self.validation_error {
            warn!(error = %e, "Cannot start clicking");
        }
        self.route_engine_events(now);
    }

    pub fn stop(&mut self, now: Instant) {
        self.engine.stop();
        self.route_engine_events(now);
    }

    pub fn toggle(&mut self, now: Instant) {
        self.validation_error = self.engine.toggle(&self.settings, now).err();
        if let Some(e) = &self.validation_error {
            warn!(error = %e, "Cannot start clicking");
        }
        self.route_engine_events(now);
    }

    /// One scheduler step: hotkey presses, clicking, background results
    pub fn poll(&mut self, now: Instant) {
        while let Ok(HotkeyEvent::Pressed) = self.hotkey_rx.try_recv() {
            info!("Hotkey toggle");
            self.toggle(now);
        }

        self.engine.poll(now);
        self.route_engine_events(now);

        if let Some(rx) = &self.update_rx
            && let Ok(status) = rx.try_recv()
        {
            self.update_state = UpdateState::Done(status);
            self.update_rx = None;
        }

        if self.picker.needs_refresh(now) {
            let cursor = self.engine.input().cursor_position().ok();
            self.picker.set_cursor(cursor, now);
        }

        if self.dry_run.as_ref().is_some_and(|d| d.is_finished(now)) {
            self.dry_run = None;
        }
    }

    fn route_engine_events(&mut self, now: Instant) {
        let events: Vec<EngineEvent> = self.engine.drain_events().collect();
        for event in events {
            if let EngineEvent::Stopped { clicks, .. } = event {
                self.last_run_clicks = Some(clicks);
            }
            self.presenter
                .handle(event, self.settings.show_toast, self.settings.show_osd, now);
        }
    }

    /// Earliest instant anything needs another poll
    pub fn next_wakeup(&self, now: Instant) -> Option<Instant> {
        [
            self.engine.next_deadline(),
            self.presenter.next_change(now),
            self.picker.next_change(now),
            self.dry_run.as_ref().and_then(|d| d.next_change(now)),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn presenter(&mut self) -> &mut NotificationPresenter {
        &mut self.presenter
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation_error.as_ref()
    }

    pub fn last_run_clicks(&self) -> Option<u64> {
        self.last_run_clicks
    }

    // Hotkey

    pub fn active_hotkey(&self) -> Option<&HotkeyCombo> {
        self.hotkeys.active()
    }

    pub fn hotkey_error(&self) -> Option<&HotkeyError> {
        self.hotkey_error.as_ref()
    }

    pub fn hotkey_notice(&self) -> Option<&str> {
        self.hotkey_notice.as_deref()
    }

    /// Move the global hotkey; the previous one stays active on failure
    pub fn rebind_hotkey(&mut self, combo: HotkeyCombo) -> Result<(), HotkeyError> {
        match self.hotkeys.rebind(&combo) {
            Ok(()) => {
                self.hotkey_error = None;
                self.hotkey_notice = None;
                self.update_settings(|s| s.hotkey = combo);
                Ok(())
            }
            Err(e) => {
                self.hotkey_error = Some(e.clone());
                Err(e)
            }
        }
    }

    // Locations

    pub fn picker(&mut self) -> &mut LocationPicker {
        &mut self.picker
    }

    pub fn open_picker(&mut self) {
        let existing = self.settings.locations().len();
        self.picker.open(existing);
    }

    pub fn close_picker(&mut self) {
        self.picker.close();
    }

    /// Record the current cursor position as a click location
    pub fn capture_location(&mut self, now: Instant) -> Option<Point> {
        let point = match self.engine.input().cursor_position() {
            Ok(point) => point,
            Err(e) => {
                warn!(error = %e, "Cannot read cursor position for capture");
                return None;
            }
        };
        self.add_location(point, now);
        Some(point)
    }

    pub fn add_location(&mut self, point: Point, now: Instant) {
        self.picker.capture(point, now);
        self.update_settings(|s| s.locations_mut().push(point));
    }

    /// Remove the most recently recorded location
    pub fn undo_location(&mut self) {
        if self.settings.locations().is_empty() {
            return;
        }
        self.picker.undo();
        self.update_settings(|s| {
            s.locations_mut().pop();
        });
    }

    pub fn dry_run(&self) -> Option<&DryRunPreview> {
        self.dry_run.as_ref()
    }

    pub fn start_dry_run(&mut self, now: Instant) {
        self.dry_run = DryRunPreview::new(self.settings.locations(), self.settings.interval, now);
    }

    // Updates

    pub fn update_state(&self) -> &UpdateState {
        &self.update_state
    }

    /// Kick off a background release check; ignored while one is running
    pub fn check_for_updates<F>(&mut self, wake: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.update_state == UpdateState::Checking {
            return;
        }
        let (tx, rx) = mpsc::channel();
        updater::spawn_check(tx, wake);
        self.update_rx = Some(rx);
        self.update_state = UpdateState::Checking;
    }

    /// Stop clicking, release the hotkey and save; safe to call twice
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        info!("Shutting down");

        self.engine.shutdown();
        self.route_engine_events(Instant::now());
        self.hotkeys.unregister();
        self.save();
    }
}
