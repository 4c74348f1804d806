//! Click loop state machine
//!
//! The engine never sleeps or spawns threads. The GUI calls [`ClickEngine::poll`]
//! every frame and schedules its next repaint at [`ClickEngine::next_deadline`],
//! so all clicking happens on the UI thread.
//!
//! A tick clicks once per press of the click type; extra presses of a double or
//! triple click follow after a short gap, as their own poll steps.

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::ClickSettings;
use crate::constants::timing;
use crate::error::{InputError, ValidationError};
use crate::input::InputBackend;
use crate::types::{FirstClick, Point, TargetMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// User pressed Stop or the hotkey
    Requested,
    /// Fixed repeat count reached
    Completed,
    /// Application is closing
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    Started,
    Stopped { reason: StopReason, clicks: u64 },
}

/// State of an active run
#[derive(Debug)]
struct Run {
    /// Settings captured at start; edits apply to the next run
    settings: ClickSettings,
    /// Ticks emitted so far
    clicks: u64,
    /// Round-robin index into the fixed locations
    location_index: usize,
    next_tick: Instant,
    /// Presses left in the current double/triple click
    pending_presses: u32,
    next_press: Instant,
    failures: u64,
}

impl Run {
    fn limit_reached(&self) -> bool {
        self.settings.repeat_limit().is_some_and(|n| self.clicks >= n)
    }
}

pub struct ClickEngine {
    input: Box<dyn InputBackend>,
    run: Option<Run>,
    events: VecDeque<EngineEvent>,
    multi_click_gap: Duration,
}

impl ClickEngine {
    pub fn new(input: Box<dyn InputBackend>) -> Self {
        Self {
            input,
            run: None,
            events: VecDeque::new(),
            multi_click_gap: Duration::from_millis(timing::MULTI_CLICK_GAP_MS),
        }
    }

    /// Override the gap between presses of a multi-click (zero = back to back)
    #[cfg(test)]
    pub fn with_multi_click_gap(mut self, gap: Duration) -> Self {
        self.multi_click_gap = gap;
        self
    }

    /// Pointer backend, shared with the location picker
    pub fn input(&self) -> &dyn InputBackend {
        self.input.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Ticks emitted in the current run (0 when idle)
    pub fn clicks(&self) -> u64 {
        self.run.as_ref().map_or(0, |run| run.clicks)
    }

    /// Start clicking with a snapshot of `settings`
    ///
    /// No-op if already running. Invalid settings leave the engine idle.
    pub fn start(&mut self, settings: &ClickSettings, now: Instant) -> Result<(), ValidationError> {
        if self.run.is_some() {
            debug!("Start requested while already running, ignoring");
            return Ok(());
        }
        settings.validate()?;

        let interval = settings.interval.as_duration();
        let next_tick = match settings.first_click {
            FirstClick::AfterInterval => now + interval,
            FirstClick::Immediate => now,
        };

        info!(
            interval_ms = interval.as_millis() as u64,
            button = settings.button.label(),
            click_type = settings.click_type.label(),
            limit = ?settings.repeat_limit(),
            locations = settings.target.locations().len(),
            "Clicker started"
        );

        self.run = Some(Run {
            settings: settings.clone(),
            clicks: 0,
            location_index: 0,
            next_tick,
            pending_presses: 0,
            next_press: next_tick,
            failures: 0,
        });
        self.events.push_back(EngineEvent::Started);
        Ok(())
    }

    /// Stop clicking; does nothing when idle
    pub fn stop(&mut self) {
        self.finish(StopReason::Requested);
    }

    /// Stop before the application exits
    pub fn shutdown(&mut self) {
        self.finish(StopReason::Shutdown);
    }

    /// Start if idle, stop if running
    pub fn toggle(&mut self, settings: &ClickSettings, now: Instant) -> Result<(), ValidationError> {
        if self.is_running() {
            self.stop();
            Ok(())
        } else {
            self.start(settings, now)
        }
    }

    /// When the engine next needs to be polled, if running
    pub fn next_deadline(&self) -> Option<Instant> {
        self.run.as_ref().map(|run| {
            if run.pending_presses > 0 {
                run.next_press.min(run.next_tick)
            } else {
                run.next_tick
            }
        })
    }

    /// Take queued start/stop events
    pub fn drain_events(&mut self) -> impl Iterator<Item = EngineEvent> + '_ {
        self.events.drain(..)
    }

    /// Advance the click loop to `now`
    ///
    /// Emits at most one tick. A pending press of a multi-click takes priority
    /// over the next tick.
    pub fn poll(&mut self, now: Instant) {
        let Some(run) = self.run.as_mut() else {
            return;
        };

        if run.pending_presses > 0 {
            if now < run.next_press {
                return;
            }
            let result = self.input.click_button(run.settings.button);
            record_failure(run, result);
            run.pending_presses -= 1;
            run.next_press = now + self.multi_click_gap;

            if run.pending_presses == 0 && run.limit_reached() {
                self.finish(StopReason::Completed);
            }
            return;
        }

        if now < run.next_tick {
            return;
        }

        let result = fire_tick(self.input.as_ref(), run, self.multi_click_gap, now);
        record_failure(run, result);
        run.clicks += 1;

        let interval = run.settings.interval.as_duration();
        let next = run.next_tick + interval;
        run.next_tick = if next <= now {
            debug!(behind_ms = (now - run.next_tick).as_millis() as u64, "Click loop fell behind, re-arming from now");
            now + interval
        } else {
            next
        };

        if run.pending_presses == 0 && run.limit_reached() {
            self.finish(StopReason::Completed);
        }
    }

    fn finish(&mut self, reason: StopReason) {
        let Some(run) = self.run.take() else {
            return;
        };

        if run.failures > 0 {
            warn!(failures = run.failures, clicks = run.clicks, "Some synthetic clicks failed during this run");
        }
        info!(reason = ?reason, clicks = run.clicks, "Clicker stopped");
        self.events.push_back(EngineEvent::Stopped { reason, clicks: run.clicks });
    }
}

/// Position the pointer and emit the first press of a tick
fn fire_tick(
    input: &dyn InputBackend,
    run: &mut Run,
    gap: Duration,
    now: Instant,
) -> Result<(), InputError> {
    let target = match &run.settings.target {
        TargetMode::AtCursor => None,
        TargetMode::FixedLocations(points) => {
            let point: Point = points[run.location_index % points.len()];
            run.location_index = (run.location_index + 1) % points.len();
            Some(point)
        }
    };

    let mut presses = run.settings.click_type.presses();
    if gap.is_zero() {
        // Everything in one step
        if let Some(point) = target {
            input.move_cursor(point)?;
        }
        while presses > 0 {
            presses -= 1;
            input.click_button(run.settings.button)?;
        }
        return Ok(());
    }

    run.pending_presses = presses - 1;
    run.next_press = now + gap;
    if let Some(point) = target {
        input.move_cursor(point)?;
    }
    input.click_button(run.settings.button)
}

fn record_failure(run: &mut Run, result: Result<(), InputError>) {
    if let Err(e) = result {
        run.failures += 1;
        if run.failures == 1 {
            warn!(error = %e, "Synthetic click failed, continuing");
        } else {
            debug!(error = %e, failures = run.failures, "Synthetic click failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::mock::{InputCall, MockInput};
    use crate::types::{ClickType, Interval, MouseButton, RepeatMode};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn engine(mock: &MockInput) -> ClickEngine {
        ClickEngine::new(Box::new(mock.clone())).with_multi_click_gap(Duration::ZERO)
    }

    fn settings(interval_ms: u64) -> ClickSettings {
        ClickSettings { interval: Interval::from_millis(interval_ms), ..ClickSettings::default() }
    }

    /// Poll once per interval boundary from `t0` up to and including `until`
    fn poll_every(engine: &mut ClickEngine, t0: Instant, step: u64, until: u64) {
        let mut t = step;
        while t <= until {
            engine.poll(t0 + ms(t));
            t += step;
        }
    }

    #[test]
    fn test_start_then_immediate_stop_emits_nothing() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();

        engine.start(&settings(100), t0).unwrap();
        engine.poll(t0 + ms(50));
        engine.stop();

        assert_eq!(mock.clicks(), 0);
        assert!(!engine.is_running());
        let events: Vec<_> = engine.drain_events().collect();
        assert_eq!(
            events,
            vec![
                EngineEvent::Started,
                EngineEvent::Stopped { reason: StopReason::Requested, clicks: 0 }
            ]
        );
    }

    #[test]
    fn test_fixed_count_stops_itself() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();
        let s = ClickSettings { repeat: RepeatMode::FixedCount, repeat_count: 3, ..settings(500) };

        engine.start(&s, t0).unwrap();
        poll_every(&mut engine, t0, 500, 5000);

        assert_eq!(mock.clicks(), 3);
        assert!(!engine.is_running());
        let events: Vec<_> = engine.drain_events().collect();
        assert_eq!(
            events.last(),
            Some(&EngineEvent::Stopped { reason: StopReason::Completed, clicks: 3 })
        );
    }

    #[test]
    fn test_clicks_follow_interval_boundaries() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();
        engine.start(&settings(500), t0).unwrap();

        engine.poll(t0 + ms(499));
        assert_eq!(mock.clicks(), 0);
        engine.poll(t0 + ms(500));
        assert_eq!(mock.clicks(), 1);
        engine.poll(t0 + ms(999));
        assert_eq!(mock.clicks(), 1);
        engine.poll(t0 + ms(1000));
        assert_eq!(mock.clicks(), 2);
        assert_eq!(engine.next_deadline(), Some(t0 + ms(1500)));
    }

    #[test]
    fn test_until_stopped_keeps_going() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();
        engine.start(&settings(10), t0).unwrap();

        poll_every(&mut engine, t0, 10, 1000);
        assert_eq!(mock.clicks(), 100);
        assert!(engine.is_running());
        assert_eq!(engine.clicks(), 100);
    }

    #[test]
    fn test_at_most_one_tick_per_poll() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();
        engine.start(&settings(100), t0).unwrap();

        // UI thread stalled for a second
        engine.poll(t0 + ms(1050));
        assert_eq!(mock.clicks(), 1);
        // Re-armed from now rather than replaying the missed ticks
        assert_eq!(engine.next_deadline(), Some(t0 + ms(1150)));
        engine.poll(t0 + ms(1100));
        assert_eq!(mock.clicks(), 1);
    }

    #[test]
    fn test_click_types_emit_presses() {
        for (click_type, expected) in [(ClickType::Single, 1), (ClickType::Double, 2), (ClickType::Triple, 3)] {
            let mock = MockInput::new();
            let mut engine = engine(&mock);
            let t0 = Instant::now();
            let s = ClickSettings { click_type, button: MouseButton::Right, ..settings(100) };

            engine.start(&s, t0).unwrap();
            engine.poll(t0 + ms(100));
            assert_eq!(mock.calls(), vec![InputCall::Click(MouseButton::Right); expected]);
            assert_eq!(engine.clicks(), 1);
        }
    }

    #[test]
    fn test_multi_click_gap_spreads_presses() {
        let mock = MockInput::new();
        let mut engine = ClickEngine::new(Box::new(mock.clone())).with_multi_click_gap(ms(40));
        let t0 = Instant::now();
        let s = ClickSettings {
            click_type: ClickType::Triple,
            repeat: RepeatMode::FixedCount,
            repeat_count: 1,
            ..settings(100)
        };

        engine.start(&s, t0).unwrap();
        engine.poll(t0 + ms(100));
        assert_eq!(mock.clicks(), 1);
        assert_eq!(engine.next_deadline(), Some(t0 + ms(140)));

        engine.poll(t0 + ms(120));
        assert_eq!(mock.clicks(), 1);
        engine.poll(t0 + ms(140));
        assert_eq!(mock.clicks(), 2);
        // The run only completes after the last press
        assert!(engine.is_running());
        engine.poll(t0 + ms(180));
        assert_eq!(mock.clicks(), 3);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_fixed_locations_round_robin() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();
        let points = vec![Point::new(1, 1), Point::new(2, 2), Point::new(3, 3)];
        let s = ClickSettings {
            target: TargetMode::FixedLocations(points.clone()),
            repeat: RepeatMode::FixedCount,
            repeat_count: 7,
            ..settings(100)
        };

        engine.start(&s, t0).unwrap();
        poll_every(&mut engine, t0, 100, 700);

        assert_eq!(
            mock.moves(),
            vec![points[0], points[1], points[2], points[0], points[1], points[2], points[0]]
        );
        // Each move is followed by its click
        let calls = mock.calls();
        assert_eq!(calls[0], InputCall::Move(points[0]));
        assert_eq!(calls[1], InputCall::Click(MouseButton::Left));
    }

    #[test]
    fn test_at_cursor_never_moves_pointer() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();
        mock.set_cursor(Point::new(40, 50));

        engine.start(&settings(100), t0).unwrap();
        engine.poll(t0 + ms(100));
        mock.set_cursor(Point::new(400, 500));
        engine.poll(t0 + ms(200));

        assert!(mock.moves().is_empty());
        assert_eq!(mock.clicks(), 2);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();

        assert_eq!(engine.start(&settings(0), t0), Err(ValidationError::ZeroInterval));
        let empty = ClickSettings { target: TargetMode::FixedLocations(Vec::new()), ..settings(100) };
        assert_eq!(engine.start(&empty, t0), Err(ValidationError::NoLocations));

        assert!(!engine.is_running());
        assert_eq!(engine.drain_events().count(), 0);
    }

    #[test]
    fn test_failed_clicks_still_count() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();
        mock.set_failing(true);
        let s = ClickSettings { repeat: RepeatMode::FixedCount, repeat_count: 2, ..settings(100) };

        engine.start(&s, t0).unwrap();
        engine.poll(t0 + ms(100));
        assert!(engine.is_running());
        engine.poll(t0 + ms(200));

        assert!(!engine.is_running());
        let events: Vec<_> = engine.drain_events().collect();
        assert_eq!(
            events.last(),
            Some(&EngineEvent::Stopped { reason: StopReason::Completed, clicks: 2 })
        );
    }

    #[test]
    fn test_immediate_first_click() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();
        let s = ClickSettings { first_click: FirstClick::Immediate, ..settings(500) };

        engine.start(&s, t0).unwrap();
        assert_eq!(engine.next_deadline(), Some(t0));
        engine.poll(t0);
        assert_eq!(mock.clicks(), 1);
        assert_eq!(engine.next_deadline(), Some(t0 + ms(500)));
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();

        engine.start(&settings(100), t0).unwrap();
        engine.poll(t0 + ms(100));
        engine.start(&settings(100), t0 + ms(150)).unwrap();

        assert_eq!(engine.clicks(), 1);
        assert_eq!(engine.next_deadline(), Some(t0 + ms(200)));
        assert_eq!(engine.drain_events().count(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        engine.stop();
        engine.start(&settings(100), Instant::now()).unwrap();
        engine.stop();
        engine.stop();

        let stops = engine
            .drain_events()
            .filter(|e| matches!(e, EngineEvent::Stopped { .. }))
            .count();
        assert_eq!(stops, 1);
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn test_toggle_alternates() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();
        let s = settings(100);

        engine.toggle(&s, t0).unwrap();
        assert!(engine.is_running());
        engine.toggle(&s, t0 + ms(10)).unwrap();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_running_uses_settings_snapshot() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        let t0 = Instant::now();
        let mut s = settings(100);

        engine.start(&s, t0).unwrap();
        s.button = MouseButton::Middle;
        s.interval = Interval::from_millis(1000);
        engine.poll(t0 + ms(100));

        assert_eq!(mock.calls(), vec![InputCall::Click(MouseButton::Left)]);
        assert_eq!(engine.next_deadline(), Some(t0 + ms(200)));
    }

    #[test]
    fn test_shutdown_reason() {
        let mock = MockInput::new();
        let mut engine = engine(&mock);
        engine.start(&settings(100), Instant::now()).unwrap();
        engine.shutdown();
        let events: Vec<_> = engine.drain_events().collect();
        assert_eq!(
            events.last(),
            Some(&EngineEvent::Stopped { reason: StopReason::Shutdown, clicks: 0 })
        );
    }
}
