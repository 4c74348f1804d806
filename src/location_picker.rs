//! Location picker and dry-run preview models
//!
//! The picker toolbar captures the global cursor position on Space/Enter and
//! drops a numbered marker there. The dry run reveals a marker per saved
//! location, one stagger step apart, then clears them all.

use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::constants::notifications;
use crate::types::{Interval, Point};

/// Live coordinate refresh period while the picker is open
pub const CURSOR_REFRESH: Duration = Duration::from_millis(50);

/// A numbered marker drawn at a screen position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub point: Point,
    /// 1-based, also selects the palette colour
    pub number: usize,
}

/// Last thing the picker did, shown under the live coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerStatus {
    Idle,
    Captured(Marker),
    Undone { remaining: usize },
}

#[derive(Debug)]
struct TimedMarker {
    marker: Marker,
    expires_at: Instant,
}

pub struct LocationPicker {
    open: bool,
    saved: usize,
    status: PickerStatus,
    cursor: Option<Point>,
    last_refresh: Option<Instant>,
    markers: Vec<TimedMarker>,
}

impl Default for LocationPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationPicker {
    pub fn new() -> Self {
        Self {
            open: false,
            saved: 0,
            status: PickerStatus::Idle,
            cursor: None,
            last_refresh: None,
            markers: Vec::new(),
        }
    }

    /// Open the toolbar; numbering continues after `existing` saved points
    pub fn open(&mut self, existing: usize) {
        info!(existing, "Location picker opened");
        self.open = true;
        self.saved = existing;
        self.status = PickerStatus::Idle;
        self.cursor = None;
        self.last_refresh = None;
    }

    pub fn close(&mut self) {
        if self.open {
            info!(saved = self.saved, "Location picker closed");
        }
        self.open = false;
        self.last_refresh = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn saved(&self) -> usize {
        self.saved
    }

    pub fn status(&self) -> PickerStatus {
        self.status
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    /// Whether the live coordinates are due for a refresh
    pub fn needs_refresh(&self, now: Instant) -> bool {
        self.open
            && self
                .last_refresh
                .is_none_or(|last| now.saturating_duration_since(last) >= CURSOR_REFRESH)
    }

    pub fn set_cursor(&mut self, point: Option<Point>, now: Instant) {
        self.cursor = point;
        self.last_refresh = Some(now);
    }

    /// Record a captured point and show its marker
    pub fn capture(&mut self, point: Point, now: Instant) -> Marker {
        self.saved += 1;
        let marker = Marker { point, number: self.saved };
        debug!(number = marker.number, x = point.x, y = point.y, "Location captured");

        self.status = PickerStatus::Captured(marker);
        self.markers.push(TimedMarker {
            marker,
            expires_at: now + Duration::from_millis(notifications::CAPTURE_MARKER_MS),
        });
        marker
    }

    /// Follow a list edited outside the picker; numbering resumes after `count`
    pub fn set_saved(&mut self, count: usize) {
        if count == self.saved {
            return;
        }
        debug!(from = self.saved, to = count, "Picker count resynced");
        self.saved = count;
        self.markers.retain(|m| m.marker.number <= count);
    }

    /// Forget the last captured point; false when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        if self.saved == 0 {
            return false;
        }
        let removed = self.saved;
        self.saved -= 1;
        self.markers.retain(|m| m.marker.number != removed);
        self.status = PickerStatus::Undone { remaining: self.saved };
        debug!(remaining = self.saved, "Location capture undone");
        true
    }

    /// Capture markers still visible at `now`
    pub fn markers(&mut self, now: Instant) -> Vec<Marker> {
        self.markers.retain(|m| now < m.expires_at);
        self.markers.iter().map(|m| m.marker).collect()
    }

    pub fn next_change(&self, now: Instant) -> Option<Instant> {
        let marker = self.markers.iter().map(|m| m.expires_at).min();
        let refresh = if self.open {
            Some(self.last_refresh.map_or(now, |last| last + CURSOR_REFRESH))
        } else {
            None
        };
        match (marker, refresh) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Staggered reveal of every saved location without clicking
#[derive(Debug, Clone)]
pub struct DryRunPreview {
    points: Vec<Point>,
    started: Instant,
    stagger: Duration,
    hold: Duration,
}

impl DryRunPreview {
    /// Returns None when there is nothing to preview
    pub fn new(points: &[Point], interval: Interval, now: Instant) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let stagger_ms = interval.total_millis().clamp(
            notifications::DRY_RUN_MIN_STAGGER_MS,
            notifications::DRY_RUN_MAX_STAGGER_MS,
        );
        info!(points = points.len(), stagger_ms, "Dry run started");

        Some(Self {
            points: points.to_vec(),
            started: now,
            stagger: Duration::from_millis(stagger_ms),
            hold: Duration::from_millis(notifications::DRY_RUN_HOLD_MS),
        })
    }

    pub fn stagger(&self) -> Duration {
        self.stagger
    }

    fn reveal_at(&self, index: usize) -> Instant {
        self.started + self.stagger * index as u32
    }

    /// All markers are cleared at this instant
    pub fn ends_at(&self) -> Instant {
        self.started + self.stagger * self.points.len() as u32 + self.hold
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now >= self.ends_at()
    }

    /// Markers revealed so far
    pub fn visible(&self, now: Instant) -> Vec<Marker> {
        if self.is_finished(now) {
            return Vec::new();
        }
        self.points
            .iter()
            .enumerate()
            .take_while(|(i, _)| now >= self.reveal_at(*i))
            .map(|(i, point)| Marker { point: *point, number: i + 1 })
            .collect()
    }

    pub fn next_change(&self, now: Instant) -> Option<Instant> {
        if self.is_finished(now) {
            return None;
        }
        let next_reveal = (0..self.points.len())
            .map(|i| self.reveal_at(i))
            .find(|at| *at > now);
        Some(next_reveal.unwrap_or_else(|| self.ends_at()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_capture_numbers_after_existing() {
        let mut picker = LocationPicker::new();
        let t0 = Instant::now();
        picker.open(2);

        let marker = picker.capture(Point::new(10, 20), t0);
        assert_eq!(marker.number, 3);
        assert_eq!(picker.saved(), 3);
        assert_eq!(picker.status(), PickerStatus::Captured(marker));
    }

    #[test]
    fn test_capture_marker_expires() {
        let mut picker = LocationPicker::new();
        let t0 = Instant::now();
        picker.open(0);
        picker.capture(Point::new(1, 1), t0);

        assert_eq!(picker.markers(t0 + ms(1499)).len(), 1);
        assert!(picker.markers(t0 + ms(1500)).is_empty());
    }

    #[test]
    fn test_set_saved_follows_external_edits() {
        let mut picker = LocationPicker::new();
        let t0 = Instant::now();
        picker.open(0);
        for i in 1..=3 {
            picker.capture(Point::new(i, i), t0);
        }

        picker.set_saved(1);
        assert_eq!(picker.saved(), 1);
        assert_eq!(picker.markers(t0), vec![Marker { point: Point::new(1, 1), number: 1 }]);
        assert_eq!(picker.capture(Point::new(9, 9), t0).number, 2);

        picker.set_saved(0);
        assert!(!picker.undo());
        assert_eq!(picker.capture(Point::new(5, 5), t0).number, 1);
    }

    #[test]
    fn test_undo() {
        let mut picker = LocationPicker::new();
        let t0 = Instant::now();
        picker.open(0);
        picker.capture(Point::new(1, 1), t0);
        picker.capture(Point::new(2, 2), t0);

        assert!(picker.undo());
        assert_eq!(picker.saved(), 1);
        assert_eq!(picker.status(), PickerStatus::Undone { remaining: 1 });
        // Marker of the undone capture disappears immediately
        assert_eq!(picker.markers(t0), vec![Marker { point: Point::new(1, 1), number: 1 }]);

        assert!(picker.undo());
        assert!(!picker.undo());
        assert_eq!(picker.saved(), 0);
    }

    #[test]
    fn test_cursor_refresh_period() {
        let mut picker = LocationPicker::new();
        let t0 = Instant::now();
        assert!(!picker.needs_refresh(t0));

        picker.open(0);
        assert!(picker.needs_refresh(t0));
        picker.set_cursor(Some(Point::new(5, 5)), t0);
        assert!(!picker.needs_refresh(t0 + ms(49)));
        assert!(picker.needs_refresh(t0 + ms(50)));
        assert_eq!(picker.next_change(t0), Some(t0 + ms(50)));

        picker.close();
        assert!(!picker.is_open());
        assert_eq!(picker.next_change(t0), None);
    }

    #[test]
    fn test_dry_run_reveal_schedule() {
        let t0 = Instant::now();
        let points = [Point::new(1, 1), Point::new(2, 2), Point::new(3, 3)];
        let preview = DryRunPreview::new(&points, Interval::from_millis(500), t0).unwrap();

        assert_eq!(preview.visible(t0).len(), 1);
        assert_eq!(preview.visible(t0 + ms(499)).len(), 1);
        assert_eq!(preview.visible(t0 + ms(500)).len(), 2);
        assert_eq!(preview.visible(t0 + ms(1000)).len(), 3);
        assert_eq!(preview.next_change(t0 + ms(100)), Some(t0 + ms(500)));

        // 3 steps of 500 ms plus the 4 s hold
        assert_eq!(preview.ends_at(), t0 + ms(5500));
        assert_eq!(preview.visible(t0 + ms(5499)).len(), 3);
        assert!(preview.visible(t0 + ms(5500)).is_empty());
        assert!(preview.is_finished(t0 + ms(5500)));
        assert_eq!(preview.next_change(t0 + ms(5500)), None);
    }

    #[test]
    fn test_dry_run_stagger_clamped() {
        let t0 = Instant::now();
        let points = [Point::new(0, 0)];

        let fast = DryRunPreview::new(&points, Interval::from_millis(10), t0).unwrap();
        assert_eq!(fast.stagger(), ms(200));

        let slow = DryRunPreview::new(&points, Interval::new(0, 5, 0, 0), t0).unwrap();
        assert_eq!(slow.stagger(), ms(1000));
    }

    #[test]
    fn test_dry_run_needs_points() {
        assert!(DryRunPreview::new(&[], Interval::from_millis(100), Instant::now()).is_none());
    }

    #[test]
    fn test_dry_run_marker_numbers() {
        let t0 = Instant::now();
        let points = [Point::new(7, 8), Point::new(9, 10)];
        let preview = DryRunPreview::new(&points, Interval::from_millis(200), t0).unwrap();
        assert_eq!(
            preview.visible(t0 + ms(200)),
            vec![Marker { point: points[0], number: 1 }, Marker { point: points[1], number: 2 }]
        );
    }
}
