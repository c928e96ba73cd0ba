//! The region currently selected on the timeline
//!
//! Every update keeps `0 <= start <= end <= duration`. Drag and slider
//! events go through [`Selection::set_region`]; the nudge buttons move one
//! bound by a fixed step.

use crate::audio::Region;

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    region: Region,
    duration: f64,
    nudge_step: f64,
}

impl Selection {
    pub fn new(duration: f64, initial: Region, nudge_step: f64) -> Self {
        let mut selection = Self {
            region: Region::new(0.0, 0.0),
            duration: duration.max(0.0),
            nudge_step,
        };
        selection.set_region(initial.start, initial.end);
        selection
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn nudge_step(&self) -> f64 {
        self.nudge_step
    }

    /// Replace the region, e.g. after dragging a handle
    ///
    /// Bounds are ordered and clamped into `[0, duration]`. A NaN or
    /// infinite bound leaves the region unchanged.
    pub fn set_region(&mut self, start: f64, end: f64) {
        if !start.is_finite() || !end.is_finite() {
            tracing::debug!(start, end, "Ignoring non-finite region");
            return;
        }
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.region = Region::new(start, end).clamped(self.duration);
    }

    /// Apply a two-thumb slider value, snapping both thumbs to `step`
    pub fn set_from_slider(&mut self, values: [f64; 2], step: f64) {
        let snap = |v: f64| {
            if step > 0.0 {
                (v / step).round() * step
            } else {
                v
            }
        };
        self.set_region(snap(values[0]), snap(values[1]));
    }

    /// The active file changed length; keep the region inside it
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(0.0);
        self.region = self.region.clamped(self.duration);
    }

    /// "Start +": only moves while a full step remains before `end`
    pub fn nudge_start_forward(&mut self) {
        if self.region.start < self.region.end - self.nudge_step {
            self.region.start += self.nudge_step;
        }
    }

    /// "Start -": stops at zero
    pub fn nudge_start_back(&mut self) {
        if self.region.start > self.nudge_step {
            self.region.start -= self.nudge_step;
        } else {
            self.region.start = 0.0;
        }
    }

    /// "End -": only moves while a full step remains after `start`
    pub fn nudge_end_back(&mut self) {
        if self.region.end > self.region.start + self.nudge_step {
            self.region.end -= self.nudge_step;
        }
    }

    /// "End +": stops at the end of the file
    pub fn nudge_end_forward(&mut self) {
        self.region.end = (self.region.end + self.nudge_step).min(self.duration);
    }
}
