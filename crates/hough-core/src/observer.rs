//! Per-peak hook for diagnostics.

use crate::point_set::PointSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeakOutcome {
    /// New shape, recorded and its support removed.
    Accepted,
    /// Same cell as an earlier shape; support removed, not reported.
    Duplicate,
}

/// Snapshot handed to a [`DetectionObserver`] after the point removal.
#[derive(Debug)]
pub struct PeakEvent<'a, S> {
    pub iteration: usize,
    pub outcome: PeakOutcome,
    pub shape: &'a S,
    pub remaining: &'a PointSet,
}

pub trait DetectionObserver<S> {
    fn on_peak(&mut self, event: &PeakEvent<'_, S>);
}

impl<S, F> DetectionObserver<S> for F
where
    F: FnMut(&PeakEvent<'_, S>),
{
    fn on_peak(&mut self, event: &PeakEvent<'_, S>) {
        self(event)
    }
}
