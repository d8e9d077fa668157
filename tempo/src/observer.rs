//! Diagnostic hook for watching the detectors settle on their indices.
//!
//! The pipeline itself never prints. Callers that want to trace a run pass an
//! observer; everyone else gets [`NullObserver`].

/// Milestones emitted while the pipeline runs, in order of occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoEvent {
    /// Start of motion settled.
    Start { idx: usize },
    /// Top of transition settled (may later be corrected).
    Top { idx: usize },
    /// Impact settled.
    Impact { idx: usize },
    /// Impact landed at or before the start, search restarted from the start.
    ImpactRetry { idx: usize },
    /// Plausibility guard replaced an implausible top.
    TopCorrected { previous: usize, idx: usize },
}

pub trait TempoObserver {
    fn on_event(&mut self, event: TempoEvent);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl TempoObserver for NullObserver {
    fn on_event(&mut self, _event: TempoEvent) {}
}

impl<F: FnMut(TempoEvent)> TempoObserver for F {
    fn on_event(&mut self, event: TempoEvent) {
        self(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_collect_events() {
        let mut events = Vec::new();
        let mut observer = |event: TempoEvent| events.push(event);

        observer.on_event(TempoEvent::Start { idx: 3 });
        observer.on_event(TempoEvent::Top { idx: 9 });

        assert_eq!(
            events,
            [TempoEvent::Start { idx: 3 }, TempoEvent::Top { idx: 9 }]
        );
    }
}
