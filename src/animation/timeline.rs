//! Time-ordered events with begin, progress and end phases

/// Phase of a timeline event reported to the update handler
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventPhase {
    Begin,
    /// Fraction of the event's duration elapsed, in [0, 1)
    Update(f32),
    End,
}

#[derive(Clone, Debug)]
struct TimelineEvent<T> {
    at: f32,
    duration: f32,
    payload: T,
}

/// Events scheduled on a fixed-length timeline.
///
/// Events start in time order; at most one event is active at a time, and a
/// new event ends the active one.
#[derive(Clone, Debug)]
pub struct Timeline<T> {
    events: Vec<TimelineEvent<T>>,
    duration: f32,
    time: f32,
    active: Option<usize>,
    active_elapsed: f32,
    next: usize,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            duration: 0.0,
            time: 0.0,
            active: None,
            active_elapsed: 0.0,
            next: 0,
        }
    }
}

impl<T> Timeline<T> {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Schedule `payload` at `at` seconds, lasting `duration` seconds.
    ///
    /// Returns `false` when `at` lies at or past the end of the timeline.
    pub fn add_event(&mut self, at: f32, duration: f32, payload: T) -> bool {
        if at >= self.duration {
            log::info!(
                "Can't add an event after the end of the timeline: {} >= {}",
                at,
                self.duration
            );
            return false;
        }

        let index = self.events.partition_point(|e| e.at <= at);
        self.events.insert(index, TimelineEvent { at, duration, payload });
        true
    }

    /// Rewind to the start
    pub fn start(&mut self) {
        self.time = 0.0;
        self.active = None;
        self.active_elapsed = 0.0;
        self.next = 0;
    }

    /// Advance by `delta` seconds, reporting event phases to `handler`.
    ///
    /// Returns `true` once the end of the timeline is reached. Events due by
    /// then still begin, and every event is ended before returning.
    pub fn update(&mut self, delta: f32, mut handler: impl FnMut(&T, EventPhase)) -> bool {
        self.time += delta;
        self.active_elapsed += delta;
        let ended = self.time >= self.duration;

        if let Some(active) = self.active {
            let event = &self.events[active];
            if ended || self.active_elapsed >= event.duration {
                handler(&event.payload, EventPhase::End);
                self.active = None;
            } else {
                handler(&event.payload, EventPhase::Update(self.active_elapsed / event.duration));
            }
        }

        while let Some(event) = self.events.get(self.next) {
            if event.at > self.time {
                break;
            }

            if let Some(active) = self.active.take() {
                handler(&self.events[active].payload, EventPhase::End);
            }

            let event = &self.events[self.next];
            handler(&event.payload, EventPhase::Begin);
            self.active = Some(self.next);
            self.active_elapsed = self.time - event.at;
            self.next += 1;
        }

        if ended {
            if let Some(active) = self.active.take() {
                handler(&self.events[active].payload, EventPhase::End);
            }
        }

        ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timeline: &mut Timeline<&'static str>, delta: f32) -> (bool, Vec<(&'static str, EventPhase)>) {
        let mut fired = Vec::new();
        let ended = timeline.update(delta, |name, phase| fired.push((*name, phase)));
        (ended, fired)
    }

    #[test]
    fn test_rejects_late_events() {
        let mut timeline = Timeline::new(1.0);
        assert!(timeline.add_event(0.5, 0.1, "a"));
        assert!(!timeline.add_event(1.0, 0.1, "b"));
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_event_phases() {
        let mut timeline = Timeline::new(4.0);
        timeline.add_event(1.0, 2.0, "blend");
        timeline.start();

        let (_, fired) = record(&mut timeline, 0.5);
        assert!(fired.is_empty());

        let (_, fired) = record(&mut timeline, 0.5);
        assert_eq!(fired, vec![("blend", EventPhase::Begin)]);

        let (_, fired) = record(&mut timeline, 1.0);
        assert_eq!(fired, vec![("blend", EventPhase::Update(0.5))]);

        let (ended, fired) = record(&mut timeline, 1.0);
        assert_eq!(fired, vec![("blend", EventPhase::End)]);
        assert!(!ended);

        let (ended, _) = record(&mut timeline, 1.0);
        assert!(ended);
    }

    #[test]
    fn test_events_start_in_time_order() {
        let mut timeline = Timeline::new(3.0);
        timeline.add_event(2.0, 0.5, "second");
        timeline.add_event(0.5, 0.5, "first");
        timeline.start();

        let (_, fired) = record(&mut timeline, 2.5);
        assert_eq!(
            fired,
            vec![
                ("first", EventPhase::Begin),
                ("first", EventPhase::End),
                ("second", EventPhase::Begin),
            ]
        );
    }

    #[test]
    fn test_end_of_timeline_closes_events() {
        let mut timeline = Timeline::new(2.0);
        timeline.add_event(0.0, 5.0, "long");
        timeline.add_event(1.9, 0.5, "late");
        timeline.start();

        let (_, fired) = record(&mut timeline, 0.5);
        assert_eq!(fired, vec![("long", EventPhase::Begin)]);

        let (ended, fired) = record(&mut timeline, 1.5);
        assert!(ended);
        assert_eq!(
            fired,
            vec![
                ("long", EventPhase::End),
                ("late", EventPhase::Begin),
                ("late", EventPhase::End),
            ]
        );
    }

    #[test]
    fn test_restart() {
        let mut timeline = Timeline::new(1.0);
        timeline.add_event(0.0, 0.0, "tick");
        timeline.start();
        let (_, fired) = record(&mut timeline, 0.1);
        assert_eq!(fired.len(), 1);

        timeline.start();
        assert_eq!(timeline.time(), 0.0);
        let (_, fired) = record(&mut timeline, 0.1);
        assert_eq!(fired, vec![("tick", EventPhase::Begin)]);
    }
}
