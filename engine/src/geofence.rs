//! The zone state machine.
//!
//! One `GeofenceEngine` per monitoring session.  For every sample and every zone, in registry
//! order, we compute whether the position is inside (boundary included) and emit an event only
//! when that differs from what we had before.  A zone never seen counts as outside, so the first
//! evaluation can produce `Entered` but never `Exited`.
//!
//! There is no hysteresis, a position dancing on the boundary gives one event per crossing.
//!

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    distance_meters, PositionSample, SourceStatus, StatusSnapshot, TransitionEvent,
    TransitionKind, ZoneRegistry, ZoneRow,
};

#[derive(Debug)]
pub struct GeofenceEngine {
    registry: Arc<ZoneRegistry>,
    /// Zone id -> last known inside/outside
    membership: BTreeMap<String, bool>,
}

impl GeofenceEngine {
    /// Fresh session, no membership known.
    ///
    pub fn new(registry: Arc<ZoneRegistry>) -> Self {
        GeofenceEngine {
            registry,
            membership: BTreeMap::new(),
        }
    }

    pub fn registry(&self) -> Arc<ZoneRegistry> {
        self.registry.clone()
    }

    /// Evaluate one sample against every zone, returns the transitions in registry order.
    ///
    #[tracing::instrument(skip(self), fields(at = %sample.captured_at, pos = %sample.coordinate))]
    pub fn evaluate(&mut self, sample: &PositionSample) -> Vec<TransitionEvent> {
        trace!("enter");

        let mut events = vec![];
        for zone in self.registry.list() {
            let d = distance_meters(&sample.coordinate, &zone.center);
            let inside = d <= zone.radius;
            let was_inside = self.membership.get(&zone.id).copied().unwrap_or(false);

            trace!("{}: {d:.1} m, inside={inside}", zone.id);

            if inside != was_inside {
                let kind = if inside {
                    TransitionKind::Entered
                } else {
                    TransitionKind::Exited
                };
                debug!("{} {kind} at {d:.1} m", zone.label);
                events.push(TransitionEvent {
                    zone_id: zone.id.clone(),
                    zone_label: zone.label.clone(),
                    kind,
                    at: sample.captured_at,
                });
            }
            self.membership.insert(zone.id.clone(), inside);
        }
        events
    }

    /// Read-only copy of the membership state.
    ///
    pub fn current_status(&self) -> BTreeMap<String, bool> {
        self.membership.clone()
    }

    /// `None` before the first evaluation
    ///
    pub fn is_inside(&self, id: &str) -> Option<bool> {
        self.membership.get(id).copied()
    }

    /// Rows for display, registry order.
    ///
    pub fn snapshot(&self, source: SourceStatus) -> StatusSnapshot {
        let zones = self
            .registry
            .list()
            .iter()
            .map(|zone| ZoneRow {
                id: zone.id.clone(),
                label: zone.label.clone(),
                radius: zone.radius,
                inside: self.is_inside(&zone.id).unwrap_or(false),
            })
            .collect();
        StatusSnapshot { source, zones }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::{Coordinate, Zone, EARTH_RADIUS};

    const HUB: (f64, f64) = (40.7589, -73.9851);

    #[fixture]
    fn registry() -> Arc<ZoneRegistry> {
        Arc::new(
            ZoneRegistry::new(vec![
                Zone::new("1", "Central Park", Coordinate::new(40.7829, -73.9654), 500.),
                Zone::new("2", "Tech Hub", Coordinate::from(HUB), 300.),
                Zone::new("3", "Shopping District", Coordinate::new(40.7505, -73.9934), 400.),
            ])
            .unwrap(),
        )
    }

    fn sample(pos: (f64, f64)) -> PositionSample {
        PositionSample::new(
            Coordinate::from(pos),
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        )
    }

    /// Point `meters` due north of `pos`.
    fn north_of(pos: (f64, f64), meters: f64) -> (f64, f64) {
        (pos.0 + (meters / EARTH_RADIUS).to_degrees(), pos.1)
    }

    #[rstest]
    fn test_empty_before_first_evaluation(registry: Arc<ZoneRegistry>) {
        let engine = GeofenceEngine::new(registry);
        assert!(engine.current_status().is_empty());
        assert_eq!(None, engine.is_inside("2"));
    }

    #[rstest]
    fn test_center_enters_on_first_evaluation(registry: Arc<ZoneRegistry>) {
        let mut engine = GeofenceEngine::new(registry);
        let s = sample(HUB);

        let ev = engine.evaluate(&s);
        assert_eq!(1, ev.len());
        assert_eq!("2", ev[0].zone_id);
        assert_eq!("Tech Hub", ev[0].zone_label);
        assert_eq!(TransitionKind::Entered, ev[0].kind);
        assert_eq!(s.captured_at, ev[0].at);

        // Every zone has an entry now
        let status = engine.current_status();
        assert_eq!(3, status.len());
        assert_eq!(Some(&true), status.get("2"));
        assert_eq!(Some(&false), status.get("1"));
        assert_eq!(Some(&false), status.get("3"));
    }

    #[rstest]
    fn test_first_evaluation_outside_is_silent(registry: Arc<ZoneRegistry>) {
        let mut engine = GeofenceEngine::new(registry);

        let ev = engine.evaluate(&sample((48.8566, 2.3522)));
        assert!(ev.is_empty());
        assert_eq!(Some(false), engine.is_inside("2"));
    }

    #[rstest]
    fn test_stay_inside_single_event(registry: Arc<ZoneRegistry>) {
        let mut engine = GeofenceEngine::new(registry);

        assert_eq!(1, engine.evaluate(&sample(HUB)).len());
        assert!(engine.evaluate(&sample(north_of(HUB, 50.))).is_empty());
    }

    #[rstest]
    fn test_exit(registry: Arc<ZoneRegistry>) {
        let mut engine = GeofenceEngine::new(registry);

        engine.evaluate(&sample(HUB));
        let ev = engine.evaluate(&sample(north_of(HUB, 1_000.)));

        let exits: Vec<_> = ev.iter().filter(|e| e.kind == TransitionKind::Exited).collect();
        assert_eq!(1, exits.len());
        assert_eq!("2", exits[0].zone_id);
        assert_eq!(Some(&false), engine.current_status().get("2"));
    }

    #[rstest]
    #[case(300.0, true)]
    #[case(299.5, true)]
    #[case(300.5, false)]
    fn test_boundary_inclusive(registry: Arc<ZoneRegistry>, #[case] meters: f64, #[case] inside: bool) {
        let mut engine = GeofenceEngine::new(registry);
        let pos = Coordinate::from(north_of(HUB, meters));

        // Make sure the test point lands where we think it does
        let d = distance_meters(&pos, &Coordinate::from(HUB));
        assert!((d - meters).abs() < 1e-6);

        engine.evaluate(&sample((pos.lat, pos.lon)));
        assert_eq!(Some(inside), engine.is_inside("2"));
    }

    #[test]
    fn test_boundary_exact_radius() {
        let center = Coordinate::from(HUB);
        let edge = Coordinate::from(north_of(HUB, 300.));
        let radius = distance_meters(&edge, &center);

        let reg = ZoneRegistry::new(vec![Zone::new("e", "Edge", center, radius)]).unwrap();
        let mut engine = GeofenceEngine::new(Arc::new(reg));

        let ev = engine.evaluate(&sample((edge.lat, edge.lon)));
        assert_eq!(1, ev.len());
        assert_eq!(TransitionKind::Entered, ev[0].kind);
    }

    #[rstest]
    fn test_new_session_forgets(registry: Arc<ZoneRegistry>) {
        let mut engine = GeofenceEngine::new(registry.clone());
        engine.evaluate(&sample(HUB));
        engine.evaluate(&sample(north_of(HUB, 1_000.)));

        let mut engine = GeofenceEngine::new(registry);
        let ev = engine.evaluate(&sample(HUB));
        assert_eq!(1, ev.len());
        assert_eq!(TransitionKind::Entered, ev[0].kind);
    }

    #[rstest]
    fn test_oscillation_one_event_per_crossing(registry: Arc<ZoneRegistry>) {
        let mut engine = GeofenceEngine::new(registry);
        let inside = sample(north_of(HUB, 299.));
        let outside = sample(north_of(HUB, 301.));

        let mut kinds = vec![];
        for s in [&inside, &outside, &inside, &outside] {
            kinds.extend(engine.evaluate(s).into_iter().map(|e| e.kind));
        }
        assert_eq!(
            vec![
                TransitionKind::Entered,
                TransitionKind::Exited,
                TransitionKind::Entered,
                TransitionKind::Exited
            ],
            kinds
        );
    }

    #[test]
    fn test_events_in_registry_order() {
        // Two overlapping zones, listed "b" first
        let c = Coordinate::from(HUB);
        let reg = ZoneRegistry::new(vec![
            Zone::new("b", "B", c, 100.),
            Zone::new("a", "A", c, 200.),
        ])
        .unwrap();
        let mut engine = GeofenceEngine::new(Arc::new(reg));

        let ids: Vec<_> = engine.evaluate(&sample(HUB)).into_iter().map(|e| e.zone_id).collect();
        assert_eq!(vec!["b", "a"], ids);

        let ids: Vec<_> = engine
            .evaluate(&sample(north_of(HUB, 1_000.)))
            .into_iter()
            .map(|e| e.zone_id)
            .collect();
        assert_eq!(vec!["b", "a"], ids);
    }

    #[rstest]
    fn test_snapshot(registry: Arc<ZoneRegistry>) {
        let mut engine = GeofenceEngine::new(registry);
        engine.evaluate(&sample(HUB));

        let snap = engine.snapshot(SourceStatus::ActiveFix);
        assert_eq!(SourceStatus::ActiveFix, snap.source);
        let inside: Vec<bool> = snap.zones.iter().map(|z| z.inside).collect();
        assert_eq!(vec![false, true, false], inside);
    }
}
