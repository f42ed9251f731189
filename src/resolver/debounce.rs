//! Debounced, generation-fenced resolution per location.
//!
//! A radius slider fires triggers far faster than resolution completes.
//! Only the last trigger inside the quiet window actually invokes the
//! orchestrator, and a monotonically increasing generation per location
//! fences out stale completions: last result wins, in-flight I/O for
//! superseded generations is simply abandoned, not cancelled.

use hashbrown::HashMap;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

use super::CoverageResolver;
use crate::models::{Coverage, LatLng};

pub type LocationId = u64;

/// Per-location lifecycle: `Idle → Pending → Resolving → Resolved |
/// ResolvedEmpty`. A new trigger while pending or resolving bumps the
/// generation and restarts the quiet window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvePhase {
    #[default]
    Idle,
    /// Awaiting the quiet window
    Pending,
    /// Request in flight
    Resolving,
    Resolved,
    ResolvedEmpty,
}

/// A completed resolution, tagged with the generation that started it.
/// Outcomes carry everything `apply` needs — no ambient state is captured
/// at trigger time.
#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    pub location_id: LocationId,
    pub generation: u64,
    pub coverage: Coverage,
}

#[derive(Default)]
struct LocationState {
    generation: u64,
    phase: ResolvePhase,
    applied: Option<Coverage>,
}

/// Coalesces rapid resolve triggers per location.
///
/// All per-location state lives in this one registry; results enter
/// through the single [`DebounceController::apply`] intake.
pub struct DebounceController {
    resolver: Arc<CoverageResolver>,
    quiet_window: Duration,
    states: Mutex<HashMap<LocationId, LocationState>>,
}

impl DebounceController {
    pub fn new(resolver: Arc<CoverageResolver>, quiet_window: Duration) -> Self {
        Self {
            resolver,
            quiet_window,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Schedule a resolve after the quiet window. Returns the generation
    /// issued for this trigger; earlier pending triggers for the same
    /// location are thereby superseded.
    pub fn trigger(
        self: &Arc<Self>,
        location_id: LocationId,
        center: LatLng,
        radius_km: f64,
    ) -> u64 {
        let generation = {
            let mut states = self.states.lock().expect("state lock poisoned");
            let state = states.entry(location_id).or_default();
            state.generation += 1;
            state.phase = ResolvePhase::Pending;
            state.generation
        };

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(controller.quiet_window).await;
            // Superseded during the quiet window: never reaches the resolver
            if !controller.begin_resolving(location_id, generation) {
                debug!(location_id, generation, "trigger superseded before resolve");
                return;
            }
            let coverage = controller.resolver.resolve(center, radius_km).await;
            controller.apply(ResolveOutcome {
                location_id,
                generation,
                coverage,
            });
        });

        generation
    }

    /// Single result intake. Applies the outcome only if its generation is
    /// still the latest issued for the location; stale results are dropped
    /// silently. Returns whether the outcome was applied.
    pub fn apply(&self, outcome: ResolveOutcome) -> bool {
        let mut states = self.states.lock().expect("state lock poisoned");
        let state = states.entry(outcome.location_id).or_default();
        if state.generation != outcome.generation {
            debug!(
                location_id = outcome.location_id,
                stale = outcome.generation,
                current = state.generation,
                "discarding stale resolve result"
            );
            return false;
        }
        state.phase = if outcome.coverage.is_empty() {
            ResolvePhase::ResolvedEmpty
        } else {
            ResolvePhase::Resolved
        };
        state.applied = Some(outcome.coverage);
        true
    }

    /// Phase for the caller's loading indicator
    pub fn phase(&self, location_id: LocationId) -> ResolvePhase {
        self.states
            .lock()
            .expect("state lock poisoned")
            .get(&location_id)
            .map(|s| s.phase)
            .unwrap_or_default()
    }

    /// Last applied coverage for a location
    pub fn current(&self, location_id: LocationId) -> Option<Coverage> {
        self.states
            .lock()
            .expect("state lock poisoned")
            .get(&location_id)
            .and_then(|s| s.applied.clone())
    }

    /// Latest generation issued for a location
    pub fn generation(&self, location_id: LocationId) -> u64 {
        self.states
            .lock()
            .expect("state lock poisoned")
            .get(&location_id)
            .map(|s| s.generation)
            .unwrap_or(0)
    }

    /// Transition to `Resolving` iff `generation` is still current
    fn begin_resolving(&self, location_id: LocationId, generation: u64) -> bool {
        let mut states = self.states.lock().expect("state lock poisoned");
        match states.get_mut(&location_id) {
            Some(state) if state.generation == generation => {
                state.phase = ResolvePhase::Resolving;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::CoverageSource;

    fn controller() -> Arc<DebounceController> {
        let resolver = Arc::new(CoverageResolver::new(&Config::default()));
        Arc::new(DebounceController::new(
            resolver,
            Duration::from_millis(10),
        ))
    }

    fn outcome(location_id: LocationId, generation: u64) -> ResolveOutcome {
        ResolveOutcome {
            location_id,
            generation,
            coverage: Coverage {
                localities: vec![],
                source: CoverageSource::Authoritative,
            },
        }
    }

    #[tokio::test]
    async fn stale_generation_is_dropped() {
        let controller = controller();
        {
            let mut states = controller.states.lock().unwrap();
            states.entry(7).or_default().generation = 2;
        }

        // Generation 2 applies, then a late generation 1 must be a no-op
        assert!(controller.apply(outcome(7, 2)));
        let after_current = controller.current(7);
        assert!(!controller.apply(outcome(7, 1)));
        assert_eq!(
            controller.current(7).map(|c| c.source),
            after_current.map(|c| c.source)
        );
        assert_eq!(controller.phase(7), ResolvePhase::ResolvedEmpty);
    }

    #[tokio::test]
    async fn triggers_bump_the_generation_and_phase() {
        let controller = controller();
        let center = LatLng::new(-37.8136, 144.9631);

        let g1 = controller.trigger(3, center, 5.0);
        let g2 = controller.trigger(3, center, 7.5);
        assert_eq!((g1, g2), (1, 2));
        assert_eq!(controller.generation(3), 2);
        assert_eq!(controller.phase(3), ResolvePhase::Pending);
    }

    #[tokio::test]
    async fn unknown_location_is_idle() {
        let controller = controller();
        assert_eq!(controller.phase(42), ResolvePhase::Idle);
        assert!(controller.current(42).is_none());
        assert_eq!(controller.generation(42), 0);
    }

    #[tokio::test]
    async fn superseded_trigger_never_begins_resolving() {
        let controller = controller();
        assert!(!controller.begin_resolving(9, 1), "no state yet");

        let center = LatLng::new(-37.8136, 144.9631);
        let g1 = controller.trigger(9, center, 5.0);
        let _g2 = controller.trigger(9, center, 6.0);
        assert!(
            !controller.begin_resolving(9, g1),
            "superseded generation must not resolve"
        );
    }
}
