use anyhow::Result;
use phoenix_core::{
    Economy, MilestoneEvent, MilestoneTracker, PlayerState, SaveDebouncer, perform_rebirth,
    purchase_upgrade,
};
use serde::Serialize;

use crate::logic::policy::{PolicyDecision, PurchasePolicy, SessionStrategy};

/// Delay between session start and the Phoenix arrival event.
pub const PHOENIX_ARRIVAL_MS: i64 = 900;

/// Configuration for a simulated idle session.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: SessionStrategy,
    pub duration_ms: i64,
    pub frame_ms: i64,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(strategy: SessionStrategy, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            duration_ms: 10 * 60 * 1_000,
            frame_ms: 200,
        }
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = duration_ms.max(0);
        self
    }

    #[must_use]
    pub fn with_frame_ms(mut self, frame_ms: i64) -> Self {
        self.frame_ms = frame_ms.max(1);
        self
    }
}

/// A purchase or rebirth taken by the policy.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub at_ms: i64,
    pub action: String,
    pub policy_name: String,
    pub rationale: Option<String>,
}

/// Result of advancing the session by one frame.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub at_ms: i64,
    pub taps: u32,
    pub decisions: Vec<DecisionRecord>,
    pub milestone: Option<MilestoneEvent>,
    pub autosave_due: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub strategy: SessionStrategy,
    pub seed: u64,
    pub elapsed_ms: i64,
    pub frames: u64,
    pub taps: u64,
    pub purchases: u64,
    pub rebirths: u64,
    pub autosaves: u64,
    pub peak_sparks_per_second: f64,
    pub final_state: PlayerState,
    pub milestones: Vec<MilestoneEvent>,
    pub decisions: Vec<DecisionRecord>,
}

/// Deterministic idle session driven on a simulated clock.
pub struct SimulationSession {
    config: SimulationConfig,
    economy: Economy,
    state: PlayerState,
    started_ms: i64,
    clock_ms: i64,
    milestones: MilestoneTracker,
    debouncer: SaveDebouncer,
}

impl SimulationSession {
    pub fn new(
        config: SimulationConfig,
        economy: Economy,
        state: PlayerState,
        start_ms: i64,
    ) -> Self {
        Self {
            config,
            economy,
            state,
            started_ms: start_ms,
            clock_ms: start_ms,
            milestones: MilestoneTracker::new(),
            debouncer: SaveDebouncer::default(),
        }
    }

    #[must_use]
    pub fn with_milestones(mut self, milestones: MilestoneTracker) -> Self {
        self.milestones = milestones;
        self
    }

    #[must_use]
    pub fn milestones(&self) -> &MilestoneTracker {
        &self.milestones
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.clock_ms - self.started_ms >= self.config.duration_ms
    }

    pub fn advance(&mut self, policy: &mut dyn PurchasePolicy) -> FrameOutcome {
        self.clock_ms += self.config.frame_ms;
        let now = self.clock_ms;
        self.state = self.economy.tick(&self.state, now);

        let PolicyDecision {
            taps,
            purchase,
            rebirth,
            rationale,
        } = policy.decide(&self.state, &self.economy);

        for _ in 0..taps {
            self.state = self.economy.tap(&self.state);
        }

        let mut decisions = Vec::new();
        let mut record = |action: String| {
            decisions.push(DecisionRecord {
                at_ms: now,
                action,
                policy_name: policy.name().to_string(),
                rationale: rationale.clone(),
            });
        };

        if rebirth {
            let reborn = perform_rebirth(&self.state, now);
            if reborn != self.state {
                record(format!("rebirth +{} ash", reborn.phoenix_ash - self.state.phoenix_ash));
                self.state = reborn;
            }
        } else if let Some(key) = purchase {
            let bought = purchase_upgrade(&self.state, key);
            if bought != self.state {
                record(format!("buy {key} -> lvl {}", bought.level(key)));
                self.state = bought;
            }
        }

        let milestone = if now - self.started_ms >= PHOENIX_ARRIVAL_MS {
            self.milestones.trigger_first_flame()
        } else {
            None
        };

        self.debouncer.mark_dirty(now);
        FrameOutcome {
            at_ms: now,
            taps,
            decisions,
            milestone,
            autosave_due: self.debouncer.take_due(now),
        }
    }

    /// Run to completion, handing each due save to `autosave`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `autosave`.
    pub fn run<F>(
        &mut self,
        policy: &mut dyn PurchasePolicy,
        mut autosave: F,
    ) -> Result<SimulationSummary>
    where
        F: FnMut(&PlayerState) -> Result<()>,
    {
        let mut summary = SimulationSummary {
            strategy: self.config.strategy,
            seed: self.config.seed,
            elapsed_ms: 0,
            frames: 0,
            taps: 0,
            purchases: 0,
            rebirths: 0,
            autosaves: 0,
            peak_sparks_per_second: self.economy.sparks_per_second(&self.state),
            final_state: self.state.clone(),
            milestones: Vec::new(),
            decisions: Vec::new(),
        };

        while !self.is_finished() {
            let outcome = self.advance(policy);
            summary.frames += 1;
            summary.taps += u64::from(outcome.taps);
            for decision in &outcome.decisions {
                if decision.action.starts_with("rebirth") {
                    summary.rebirths += 1;
                } else {
                    summary.purchases += 1;
                }
            }
            summary.decisions.extend(outcome.decisions);
            if let Some(event) = outcome.milestone {
                log::debug!(
                    "milestone '{}' fired {} ms into the session",
                    event.quest_id,
                    outcome.at_ms - self.started_ms
                );
                summary.milestones.push(event);
            }
            summary.peak_sparks_per_second = summary
                .peak_sparks_per_second
                .max(self.economy.sparks_per_second(&self.state));
            if outcome.autosave_due {
                autosave(&self.state)?;
                summary.autosaves += 1;
            }
        }

        if self.debouncer.is_dirty() {
            autosave(&self.state)?;
            summary.autosaves += 1;
        }

        log::debug!(
            "session {} seed {} finished after {} frames",
            self.config.strategy,
            self.config.seed,
            summary.frames
        );
        summary.elapsed_ms = self.clock_ms - self.started_ms;
        summary.final_state = self.state.clone();
        Ok(summary)
    }
}
