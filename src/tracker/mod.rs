//! Invocation Tracker: drives matchers through each invocation's lifecycle.
//!
//! ```text
//! PENDING --begin/resolve--> RUNNING --finish--> FINISHING --> DONE
//!                               |
//!                               +--abandon--> (released, no on_finish)
//! ```
//!
//! - PENDING: matchers are resolved; fast ones get `on_start` immediately and
//!   are dropped if it returns false.
//! - RUNNING: rows are assembled into lines and each line is delivered to
//!   every active matcher in registration order.
//! - FINISHING: deferred (buffered) matchers are started with the exit code
//!   and replay the retained lines; then `on_finish` runs once per eligible
//!   matcher, in order.
//! - DONE: per-invocation state is released. Regions stay in the index.
//!
//! A running invocation retains every row it has received, so its memory
//! grows with its output until it finishes or is abandoned.
//!
//! A matcher that errors or panics in any hook is deactivated for the rest
//! of the invocation without affecting the others.


use crate::invocation::{CommandInvocation, InvocationId};
use crate::line::{LineAssembler, OutputLine};
use crate::matcher::{FinishPolicy, Flow, LineMatcher, MatcherError, guarded};
use crate::region::{RegionContext, RegionIndex};
use crate::registry::MatcherRegistry;
use par_annotate_config::{Config, MetadataLimits, TrackerSettings};
use std::collections::HashMap;

/// Errors returned by tracker operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    #[error("unknown invocation {0}")]
    UnknownInvocation(InvocationId),
    #[error("invocation {0} already finished or abandoned")]
    AlreadyFinished(InvocationId),
}

/// Lifecycle phase of a tracked invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Running,
    Finishing,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    /// Buffered matcher waiting for completion before `on_start`.
    Deferred,
    Active,
    /// Returned `Flow::Stop`.
    Stopped,
    /// Errored or panicked; receives nothing further.
    Faulted,
    /// Deferred `on_start` returned false.
    Declined,
}

struct Slot {
    name: String,
    finish_policy: FinishPolicy,
    matcher: Box<dyn LineMatcher>,
    state: SlotState,
}

impl Slot {
    fn wants_finish(&self) -> bool {
        match self.state {
            SlotState::Active => true,
            SlotState::Stopped => self.finish_policy == FinishPolicy::Always,
            _ => false,
        }
    }

    fn fault(&mut self, id: InvocationId, hook: &str, err: MatcherError) {
        log::warn!(
            "Matcher {} deactivated for {} after {} failed: {}",
            self.name,
            id,
            hook,
            err
        );
        self.state = SlotState::Faulted;
    }

    /// Deliver one line, updating the slot state.
    fn deliver(
        &mut self,
        regions: &mut RegionIndex,
        limits: MetadataLimits,
        id: InvocationId,
        rows: &[String],
        line: &OutputLine,
    ) {
        let mut ctx = RegionContext::new(regions, id, &self.name, limits, rows, Some(line));
        let matcher = &mut self.matcher;
        match guarded(|| matcher.on_line(&mut ctx, line)) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Stop) => {
                crate::debug_log!(
                    "TRACKER",
                    "{} stopped at rows {}..={} of {}",
                    self.name,
                    line.start_row,
                    line.end_row,
                    id
                );
                self.state = SlotState::Stopped;
            }
            Err(e) => self.fault(id, "on_line", e),
        }
    }
}

struct TrackedInvocation {
    invocation: CommandInvocation,
    phase: Phase,
    slots: Vec<Slot>,
    assembler: LineAssembler,
    /// Every physical row received, so row-addressed regions can be checked
    /// against any earlier row. Grows with the output until finish or abandon.
    rows: Vec<String>,
    /// Retained for deferred matchers only.
    lines: Vec<OutputLine>,
}

impl TrackedInvocation {
    fn has_deferred(&self) -> bool {
        self.slots.iter().any(|s| s.state == SlotState::Deferred)
    }

    fn deliver(
        &mut self,
        regions: &mut RegionIndex,
        limits: MetadataLimits,
        id: InvocationId,
        line: OutputLine,
    ) {
        crate::debug_trace!(
            "TRACKER",
            "{} line rows {}..={}: {:?}",
            id,
            line.start_row,
            line.end_row,
            line.text
        );
        for slot in self
            .slots
            .iter_mut()
            .filter(|s| s.state == SlotState::Active)
        {
            slot.deliver(regions, limits, id, &self.rows, &line);
        }
        if self.has_deferred() {
            self.lines.push(line);
        }
    }
}

/// Orchestrates matcher lifecycles for any number of concurrent invocations.
pub struct InvocationTracker {
    registry: MatcherRegistry,
    regions: RegionIndex,
    defer_buffered: bool,
    limits: MetadataLimits,
    invocations: HashMap<InvocationId, TrackedInvocation>,
    next_id: u64,
}

impl InvocationTracker {
    /// Take ownership of `registry` and seal it.
    pub fn new(
        mut registry: MatcherRegistry,
        settings: &TrackerSettings,
        limits: MetadataLimits,
    ) -> Self {
        registry.seal();
        Self {
            registry,
            regions: RegionIndex::new(),
            defer_buffered: settings.defer_buffered_matchers,
            limits,
            invocations: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn from_config(registry: MatcherRegistry, config: &Config) -> Self {
        Self::new(registry, &config.tracker, config.limits)
    }

    pub fn registry(&self) -> &MatcherRegistry {
        &self.registry
    }

    pub fn regions(&self) -> &RegionIndex {
        &self.regions
    }

    /// Mutable access for host-driven eviction.
    pub fn regions_mut(&mut self) -> &mut RegionIndex {
        &mut self.regions
    }

    /// Number of invocations currently tracked.
    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    /// Current phase; `Done` for released invocations, `None` if never issued.
    pub fn phase(&self, id: InvocationId) -> Option<Phase> {
        match self.invocations.get(&id) {
            Some(tracked) => Some(tracked.phase),
            None if id.0 > 0 && id.0 < self.next_id => Some(Phase::Done),
            None => None,
        }
    }

    /// Names of matchers still consuming (or waiting for) lines.
    pub fn active_matchers(&self, id: InvocationId) -> Vec<&str> {
        self.invocations
            .get(&id)
            .map(|t| {
                t.slots
                    .iter()
                    .filter(|s| matches!(s.state, SlotState::Active | SlotState::Deferred))
                    .map(|s| s.name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Start tracking an invocation and resolve its matchers.
    pub fn begin(&mut self, invocation: CommandInvocation) -> InvocationId {
        let id = InvocationId(self.next_id);
        self.next_id += 1;

        let mut tracked = TrackedInvocation {
            invocation,
            phase: Phase::Pending,
            slots: Vec::new(),
            assembler: LineAssembler::new(),
            rows: Vec::new(),
            lines: Vec::new(),
        };

        for resolved in self.registry.resolve(id, &tracked.invocation) {
            let mut slot = Slot {
                name: resolved.name,
                finish_policy: resolved.finish_policy,
                matcher: resolved.matcher,
                state: SlotState::Active,
            };

            if !resolved.fast && self.defer_buffered {
                slot.state = SlotState::Deferred;
                tracked.slots.push(slot);
                continue;
            }

            let invocation = &tracked.invocation;
            let matcher = &mut slot.matcher;
            match guarded(|| matcher.on_start(invocation)) {
                Ok(true) => tracked.slots.push(slot),
                Ok(false) => {
                    crate::debug_log!("TRACKER", "{} declined {} at start", slot.name, id);
                }
                Err(e) => slot.fault(id, "on_start", e),
            }
        }

        crate::debug_info!(
            "TRACKER",
            "begin {} {:?}: {} matcher(s)",
            id,
            tracked.invocation.command,
            tracked.slots.len()
        );
        tracked.phase = Phase::Running;
        self.invocations.insert(id, tracked);
        id
    }

    fn check_running(&self, id: InvocationId) -> Result<(), TrackerError> {
        if self.invocations.contains_key(&id) {
            Ok(())
        } else if id.0 > 0 && id.0 < self.next_id {
            Err(TrackerError::AlreadyFinished(id))
        } else {
            Err(TrackerError::UnknownInvocation(id))
        }
    }

    /// Feed one physical row. `wraps` marks a row continued on the next one.
    pub fn push_row(
        &mut self,
        id: InvocationId,
        text: &str,
        wraps: bool,
    ) -> Result<(), TrackerError> {
        self.check_running(id)?;
        let limits = self.limits;
        let Some(tracked) = self.invocations.get_mut(&id) else {
            return Err(TrackerError::AlreadyFinished(id));
        };

        tracked.rows.push(text.to_string());
        if let Some(line) = tracked.assembler.push_row(text, wraps) {
            tracked.deliver(&mut self.regions, limits, id, line);
        }
        Ok(())
    }

    /// Feed one unwrapped row.
    pub fn push_line(&mut self, id: InvocationId, text: &str) -> Result<(), TrackerError> {
        self.push_row(id, text, false)
    }

    /// Complete an invocation: run deferred matchers and finalize hooks,
    /// then release its state.
    pub fn finish(
        &mut self,
        id: InvocationId,
        exit_code: i32,
        total_rows: usize,
    ) -> Result<(), TrackerError> {
        self.check_running(id)?;
        let Some(mut tracked) = self.invocations.remove(&id) else {
            return Err(TrackerError::AlreadyFinished(id));
        };
        let limits = self.limits;
        let regions = &mut self.regions;

        if let Some(line) = tracked.assembler.flush() {
            tracked.deliver(regions, limits, id, line);
        }
        tracked.invocation.exit_code = Some(exit_code);
        tracked.phase = Phase::Finishing;

        let TrackedInvocation {
            invocation,
            slots,
            rows,
            lines,
            ..
        } = &mut tracked;

        for slot in slots.iter_mut() {
            if slot.state == SlotState::Deferred {
                let matcher = &mut slot.matcher;
                match guarded(|| matcher.on_start(invocation)) {
                    Ok(true) => {
                        slot.state = SlotState::Active;
                        for line in lines.iter() {
                            if slot.state != SlotState::Active {
                                break;
                            }
                            slot.deliver(regions, limits, id, rows, line);
                        }
                    }
                    Ok(false) => {
                        crate::debug_log!(
                            "TRACKER",
                            "{} declined {} (exit code {})",
                            slot.name,
                            id,
                            exit_code
                        );
                        slot.state = SlotState::Declined;
                    }
                    Err(e) => slot.fault(id, "on_start", e),
                }
            }

            if slot.wants_finish() {
                let mut ctx = RegionContext::new(regions, id, &slot.name, limits, rows, None);
                let matcher = &mut slot.matcher;
                if let Err(e) = guarded(|| matcher.on_finish(&mut ctx, total_rows)) {
                    slot.fault(id, "on_finish", e);
                }
            }
        }

        tracked.phase = Phase::Done;
        crate::debug_info!(
            "TRACKER",
            "finished {} (exit code {}, {} rows, {} regions)",
            id,
            exit_code,
            total_rows,
            self.regions.regions_for_invocation(id).count()
        );
        Ok(())
    }

    /// Drop an invocation without running finalize hooks.
    pub fn abandon(&mut self, id: InvocationId) -> Result<(), TrackerError> {
        self.check_running(id)?;
        self.invocations.remove(&id);
        crate::debug_info!("TRACKER", "abandoned {}", id);
        Ok(())
    }
}
