use crate::{
    barrier::{
        Arrival,
        CompletionBarrier,
    },
    config::ReelTiming,
    icons::{
        Icon,
        IconCatalog,
    },
    outcome::Outcome,
    reel::Strip,
    render::{
        ReelId,
        Renderer,
    },
};
use color_eyre::eyre::{
    Result,
    eyre,
};
use futures::{
    FutureExt,
    StreamExt,
    future::BoxFuture,
    stream::FuturesUnordered,
};
use itertools::Itertools;
use rand::rngs::StdRng;
use tokio::time::Instant;
use tracing::{
    debug,
    info,
    warn,
};

pub const REEL_COUNT: usize = 3;

#[derive(Debug, Clone)]
pub struct SequencerSettings {
    pub catalog: IconCatalog,
    pub strip_size: usize,
    pub timing: ReelTiming,
    pub reel_ids: [ReelId; REEL_COUNT],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinStart {
    Started { number: u64 },
    /// A spin is already in flight; nothing changed.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinEvent {
    ReelStarted { reel: usize },
    ReelSettled { reel: usize },
    SpinCompleted { number: u64 },
}

struct ActiveSpin {
    number: u64,
    started: [bool; REEL_COUNT],
    barrier: CompletionBarrier,
    starts: FuturesUnordered<BoxFuture<'static, usize>>,
    ends: FuturesUnordered<BoxFuture<'static, usize>>,
}

enum Step {
    Start(usize),
    End(usize),
}

/// Drives the reels of one machine through staged, staggered spins.
pub struct Sequencer<R> {
    renderer: R,
    catalog: IconCatalog,
    strip_size: usize,
    timing: ReelTiming,
    reel_ids: [ReelId; REEL_COUNT],
    strips: [Option<Strip>; REEL_COUNT],
    rng: StdRng,
    spins_started: u64,
    active: Option<ActiveSpin>,
}

impl<R: Renderer> Sequencer<R> {
    pub fn new(renderer: R, settings: SequencerSettings, rng: StdRng) -> Result<Self> {
        if settings.strip_size < 2 {
            return Err(eyre!(
                "a strip needs at least 2 cells, got {}",
                settings.strip_size
            ));
        }
        if !settings.reel_ids.iter().all_unique() {
            return Err(eyre!(
                "each reel needs its own container, got {}",
                settings.reel_ids.iter().join(", ")
            ));
        }
        let mut sequencer = Self {
            renderer,
            catalog: settings.catalog,
            strip_size: settings.strip_size,
            timing: settings.timing,
            reel_ids: settings.reel_ids,
            strips: std::array::from_fn(|_| None),
            rng,
            spins_started: 0,
            active: None,
        };
        sequencer.initialize()?;
        Ok(sequencer)
    }

    /// Build a strip for every reel that lacks one. Already built strips are
    /// left untouched. Fails if the surface has no container for a reel.
    pub fn initialize(&mut self) -> Result<()> {
        if let Some(missing) = self
            .reel_ids
            .iter()
            .find(|id| !self.renderer.has_reel(id))
        {
            return Err(eyre!("no reel container for {missing}"));
        }
        for (id, slot) in self.reel_ids.iter().zip(self.strips.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            let strip = Strip::random(self.strip_size, &self.catalog, &mut self.rng);
            self.renderer.show_cells(id, strip.cells());
            debug!(reel = %id, cells = strip.len(), "strip built");
            *slot = Some(strip);
        }
        Ok(())
    }

    pub fn spin(&mut self, outcome: Outcome) -> SpinStart {
        if self.active.is_some() {
            debug!("spin ignored, reels still moving");
            return SpinStart::Rejected;
        }
        self.spins_started += 1;
        let number = self.spins_started;
        info!(spin = number, outcome = %outcome, "spin started");

        let called_at = Instant::now();
        let starts = FuturesUnordered::new();
        for (index, target) in outcome.icons().iter().enumerate() {
            self.stage_reel(index, target.clone());
            let deadline = called_at + self.timing.stagger(index);
            starts.push(
                async move {
                    tokio::time::sleep_until(deadline).await;
                    index
                }
                .boxed(),
            );
        }
        self.active = Some(ActiveSpin {
            number,
            started: [false; REEL_COUNT],
            barrier: CompletionBarrier::new(REEL_COUNT),
            starts,
            ends: FuturesUnordered::new(),
        });
        SpinStart::Started { number }
    }

    // Everything up to the animated return: wrap the strip, jump so the last
    // cell is visible, then write the target into the rest cell.
    fn stage_reel(&mut self, index: usize, target: Icon) {
        let id = &self.reel_ids[index];
        let strip = self.strips[index].get_or_insert_with(|| {
            Strip::random(self.strip_size, &self.catalog, &mut self.rng)
        });
        let prev_top = strip.wrap_for_spin(&self.catalog, &mut self.rng);
        self.renderer.show_cells(id, strip.cells());
        self.renderer.position(id, strip.wrap_offset());
        strip.set_target(target);
        self.renderer.show_cells(id, strip.cells());
        debug!(reel = %id, %prev_top, target = %strip.visible(), "reel staged");
    }

    /// Kick off reel `index`'s transition back to rest. Normally called by
    /// [`Self::next_event`] once the reel's stagger delay has elapsed.
    pub fn start_reel(&mut self, index: usize) -> Option<SpinEvent> {
        let Some(active) = self.active.as_mut() else {
            warn!(reel = index, "start requested with no spin in flight");
            return None;
        };
        match active.started.get_mut(index) {
            Some(started) if !*started => *started = true,
            _ => {
                warn!(reel = index, "reel already started or unknown");
                return None;
            }
        }
        let id = &self.reel_ids[index];
        let end = self.renderer.animate_to(id, 0, self.timing.duration());
        active.ends.push(end.map(move |()| index).boxed());
        debug!(reel = %id, "reel transition started");
        Some(SpinEvent::ReelStarted { reel: index })
    }

    /// Handle the end of reel `index`'s transition: pin it at rest and count
    /// it. The spin is released when the last reel arrives.
    pub fn reel_settled(&mut self, index: usize) -> Option<SpinEvent> {
        let Some(active) = self.active.as_mut() else {
            warn!(reel = index, "transition end with no spin in flight");
            return None;
        };
        if !active.started.get(index).copied().unwrap_or(false) {
            warn!(reel = index, "transition end for a reel that never started");
            return None;
        }
        let arrival = active.barrier.arrive(index);
        if arrival == Arrival::Ignored {
            warn!(reel = index, "duplicate transition end");
            return None;
        }
        let id = &self.reel_ids[index];
        self.renderer.settle(id);
        debug!(reel = %id, "reel settled");
        if arrival != Arrival::Released {
            return Some(SpinEvent::ReelSettled { reel: index });
        }
        let number = active.number;
        self.active = None;
        info!(spin = number, "spin complete");
        Some(SpinEvent::SpinCompleted { number })
    }

    /// Wait for the next timer or transition end of the spin in flight.
    /// Never resolves while idle.
    pub async fn next_event(&mut self) -> SpinEvent {
        loop {
            let step = match self.active.as_mut() {
                None => return std::future::pending().await,
                Some(active) => tokio::select! {
                    Some(index) = active.starts.next() => Step::Start(index),
                    Some(index) = active.ends.next() => Step::End(index),
                    else => return std::future::pending().await,
                },
            };
            let event = match step {
                Step::Start(index) => self.start_reel(index),
                Step::End(index) => self.reel_settled(index),
            };
            if let Some(event) = event {
                return event;
            }
        }
    }

    /// Run the spin in flight to completion and return its number.
    pub async fn finish(&mut self) -> Option<u64> {
        self.active.as_ref()?;
        loop {
            if let SpinEvent::SpinCompleted { number } = self.next_event().await {
                return Some(number);
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    pub fn spins_started(&self) -> u64 {
        self.spins_started
    }

    /// Reels still moving in the current spin.
    pub fn reels_in_motion(&self) -> usize {
        self.active
            .as_ref()
            .map_or(0, |active| active.barrier.remaining())
    }

    pub fn visible(&self, index: usize) -> Option<&Icon> {
        self.strip(index).map(Strip::visible)
    }

    pub fn strip(&self, index: usize) -> Option<&Strip> {
        self.strips.get(index).and_then(Option::as_ref)
    }

    pub fn reel_ids(&self) -> &[ReelId; REEL_COUNT] {
        &self.reel_ids
    }

    pub fn catalog(&self) -> &IconCatalog {
        &self.catalog
    }

    pub fn timing(&self) -> ReelTiming {
        self.timing
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
