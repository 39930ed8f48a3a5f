use crate::{
    config::ReelTiming,
    icons::{
        Icon,
        IconCatalog,
    },
    render::{
        ReelId,
        Renderer,
        TransitionEnd,
        TransitionSignal,
    },
    sequencer::SequencerSettings,
};
use std::{
    collections::{
        BTreeMap,
        HashMap,
    },
    time::Duration,
};
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    ShowCells {
        reel: ReelId,
        cells: Vec<Icon>,
    },
    Position {
        reel: ReelId,
        offset: usize,
    },
    AnimateTo {
        reel: ReelId,
        offset: usize,
        duration: Duration,
        at: Instant,
    },
    Settle {
        reel: ReelId,
    },
}

/// When the fake reports transition ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Completion {
    /// The signal is already fired when `animate_to` returns.
    #[default]
    Immediate,
    /// The signal fires on [`FakeRenderer::complete`].
    OnCommand,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeReel {
    pub cells: Vec<Icon>,
    pub offset: usize,
    pub animating: bool,
}

impl FakeReel {
    pub fn visible(&self) -> Option<&Icon> {
        self.cells.get(self.offset)
    }
}

/// In-memory rendering surface that records every call.
#[derive(Debug, Default)]
pub struct FakeRenderer {
    reels: BTreeMap<ReelId, FakeReel>,
    completion: Completion,
    pending: HashMap<ReelId, (usize, TransitionSignal)>,
    calls: Vec<RenderCall>,
}

impl FakeRenderer {
    pub fn with_reels<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reels: ids
                .into_iter()
                .map(|id| (ReelId::new(id), FakeReel::default()))
                .collect(),
            ..Self::default()
        }
    }

    /// Containers `reel1`, `reel2` and `reel3`.
    pub fn standard() -> Self {
        Self::with_reels(["reel1", "reel2", "reel3"])
    }

    pub fn completing_on_command(mut self) -> Self {
        self.completion = Completion::OnCommand;
        self
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn reel(&self, id: &str) -> Option<&FakeReel> {
        self.reels.get(&ReelId::new(id))
    }

    pub fn visible(&self, id: &str) -> Option<&Icon> {
        self.reel(id).and_then(FakeReel::visible)
    }

    /// Reels with a transition waiting for [`Self::complete`].
    pub fn pending(&self) -> Vec<ReelId> {
        let mut ids: Vec<ReelId> = self.pending.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Finish the transition on `id`. Returns false if none was running.
    pub fn complete(&mut self, id: &str) -> bool {
        let id = ReelId::new(id);
        let Some((target, signal)) = self.pending.remove(&id) else {
            return false;
        };
        if let Some(reel) = self.reels.get_mut(&id) {
            reel.offset = target;
            reel.animating = false;
        }
        signal.fire();
        true
    }

    fn reel_mut(&mut self, id: &ReelId) -> &mut FakeReel {
        self.reels
            .get_mut(id)
            .unwrap_or_else(|| panic!("render call for unknown reel {id}"))
    }
}

impl Renderer for FakeRenderer {
    fn has_reel(&self, reel: &ReelId) -> bool {
        self.reels.contains_key(reel)
    }

    fn show_cells(&mut self, reel: &ReelId, cells: &[Icon]) {
        self.reel_mut(reel).cells = cells.to_vec();
        self.calls.push(RenderCall::ShowCells {
            reel: reel.clone(),
            cells: cells.to_vec(),
        });
    }

    fn position(&mut self, reel: &ReelId, offset: usize) {
        let state = self.reel_mut(reel);
        state.offset = offset;
        state.animating = false;
        self.calls.push(RenderCall::Position {
            reel: reel.clone(),
            offset,
        });
    }

    fn animate_to(
        &mut self,
        reel: &ReelId,
        offset: usize,
        duration: Duration,
    ) -> TransitionEnd {
        self.calls.push(RenderCall::AnimateTo {
            reel: reel.clone(),
            offset,
            duration,
            at: Instant::now(),
        });
        match self.completion {
            Completion::Immediate => {
                self.reel_mut(reel).offset = offset;
                TransitionEnd::finished()
            }
            Completion::OnCommand => {
                self.reel_mut(reel).animating = true;
                let (signal, end) = TransitionEnd::channel();
                self.pending.insert(reel.clone(), (offset, signal));
                end
            }
        }
    }

    fn settle(&mut self, reel: &ReelId) {
        let state = self.reel_mut(reel);
        state.offset = 0;
        state.animating = false;
        self.calls.push(RenderCall::Settle { reel: reel.clone() });
    }
}

/// Default catalog and timing over reels `reel1..reel3`.
pub fn standard_settings() -> SequencerSettings {
    SequencerSettings {
        catalog: IconCatalog::default(),
        strip_size: 15,
        timing: ReelTiming::default(),
        reel_ids: [
            ReelId::new("reel1"),
            ReelId::new("reel2"),
            ReelId::new("reel3"),
        ],
    }
}

/// Catalog `A..E` as used in the end-to-end scenarios.
pub fn letter_catalog() -> IconCatalog {
    IconCatalog::new(["A", "B", "C", "D", "E"].map(Icon::from).to_vec())
        .expect("non-empty catalog")
}
