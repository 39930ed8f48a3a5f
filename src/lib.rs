pub mod barrier;
pub mod config;
pub mod icons;
pub mod machine;
pub mod outcome;
pub mod reel;
pub mod render;
pub mod sequencer;

pub mod test_helpers;

pub use crate::{
    barrier::{
        Arrival,
        CompletionBarrier,
    },
    config::{
        MachineConfig,
        ReelTiming,
    },
    icons::{
        Icon,
        IconCatalog,
    },
    machine::{
        Pull,
        SlotMachine,
    },
    outcome::{
        ForcedOutcome,
        MatchKind,
        Outcome,
        OutcomePolicy,
        random_avoiding_triple,
    },
    reel::Strip,
    render::{
        ReelId,
        Renderer,
        TransitionEnd,
        TransitionSignal,
    },
    sequencer::{
        REEL_COUNT,
        Sequencer,
        SequencerSettings,
        SpinEvent,
        SpinStart,
    },
};
