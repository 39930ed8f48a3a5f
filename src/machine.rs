use crate::{
    outcome::{
        Outcome,
        OutcomePolicy,
    },
    render::Renderer,
    sequencer::{
        Sequencer,
        SpinStart,
    },
};
use rand::rngs::StdRng;
use tracing::debug;

/// A spin that was accepted by the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pull {
    pub number: u64,
    pub outcome: Outcome,
}

/// Decides outcomes and feeds them to the sequencer; one `pull` per press of
/// the spin button.
pub struct SlotMachine<R> {
    sequencer: Sequencer<R>,
    policy: OutcomePolicy,
    rng: StdRng,
    last: Option<Pull>,
}

impl<R: Renderer> SlotMachine<R> {
    pub fn new(sequencer: Sequencer<R>, policy: OutcomePolicy, rng: StdRng) -> Self {
        Self {
            sequencer,
            policy,
            rng,
            last: None,
        }
    }

    /// Start a spin, or do nothing if the reels are still moving.
    pub fn pull(&mut self) -> Option<Pull> {
        if self.sequencer.is_busy() {
            debug!("pull ignored while spinning");
            return None;
        }
        let number = self.sequencer.spins_started() + 1;
        let outcome = self
            .policy
            .decide(number, self.sequencer.catalog(), &mut self.rng);
        match self.sequencer.spin(outcome.clone()) {
            SpinStart::Started { number } => {
                let pull = Pull { number, outcome };
                self.last = Some(pull.clone());
                Some(pull)
            }
            SpinStart::Rejected => None,
        }
    }

    pub fn last_pull(&self) -> Option<&Pull> {
        self.last.as_ref()
    }

    pub fn policy(&self) -> &OutcomePolicy {
        &self.policy
    }

    pub fn sequencer(&self) -> &Sequencer<R> {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut Sequencer<R> {
        &mut self.sequencer
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::{
        icons::Icon,
        outcome::ForcedOutcome,
        test_helpers::{
            FakeRenderer,
            standard_settings,
        },
    };
    use rand::SeedableRng;

    fn machine(policy: OutcomePolicy) -> SlotMachine<FakeRenderer> {
        let sequencer = Sequencer::new(
            FakeRenderer::standard(),
            standard_settings(),
            StdRng::seed_from_u64(5),
        )
        .unwrap();
        SlotMachine::new(sequencer, policy, StdRng::seed_from_u64(6))
    }

    #[tokio::test]
    async fn pull__ignored_while_spinning_does_not_advance_counter() {
        // given
        let mut sut = machine(OutcomePolicy::default());
        let first = sut.pull().expect("idle machine accepts a pull");

        // when
        let second = sut.pull();

        // then
        assert_eq!(first.number, 1);
        assert_eq!(second, None);
        assert_eq!(sut.sequencer().spins_started(), 1);
        assert_eq!(sut.last_pull(), Some(&first));
    }

    #[tokio::test(start_paused = true)]
    async fn pull__forced_spin_lands_three_forced_icons() {
        // given
        let ring = Icon::new("img/ringflower.png");
        let mut sut = machine(OutcomePolicy::forced(ForcedOutcome {
            on_spin: 3,
            icon: ring.clone(),
        }));

        // when
        let mut pulls = Vec::new();
        for _ in 0..4 {
            let pull = sut.pull().unwrap();
            sut.sequencer_mut().finish().await;
            pulls.push(pull);
        }

        // then
        assert!(!pulls[0].outcome.is_triple());
        assert!(!pulls[1].outcome.is_triple());
        assert_eq!(pulls[2].outcome, Outcome::uniform(ring.clone()));
        assert!(!pulls[3].outcome.is_triple());
        assert_eq!(
            sut.sequencer().renderer().visible("reel2"),
            pulls[3].outcome.get(1)
        );
    }
}
