use crate::{
    icons::{
        Icon,
        IconCatalog,
    },
    sequencer::REEL_COUNT,
};
use itertools::Itertools;
use rand::Rng;
use std::fmt;

/// Target icon for every reel, decided before the spin begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome([Icon; REEL_COUNT]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Mixed,
    Pair,
    Triple,
}

impl Outcome {
    pub fn new(icons: [Icon; REEL_COUNT]) -> Self {
        Self(icons)
    }

    pub fn uniform(icon: Icon) -> Self {
        Self(std::array::from_fn(|_| icon.clone()))
    }

    pub fn icons(&self) -> &[Icon; REEL_COUNT] {
        &self.0
    }

    pub fn get(&self, reel: usize) -> Option<&Icon> {
        self.0.get(reel)
    }

    pub fn match_kind(&self) -> MatchKind {
        let distinct = self.0.iter().unique().count();
        match distinct {
            1 => MatchKind::Triple,
            d if d < REEL_COUNT => MatchKind::Pair,
            _ => MatchKind::Mixed,
        }
    }

    pub fn is_triple(&self) -> bool {
        self.0.iter().all_equal()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" | "))
    }
}

/// Three independent uniform picks. A 3-of-a-kind has its last icon swapped
/// for the first catalog entry that differs; a single-icon catalog keeps it.
pub fn random_avoiding_triple<R: Rng + ?Sized>(
    catalog: &IconCatalog,
    rng: &mut R,
) -> Outcome {
    let a = catalog.pick(rng);
    let b = catalog.pick(rng);
    let mut c = catalog.pick(rng);
    if a == b && b == c {
        if let Some(other) = catalog.first_other_than(&a) {
            c = other.clone();
        }
    }
    Outcome([a, b, c])
}

/// A deliberate 3-of-a-kind on one specific spin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedOutcome {
    /// 1-based spin number.
    pub on_spin: u64,
    pub icon: Icon,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomePolicy {
    forced: Option<ForcedOutcome>,
}

impl OutcomePolicy {
    pub fn forced(forced: ForcedOutcome) -> Self {
        Self {
            forced: Some(forced),
        }
    }

    pub fn forced_outcome(&self) -> Option<&ForcedOutcome> {
        self.forced.as_ref()
    }

    pub fn decide<R: Rng + ?Sized>(
        &self,
        spin_number: u64,
        catalog: &IconCatalog,
        rng: &mut R,
    ) -> Outcome {
        match &self.forced {
            Some(forced) if forced.on_spin == spin_number => {
                Outcome::uniform(forced.icon.clone())
            }
            _ => random_avoiding_triple(catalog, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use proptest::prelude::*;
    use rand::{
        SeedableRng,
        rngs::StdRng,
    };

    fn icon(path: &str) -> Icon {
        Icon::new(path)
    }

    #[test]
    fn match_kind__classifies_outcomes() {
        let a = icon("a");
        let b = icon("b");
        let c = icon("c");
        assert_eq!(Outcome::uniform(a.clone()).match_kind(), MatchKind::Triple);
        assert_eq!(
            Outcome::new([a.clone(), b.clone(), a.clone()]).match_kind(),
            MatchKind::Pair
        );
        assert_eq!(Outcome::new([a, b, c]).match_kind(), MatchKind::Mixed);
    }

    #[test]
    fn random_avoiding_triple__never_yields_triple_over_many_draws() {
        // given
        let catalog = IconCatalog::default();
        let mut rng = StdRng::seed_from_u64(2024);

        // when
        let draws: Vec<Outcome> = (0..1000)
            .map(|_| random_avoiding_triple(&catalog, &mut rng))
            .collect();

        // then
        assert!(draws.iter().all(|o| !o.is_triple()));
        // P(pair) is 12/25 for three draws from five icons, plus the
        // 1/25 of triples that are rewritten into pairs.
        let pairs = draws
            .iter()
            .filter(|o| o.match_kind() == MatchKind::Pair)
            .count();
        assert!((400..=640).contains(&pairs), "pairs = {pairs}");
    }

    #[test]
    fn random_avoiding_triple__single_icon_catalog_keeps_triple() {
        let catalog = IconCatalog::new(vec![icon("only")]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(random_avoiding_triple(&catalog, &mut rng).is_triple());
    }

    #[test]
    fn decide__forced_spin_returns_three_forced_icons() {
        // given
        let catalog = IconCatalog::default();
        let ring = icon("img/ringflower.png");
        let policy = OutcomePolicy::forced(ForcedOutcome {
            on_spin: 4,
            icon: ring.clone(),
        });
        let mut rng = StdRng::seed_from_u64(9);

        // when
        let fourth = policy.decide(4, &catalog, &mut rng);
        let fifth = policy.decide(5, &catalog, &mut rng);

        // then
        assert_eq!(fourth, Outcome::uniform(ring));
        assert!(!fifth.is_triple());
    }

    proptest! {
        #[test]
        fn decide__default_policy_never_triples(seed in any::<u64>(), spin in 1u64..10_000) {
            let catalog = IconCatalog::default();
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = OutcomePolicy::default().decide(spin, &catalog, &mut rng);
            prop_assert!(!outcome.is_triple());
            prop_assert!(outcome.icons().iter().all(|i| catalog.contains(i)));
        }

        #[test]
        fn random_avoiding_triple__two_icon_catalog_never_triples(seed in any::<u64>()) {
            let catalog = IconCatalog::new(vec![icon("x"), icon("y")]).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            prop_assert!(!random_avoiding_triple(&catalog, &mut rng).is_triple());
        }
    }
}
