/// Counts completions from a fixed set of participants and releases exactly
/// once, after every participant has arrived, in whatever order they arrive.
#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    arrived: Vec<bool>,
    remaining: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// Counted; this many participants are still outstanding.
    Waiting(usize),
    /// Counted, and it was the last one.
    Released,
    /// Already arrived, or not a participant. Not counted.
    Ignored,
}

impl CompletionBarrier {
    pub fn new(participants: usize) -> Self {
        Self {
            arrived: vec![false; participants],
            remaining: participants,
        }
    }

    pub fn arrive(&mut self, participant: usize) -> Arrival {
        match self.arrived.get_mut(participant) {
            Some(seen) if !*seen => {
                *seen = true;
                self.remaining -= 1;
                if self.remaining == 0 {
                    Arrival::Released
                } else {
                    Arrival::Waiting(self.remaining)
                }
            }
            _ => Arrival::Ignored,
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_released(&self) -> bool {
        self.remaining == 0
    }

    pub fn has_arrived(&self, participant: usize) -> bool {
        self.arrived.get(participant).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use proptest::prelude::*;

    fn release_count(order: &[usize]) -> (usize, Option<usize>) {
        let mut barrier = CompletionBarrier::new(3);
        let mut released = 0;
        let mut released_at = None;
        for (step, p) in order.iter().enumerate() {
            if barrier.arrive(*p) == Arrival::Released {
                released += 1;
                released_at = Some(step);
            }
        }
        (released, released_at)
    }

    #[test]
    fn arrive__releases_on_last_participant_in_any_order() {
        for order in [[0, 1, 2], [2, 1, 0], [1, 0, 2]] {
            assert_eq!(release_count(&order), (1, Some(2)), "order {order:?}");
        }
    }

    #[test]
    fn arrive__ignores_duplicates_and_strangers() {
        let mut barrier = CompletionBarrier::new(2);
        assert_eq!(barrier.arrive(0), Arrival::Waiting(1));
        assert_eq!(barrier.arrive(0), Arrival::Ignored);
        assert_eq!(barrier.arrive(7), Arrival::Ignored);
        assert!(!barrier.is_released());
        assert_eq!(barrier.arrive(1), Arrival::Released);
        assert_eq!(barrier.arrive(1), Arrival::Ignored);
        assert!(barrier.is_released());
    }

    #[test]
    fn new__empty_barrier_is_released() {
        assert!(CompletionBarrier::new(0).is_released());
    }

    proptest! {
        #[test]
        fn arrive__releases_exactly_once_for_any_permutation(
            order in Just((0..6usize).collect::<Vec<_>>()).prop_shuffle(),
            duplicates in proptest::collection::vec(0..6usize, 0..10),
        ) {
            let mut barrier = CompletionBarrier::new(6);
            let mut releases = 0;
            for p in order.iter().chain(duplicates.iter()) {
                if barrier.arrive(*p) == Arrival::Released {
                    releases += 1;
                }
            }
            prop_assert_eq!(releases, 1);
            prop_assert!(barrier.is_released());
            prop_assert!((0..6).all(|p| barrier.has_arrived(p)));
        }
    }
}
