use crate::icons::{
    Icon,
    IconCatalog,
};
use rand::Rng;

/// The ordered cells of one reel. Cell 0 is the one visible at rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strip {
    cells: Vec<Icon>,
}

impl Strip {
    /// `size` random icons. Callers guarantee `size >= 2`.
    pub fn random<R: Rng + ?Sized>(size: usize, catalog: &IconCatalog, rng: &mut R) -> Self {
        Self {
            cells: (0..size).map(|_| catalog.pick(rng)).collect(),
        }
    }

    pub fn from_cells(cells: Vec<Icon>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Icon] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn visible(&self) -> &Icon {
        &self.cells[0]
    }

    /// Offset that puts the last cell in the visible slot.
    pub fn wrap_offset(&self) -> usize {
        self.cells.len() - 1
    }

    /// Copy the visible icon into the last cell and refill the interior with
    /// filler, so jumping to the last cell shows what was already on screen.
    /// Returns the previously visible icon.
    pub fn wrap_for_spin<R: Rng + ?Sized>(
        &mut self,
        catalog: &IconCatalog,
        rng: &mut R,
    ) -> Icon {
        let prev_top = self.cells[0].clone();
        let last = self.cells.len() - 1;
        self.cells[last] = prev_top.clone();
        for cell in &mut self.cells[1..last] {
            *cell = catalog.pick(rng);
        }
        prev_top
    }

    /// Place the icon the reel will land on.
    pub fn set_target(&mut self, target: Icon) {
        self.cells[0] = target;
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use rand::{
        SeedableRng,
        rngs::StdRng,
    };

    #[test]
    fn random__builds_requested_size_from_catalog() {
        let catalog = IconCatalog::default();
        let mut rng = StdRng::seed_from_u64(3);
        let strip = Strip::random(15, &catalog, &mut rng);
        assert_eq!(strip.len(), 15);
        assert_eq!(strip.wrap_offset(), 14);
        assert!(strip.cells().iter().all(|c| catalog.contains(c)));
    }

    #[test]
    fn wrap_for_spin__moves_visible_icon_to_last_cell() {
        // given
        let catalog = IconCatalog::new(vec![Icon::new("filler")]).unwrap();
        let mut strip = Strip::from_cells(vec![
            Icon::new("top"),
            Icon::new("b"),
            Icon::new("c"),
            Icon::new("d"),
        ]);
        let mut rng = StdRng::seed_from_u64(0);

        // when
        let prev = strip.wrap_for_spin(&catalog, &mut rng);
        strip.set_target(Icon::new("target"));

        // then
        assert_eq!(prev, Icon::new("top"));
        assert_eq!(
            strip.cells(),
            &[
                Icon::new("target"),
                Icon::new("filler"),
                Icon::new("filler"),
                Icon::new("top"),
            ]
        );
    }

    #[test]
    fn wrap_for_spin__two_cell_strip_has_no_interior() {
        let catalog = IconCatalog::default();
        let mut strip = Strip::from_cells(vec![Icon::new("x"), Icon::new("y")]);
        let mut rng = StdRng::seed_from_u64(0);
        strip.wrap_for_spin(&catalog, &mut rng);
        assert_eq!(strip.cells(), &[Icon::new("x"), Icon::new("x")]);
    }
}
