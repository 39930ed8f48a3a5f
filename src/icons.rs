use color_eyre::eyre::{
    Result,
    eyre,
};
use rand::Rng;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    path::Path,
};

/// Icons shipped with the widget.
pub const DEFAULT_ICONS: [&str; 5] = [
    "img/cake.png",
    "img/camera.png",
    "img/champagnes.png",
    "img/flower.png",
    "img/gift.png",
];

/// An image reference shown in a reel cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Icon(String);

impl Icon {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    /// Short name for text surfaces: `img/cake.png` -> `cake`.
    pub fn label(&self) -> &str {
        Path::new(&self.0)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for Icon {
    fn from(path: &str) -> Self {
        Icon::new(path)
    }
}

/// Fixed, non-empty list of icons a reel can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconCatalog {
    icons: Vec<Icon>,
}

impl IconCatalog {
    pub fn new(icons: Vec<Icon>) -> Result<Self> {
        if icons.is_empty() {
            return Err(eyre!("icon catalog must contain at least one icon"));
        }
        Ok(Self { icons })
    }

    pub fn icons(&self) -> &[Icon] {
        &self.icons
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn contains(&self, icon: &Icon) -> bool {
        self.icons.contains(icon)
    }

    /// Uniform pick.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Icon {
        self.icons[rng.random_range(0..self.icons.len())].clone()
    }

    /// First icon in catalog order that differs from `icon`.
    pub fn first_other_than(&self, icon: &Icon) -> Option<&Icon> {
        self.icons.iter().find(|candidate| *candidate != icon)
    }
}

impl Default for IconCatalog {
    fn default() -> Self {
        Self {
            icons: DEFAULT_ICONS.iter().copied().map(Icon::from).collect(),
        }
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
    fn new__rejects_empty_catalog() {
        assert!(IconCatalog::new(Vec::new()).is_err());
    }

    #[test]
    fn label__strips_directory_and_extension() {
        assert_eq!(Icon::new("img/champagnes.png").label(), "champagnes");
        assert_eq!(Icon::new("plain").label(), "plain");
    }

    #[test]
    fn pick__only_returns_catalog_members() {
        let catalog = IconCatalog::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let icon = catalog.pick(&mut rng);
            assert!(catalog.contains(&icon));
        }
    }

    #[test]
    fn first_other_than__follows_catalog_order() {
        let catalog = IconCatalog::default();
        let cake = Icon::from("img/cake.png");
        let camera = Icon::from("img/camera.png");
        assert_eq!(catalog.first_other_than(&cake), Some(&camera));
        assert_eq!(catalog.first_other_than(&camera), Some(&cake));

        let single = IconCatalog::new(vec![cake.clone()]).unwrap();
        assert_eq!(single.first_other_than(&cake), None);
    }
}
