use crate::{
    icons::{
        DEFAULT_ICONS,
        Icon,
        IconCatalog,
    },
    outcome::{
        ForcedOutcome,
        OutcomePolicy,
    },
    render::ReelId,
    sequencer::{
        REEL_COUNT,
        SequencerSettings,
    },
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

pub const DEFAULT_STRIP_SIZE: usize = 15;
pub const DEFAULT_REEL_DURATION_MS: u64 = 1200;
pub const DEFAULT_REEL_DELAY_MS: u64 = 600;
pub const DEFAULT_FORCED_ICON: &str = "img/ringflower.png";
pub const DEFAULT_LOG_DIR: &str = "./logs";

/// Reel animation timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelTiming {
    /// How long one reel takes to scroll back to rest (ms)
    pub reel_duration_ms: u64,
    /// Delay between consecutive reel starts (ms)
    pub reel_delay_ms: u64,
}

impl Default for ReelTiming {
    fn default() -> Self {
        Self {
            reel_duration_ms: DEFAULT_REEL_DURATION_MS,
            reel_delay_ms: DEFAULT_REEL_DELAY_MS,
        }
    }
}

impl ReelTiming {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.reel_duration_ms)
    }

    /// Start offset of reel `index` relative to the spin call.
    pub fn stagger(&self, index: usize) -> Duration {
        Duration::from_millis(self.reel_delay_ms.saturating_mul(index as u64))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub icons: Vec<String>,
    pub strip_size: usize,
    pub timing: ReelTiming,
    /// Spin number that lands on three `forced_icon`s; `None` disables forcing.
    pub force_final_on_spin: Option<u64>,
    pub forced_icon: String,
    pub reel_ids: [String; REEL_COUNT],
    pub seed: Option<u64>,
    pub log_dir: String,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            icons: DEFAULT_ICONS.iter().map(|s| s.to_string()).collect(),
            strip_size: DEFAULT_STRIP_SIZE,
            timing: ReelTiming::default(),
            force_final_on_spin: None,
            forced_icon: DEFAULT_FORCED_ICON.to_string(),
            reel_ids: [
                "reel1".to_string(),
                "reel2".to_string(),
                "reel3".to_string(),
            ],
            seed: None,
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

impl MachineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).wrap_err("invalid machine config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading config {}", path.display()))?;
        Self::from_json_str(&raw)
            .wrap_err_with(|| format!("loading config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.icons.is_empty() {
            return Err(eyre!("config lists no icons"));
        }
        if self.strip_size < 2 {
            return Err(eyre!(
                "strip_size must be at least 2, got {}",
                self.strip_size
            ));
        }
        if self.force_final_on_spin == Some(0) {
            return Err(eyre!("force_final_on_spin counts from 1"));
        }
        if !self.reel_ids.iter().all_unique() {
            return Err(eyre!(
                "reel_ids must name distinct containers, got {:?}",
                self.reel_ids
            ));
        }
        Ok(())
    }

    pub fn catalog(&self) -> Result<IconCatalog> {
        IconCatalog::new(self.icons.iter().map(|p| Icon::new(p.as_str())).collect())
    }

    pub fn policy(&self) -> OutcomePolicy {
        match self.force_final_on_spin {
            Some(on_spin) => OutcomePolicy::forced(ForcedOutcome {
                on_spin,
                icon: Icon::new(self.forced_icon.as_str()),
            }),
            None => OutcomePolicy::default(),
        }
    }

    pub fn sequencer_settings(&self) -> Result<SequencerSettings> {
        self.validate()?;
        Ok(SequencerSettings {
            catalog: self.catalog()?,
            strip_size: self.strip_size,
            timing: self.timing,
            reel_ids: self.reel_ids.clone().map(ReelId::new),
        })
    }

    /// Log directory with `~` and env vars expanded.
    pub fn log_dir(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.log_dir)
            .map_err(|e| eyre!("expanding log dir {}: {}", self.log_dir, e))?;
        Ok(PathBuf::from(expanded.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn default__matches_widget_constants() {
        let config = MachineConfig::default();
        assert_eq!(config.icons.len(), 5);
        assert_eq!(config.strip_size, 15);
        assert_eq!(config.timing.duration(), Duration::from_millis(1200));
        assert_eq!(config.timing.stagger(2), Duration::from_millis(1200));
        assert_eq!(config.force_final_on_spin, None);
        assert_eq!(config.reel_ids[0], "reel1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_json_str__fills_missing_fields_with_defaults() {
        // given
        let raw = r#"{ "strip_size": 9, "timing": { "reel_delay_ms": 250 }, "force_final_on_spin": 4 }"#;

        // when
        let config = MachineConfig::from_json_str(raw).unwrap();

        // then
        assert_eq!(config.strip_size, 9);
        assert_eq!(config.timing.reel_delay_ms, 250);
        assert_eq!(config.timing.reel_duration_ms, DEFAULT_REEL_DURATION_MS);
        assert_eq!(config.icons.len(), 5);
        let policy = config.policy();
        assert_eq!(
            policy.forced_outcome().map(|f| f.on_spin),
            Some(4)
        );
    }

    #[test]
    fn from_json_str__rejects_degenerate_strip() {
        assert!(MachineConfig::from_json_str(r#"{ "strip_size": 1 }"#).is_err());
    }

    #[test]
    fn from_json_str__rejects_shared_reel_container() {
        let err = MachineConfig::from_json_str(r#"{ "reel_ids": ["reel1", "reel1", "reel3"] }"#)
            .err()
            .expect("two reels on one container");
        assert!(format!("{err:#}").contains("distinct"));
    }

    #[test]
    fn from_json_str__rejects_empty_icon_list() {
        assert!(MachineConfig::from_json_str(r#"{ "icons": [] }"#).is_err());
    }

    #[test]
    fn load__reads_file_from_disk() {
        let dir = tempdir::TempDir::new("slot_reels_config").unwrap();
        let path = dir.path().join("machine.json");
        std::fs::write(&path, r#"{ "icons": ["a.png", "b.png"], "seed": 11 }"#).unwrap();

        let config = MachineConfig::load(&path).unwrap();

        assert_eq!(config.icons, vec!["a.png".to_string(), "b.png".to_string()]);
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.catalog().unwrap().len(), 2);
    }

    #[test]
    fn load__missing_file_is_an_error() {
        assert!(MachineConfig::load(Path::new("/definitely/not/here.json")).is_err());
    }
}
