//! Configuration settings for the demonstrations

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub pigeonhole: PigeonholeConfig,
    pub river: RiverConfig,
    pub sweep: SweepConfig,
    pub digits: DigitsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PigeonholeConfig {
    pub pigeons: usize,
    pub encoding: PigeonholeEncoding,
    pub backend: Backend,
    /// Report which clauses the refutation needs (SAT backend only)
    pub extract_core: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PigeonholeEncoding {
    OneHot,
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Sat,
    Bdd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiverConfig {
    pub num_steps: usize,
    pub max_solutions: usize,
    /// Log the clauses produced for every constraint
    pub print_cnf: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub min_pigeons: usize,
    pub max_pigeons: usize,
    pub encoding: PigeonholeEncoding,
    pub backend: Backend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitsConfig {
    pub zeros_file: PathBuf,
    pub ones_file: PathBuf,
    pub state_bits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub save: bool,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pigeonhole: PigeonholeConfig {
                pigeons: 4,
                encoding: PigeonholeEncoding::OneHot,
                backend: Backend::Sat,
                extract_core: false,
            },
            river: RiverConfig {
                num_steps: 8,
                max_solutions: 1,
                print_cnf: false,
            },
            sweep: SweepConfig {
                min_pigeons: 4,
                max_pigeons: 10,
                encoding: PigeonholeEncoding::OneHot,
                backend: Backend::Sat,
            },
            digits: DigitsConfig {
                zeros_file: PathBuf::from("input/digits/zeros.txt"),
                ones_file: PathBuf::from("input/digits/ones.txt"),
                state_bits: 4,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                save: false,
                output_directory: PathBuf::from("output"),
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            log::warn!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.pigeonhole.pigeons == 0 {
            anyhow::bail!("Number of pigeons must be positive");
        }

        if self.river.num_steps == 0 {
            anyhow::bail!("Number of crossing steps must be positive");
        }

        if self.river.max_solutions == 0 {
            anyhow::bail!("Maximum solutions must be positive");
        }

        if self.sweep.min_pigeons == 0 || self.sweep.min_pigeons > self.sweep.max_pigeons {
            anyhow::bail!(
                "Sweep range {}..={} is empty or starts at zero",
                self.sweep.min_pigeons,
                self.sweep.max_pigeons
            );
        }

        if self.digits.state_bits == 0 {
            anyhow::bail!("Digit state vector needs at least one bit");
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(pigeons) = cli_overrides.pigeons {
            self.pigeonhole.pigeons = pigeons;
        }
        if let Some(encoding) = cli_overrides.encoding {
            self.pigeonhole.encoding = encoding;
            self.sweep.encoding = encoding;
        }
        if let Some(backend) = cli_overrides.backend {
            self.pigeonhole.backend = backend;
            self.sweep.backend = backend;
        }
        if let Some(num_steps) = cli_overrides.num_steps {
            self.river.num_steps = num_steps;
        }
        if let Some(max_solutions) = cli_overrides.max_solutions {
            self.river.max_solutions = max_solutions;
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
            self.output.save = true;
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub pigeons: Option<usize>,
    pub encoding: Option<PigeonholeEncoding>,
    pub backend: Option<Backend>,
    pub num_steps: Option<usize>,
    pub max_solutions: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_the_demo_parameters() {
        let settings = Settings::default();
        assert_eq!(settings.pigeonhole.pigeons, 4);
        assert_eq!(settings.river.num_steps, 8);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config/default.yaml");

        let mut settings = Settings::default();
        settings.pigeonhole.encoding = PigeonholeEncoding::Binary;
        settings.pigeonhole.backend = Backend::Bdd;
        settings.to_file(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded, settings);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("encoding: binary"));
        assert!(raw.contains("backend: bdd"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_or_default(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        settings.pigeonhole.pigeons = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.sweep.min_pigeons = 12;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.river.num_steps = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut settings = Settings::default();
        settings.merge_with_cli(&CliOverrides {
            pigeons: Some(7),
            num_steps: Some(10),
            output_dir: Some(PathBuf::from("out")),
            ..Default::default()
        });

        assert_eq!(settings.pigeonhole.pigeons, 7);
        assert_eq!(settings.river.num_steps, 10);
        assert_eq!(settings.output.output_directory, PathBuf::from("out"));
        assert!(settings.output.save);
    }
}
