/*!
This module defines the `Config` struct, which is read from an optional yaml file. Every field is optional. Values given on the command line take precedence over the file, and the file takes precedence over the defaults in [`Settings`].
*/

use crate::{
	predict::PredictOptions,
	synthetic::{DEFAULT_ROWS, DEFAULT_SEED},
	Error, Result,
};
use std::path::{Path, PathBuf};

/// The model is read from this path, relative to the working directory, unless configured otherwise.
pub const DEFAULT_MODEL_PATH: &str = "pump_rf_model.pump";

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	pub model_path: Option<PathBuf>,
	pub seed: Option<u64>,
	pub rows: Option<usize>,
	pub threshold: Option<f32>,
}

/// The fully resolved settings for a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
	pub model_path: PathBuf,
	pub seed: u64,
	pub rows: usize,
	pub predict_options: PredictOptions,
}

impl Config {
	pub fn from_yaml(yaml: &str) -> std::result::Result<Config, serde_yaml::Error> {
		serde_yaml::from_str(yaml)
	}

	/// Combine two configs. Fields set in `overrides` win.
	pub fn merge(self, overrides: Config) -> Config {
		Config {
			model_path: overrides.model_path.or(self.model_path),
			seed: overrides.seed.or(self.seed),
			rows: overrides.rows.or(self.rows),
			threshold: overrides.threshold.or(self.threshold),
		}
	}

	pub fn settings(&self) -> Settings {
		Settings {
			model_path: self
				.model_path
				.clone()
				.unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
			seed: self.seed.unwrap_or(DEFAULT_SEED),
			rows: self.rows.unwrap_or(DEFAULT_ROWS),
			predict_options: self
				.threshold
				.map(|threshold| PredictOptions { threshold })
				.unwrap_or_default(),
		}
	}
}

pub fn load_config(config_path: Option<&Path>) -> Result<Option<Config>> {
	if let Some(config_path) = config_path {
		let config_error = |message: String| Error::Config {
			location: config_path.display().to_string(),
			message,
		};
		let config = std::fs::read_to_string(config_path)
			.map_err(|error| config_error(error.to_string()))?;
		let config = Config::from_yaml(&config).map_err(|error| config_error(error.to_string()))?;
		log::debug!("loaded config from {}", config_path.display());
		Ok(Some(config))
	} else {
		Ok(None)
	}
}

#[test]
fn test_defaults() {
	let settings = Config::default().settings();
	assert_eq!(settings.model_path, PathBuf::from("pump_rf_model.pump"));
	assert_eq!(settings.seed, 42);
	assert_eq!(settings.rows, 1000);
	assert_eq!(settings.predict_options, PredictOptions { threshold: 0.5 });
}

#[test]
fn test_merge() {
	let file = Config::from_yaml("model_path: models/pump.json\nseed: 7\nrows: 50\n").unwrap();
	let command_line = Config {
		seed: Some(9),
		..Default::default()
	};
	let settings = file.merge(command_line).settings();
	assert_eq!(settings.model_path, PathBuf::from("models/pump.json"));
	assert_eq!(settings.seed, 9);
	assert_eq!(settings.rows, 50);
	assert_eq!(settings.predict_options.threshold, 0.5);
}

#[test]
fn test_unknown_fields_are_rejected() {
	assert!(Config::from_yaml("seed: 1\ncolor: blue\n").is_err());
}

#[test]
fn test_load_config_missing_file() {
	let path = std::env::temp_dir().join("dewater_missing_config.yaml");
	assert!(matches!(
		load_config(Some(&path)),
		Err(Error::Config { .. })
	));
	assert_eq!(load_config(None).unwrap(), None);
}
