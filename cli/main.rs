//! This module contains the main entrypoint to the dewater cli.

use anyhow::{Context, Result};
use clap::{Args, Parser};
use colored::Colorize;
use dewater_core::{
	config::{load_config, Config, Settings},
	feature_importance,
	features::read_feature_records,
	predict::{predict_batch_with_options, predict_with_options},
	synthetic::generate_synthetic_dataset_with_options,
	FeatureRecord, Model, TimeOfDay, FEATURE_NAMES,
};
use std::path::PathBuf;

mod render;

#[derive(Parser)]
#[clap(
	name = "dewater",
	about = "Decide when a solar-powered dewatering pump should run.",
	disable_help_subcommand = true
)]
enum Options {
	#[clap(name = "predict")]
	Predict(PredictOptions),
	#[clap(name = "simulate")]
	Simulate(SimulateOptions),
	#[clap(name = "importances")]
	Importances(ImportancesOptions),
}

/// Predict the pump status for one set of readings, or for every row of a csv file.
#[derive(Args)]
struct PredictOptions {
	#[clap(flatten)]
	model: ModelArgs,
	#[clap(flatten)]
	inputs: InputArgs,
	/// the path to a .csv file with one column per feature
	#[clap(short, long)]
	file: Option<PathBuf>,
	/// the probability of ON the pump must exceed to run
	#[clap(long)]
	threshold: Option<f32>,
}

/// Predict the pump status for one set of readings and for a seeded synthetic dataset.
#[derive(Args)]
struct SimulateOptions {
	#[clap(flatten)]
	model: ModelArgs,
	#[clap(flatten)]
	inputs: InputArgs,
	/// the number of synthetic rows to generate
	#[clap(long)]
	rows: Option<usize>,
	/// the seed for the synthetic dataset
	#[clap(long)]
	seed: Option<u64>,
	/// the number of synthetic rows to print
	#[clap(long, default_value = "10")]
	head: usize,
	/// the probability of ON the pump must exceed to run
	#[clap(long)]
	threshold: Option<f32>,
}

/// Print the feature importances of the model.
#[derive(Args)]
struct ImportancesOptions {
	#[clap(flatten)]
	model: ModelArgs,
}

#[derive(Args)]
struct ModelArgs {
	/// the path to the .pump or .json model file
	#[clap(short, long)]
	model: Option<PathBuf>,
	/// the path to a config file
	#[clap(short, long)]
	config: Option<PathBuf>,
}

#[derive(Args)]
struct InputArgs {
	/// water level in meters, from 0 to 10
	#[clap(long, default_value = "5.0", parse(try_from_str = parse_water_level))]
	water_level: f32,
	/// rainfall forecast in mm, from 0 to 100
	#[clap(long, default_value = "30", parse(try_from_str = parse_rain_forecast))]
	rain_forecast: f32,
	/// solar irradiance in W/m², from 0 to 1000
	#[clap(long, default_value = "400", parse(try_from_str = parse_solar_irradiance))]
	solar_irradiance: f32,
	/// Night, Morning, Noon, Evening, or the code 0 to 3
	#[clap(long, default_value = "Noon")]
	time_of_day: TimeOfDay,
	/// diesel cost in ₹/kWh, from 10 to 20
	#[clap(long, default_value = "15", parse(try_from_str = parse_diesel_cost))]
	diesel_cost: f32,
}

fn main() {
	let env = env_logger::Env::default().filter_or("DEWATER_LOG", "dewater=info");
	env_logger::Builder::from_env(env)
		.format_level(false)
		.format_module_path(false)
		.format_timestamp(None)
		.init();
	let options = Options::parse();
	let result = match options {
		Options::Predict(options) => cli_predict(options),
		Options::Simulate(options) => cli_simulate(options),
		Options::Importances(options) => cli_importances(options),
	};
	if let Err(error) = result {
		eprintln!("{}: {:#}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn cli_predict(options: PredictOptions) -> Result<()> {
	let settings = options.model.settings(Config {
		threshold: options.threshold,
		..Default::default()
	})?;
	let model = load_model(&settings)?;
	let color = should_colorize();
	print!("{}", render::header(color));
	if let Some(file) = options.file {
		let records = read_feature_records(&file)
			.with_context(|| format!("failed to read the inputs from {}", file.display()))?;
		let results = predict_batch_with_options(&model, &records, settings.predict_options)?;
		log::info!("classified {} rows from {}", results.len(), file.display());
		println!();
		println!("Input & Predicted Output");
		print!("{}", render::results_table(&results, results.len()));
		return Ok(());
	}
	let result = predict_with_options(&model, &options.inputs.record(), settings.predict_options)?;
	let importances = feature_importance(&model)?;
	println!();
	print!("{}", render::status(&result, color));
	println!();
	print!("{}", render::importances(&importances, color));
	println!();
	println!("Input & Predicted Output");
	print!("{}", render::results_table(&[result], 1));
	Ok(())
}

fn cli_simulate(options: SimulateOptions) -> Result<()> {
	let settings = options.model.settings(Config {
		seed: options.seed,
		rows: options.rows,
		threshold: options.threshold,
		..Default::default()
	})?;
	let model = load_model(&settings)?;
	let color = should_colorize();
	let result = predict_with_options(&model, &options.inputs.record(), settings.predict_options)?;
	let importances = feature_importance(&model)?;
	let dataset = generate_synthetic_dataset_with_options(
		&model,
		settings.rows,
		settings.seed,
		settings.predict_options,
	)?;
	print!("{}", render::header(color));
	println!();
	print!("{}", render::status(&result, color));
	println!();
	print!("{}", render::importances(&importances, color));
	println!();
	print!("{}", render::scatter(&dataset, color));
	println!();
	println!("Synthetic Input & Predicted Output");
	print!("{}", render::results_table(&dataset.rows, options.head));
	println!();
	print!("{}", render::on_fraction(&dataset));
	Ok(())
}

fn cli_importances(options: ImportancesOptions) -> Result<()> {
	let settings = options.model.settings(Config::default())?;
	let model = load_model(&settings)?;
	let importances = feature_importance(&model)?;
	print!("{}", render::importances(&importances, should_colorize()));
	Ok(())
}

impl ModelArgs {
	/// Resolve the settings for this run. The command line wins over the config file, which wins over the defaults.
	fn settings(&self, overrides: Config) -> Result<Settings> {
		let config = load_config(self.config.as_deref())?.unwrap_or_default();
		let overrides = Config {
			model_path: self.model.clone(),
			..overrides
		};
		Ok(config.merge(overrides).settings())
	}
}

impl InputArgs {
	fn record(&self) -> FeatureRecord {
		dewater_core::build_feature_record(
			self.water_level,
			self.rain_forecast,
			self.solar_irradiance,
			self.time_of_day,
			self.diesel_cost,
		)
	}
}

fn load_model(settings: &Settings) -> Result<Model> {
	let model = Model::from_path(&settings.model_path)
		.context("failed to load the pump model, pass --model to choose another file")?;
	log::info!("using model \"{}\"", model.name);
	Ok(model)
}

fn should_colorize() -> bool {
	colored::control::SHOULD_COLORIZE.should_colorize()
}

fn parse_water_level(value: &str) -> Result<f32, String> {
	parse_in_range(value, 0)
}

fn parse_rain_forecast(value: &str) -> Result<f32, String> {
	parse_in_range(value, 1)
}

fn parse_solar_irradiance(value: &str) -> Result<f32, String> {
	parse_in_range(value, 2)
}

fn parse_diesel_cost(value: &str) -> Result<f32, String> {
	parse_in_range(value, 4)
}

/// Parse a number and check it against the range of the feature at `feature_index`.
fn parse_in_range(value: &str, feature_index: usize) -> Result<f32, String> {
	let (min, max) = FeatureRecord::RANGES[feature_index];
	let number: f32 = value
		.parse()
		.map_err(|_| format!("\"{}\" is not a number", value))?;
	if !(min..=max).contains(&number) {
		return Err(format!(
			"{} must be between {} and {}",
			FEATURE_NAMES[feature_index], min, max
		));
	}
	Ok(number)
}

#[test]
fn test_parse_in_range() {
	assert_eq!(parse_water_level("7.5"), Ok(7.5));
	assert_eq!(parse_diesel_cost("10"), Ok(10.0));
	assert_eq!(
		parse_diesel_cost("9.5"),
		Err("diesel_cost must be between 10 and 20".to_owned())
	);
	assert_eq!(
		parse_rain_forecast("lots"),
		Err("\"lots\" is not a number".to_owned())
	);
	assert!(parse_solar_irradiance("NaN").is_err());
}

#[test]
fn test_options() {
	let options = Options::try_parse_from(&["dewater", "predict"]).unwrap();
	match options {
		Options::Predict(options) => {
			let record = options.inputs.record();
			assert_eq!(record.to_numbers(), [5.0, 30.0, 400.0, 2.0, 15.0]);
			assert!(options.file.is_none());
		}
		_ => panic!(),
	}
	let options = Options::try_parse_from(&[
		"dewater",
		"simulate",
		"--rows",
		"50",
		"--seed",
		"7",
		"--time-of-day",
		"night",
		"--model",
		"model.json",
	])
	.unwrap();
	match options {
		Options::Simulate(options) => {
			assert_eq!(options.rows, Some(50));
			assert_eq!(options.seed, Some(7));
			assert_eq!(options.head, 10);
			assert_eq!(options.inputs.time_of_day, TimeOfDay::Night);
			let settings = options.model.settings(Config::default()).unwrap();
			assert_eq!(settings.model_path, PathBuf::from("model.json"));
		}
		_ => panic!(),
	}
	assert!(Options::try_parse_from(&["dewater", "predict", "--water-level", "11"]).is_err());
	assert!(Options::try_parse_from(&["dewater", "predict", "--time-of-day", "4"]).is_err());
}

#[test]
fn test_input_units_in_help() {
	let help = match Options::try_parse_from(&["dewater", "predict", "--help"]) {
		Err(error) => error.to_string(),
		Ok(_) => panic!(),
	};
	assert!(help.contains("water level in meters"));
	assert!(help.contains("rainfall forecast in mm"));
	assert!(help.contains("diesel cost in ₹/kWh"));
	assert!(!help.contains("percent"));
}
