/*!
Synthetic datasets are uniformly sampled feature records classified by the model. They are only used to illustrate how the model partitions the input space.
*/

use crate::{
	features::{FeatureRecord, TimeOfDay},
	model::Model,
	predict::{
		predict_batch_with_options, results_to_dataframe, PredictOptions, PredictionResult,
		PumpStatus,
	},
	Result,
};
use dewater_dataframe::DataFrame;
use num_traits::ToPrimitive;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_ROWS: usize = 1000;

#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticDataset {
	pub seed: u64,
	pub rows: Vec<PredictionResult>,
}

/// Sample `n` feature records uniformly from the documented domain of each feature. Sampling is column by column in schema order, so the first `n` draws are all water levels, the next `n` are all rain forecasts, and so on. The same seed always produces the same records.
pub fn sample_feature_records(n: usize, seed: u64) -> Vec<FeatureRecord> {
	let mut rng = Xoshiro256Plus::seed_from_u64(seed);
	let water_level: Vec<f32> = (0..n).map(|_| rng.gen_range(0.0f32, 10.0)).collect();
	let rain_forecast: Vec<f32> = (0..n).map(|_| rng.gen_range(0.0f32, 100.0)).collect();
	let solar_irradiance: Vec<f32> = (0..n).map(|_| rng.gen_range(0.0f32, 1000.0)).collect();
	let time_of_day: Vec<TimeOfDay> = (0..n)
		.map(|_| TimeOfDay::ALL[rng.gen_range(0, TimeOfDay::ALL.len())])
		.collect();
	let diesel_cost: Vec<f32> = (0..n).map(|_| rng.gen_range(10.0f32, 20.0)).collect();
	(0..n)
		.map(|index| FeatureRecord {
			water_level: water_level[index],
			rain_forecast: rain_forecast[index],
			solar_irradiance: solar_irradiance[index],
			time_of_day: time_of_day[index],
			diesel_cost: diesel_cost[index],
		})
		.collect()
}

/// Sample `n` records with `seed` and classify every one of them with `model`.
pub fn generate_synthetic_dataset(model: &Model, n: usize, seed: u64) -> Result<SyntheticDataset> {
	generate_synthetic_dataset_with_options(model, n, seed, PredictOptions::default())
}

pub fn generate_synthetic_dataset_with_options(
	model: &Model,
	n: usize,
	seed: u64,
	options: PredictOptions,
) -> Result<SyntheticDataset> {
	let records = sample_feature_records(n, seed);
	let rows = predict_batch_with_options(model, &records, options)?;
	let dataset = SyntheticDataset { seed, rows };
	log::debug!(
		"generated {} synthetic records with seed {}, {} predicted ON",
		dataset.len(),
		seed,
		dataset.on_count()
	);
	Ok(dataset)
}

impl SyntheticDataset {
	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	pub fn records(&self) -> impl Iterator<Item = &FeatureRecord> {
		self.rows.iter().map(|row| &row.record)
	}

	pub fn on_count(&self) -> usize {
		self.rows
			.iter()
			.filter(|row| row.label == PumpStatus::On)
			.count()
	}

	/// The fraction of rows predicted ON, or `None` for an empty dataset.
	pub fn on_fraction(&self) -> Option<f32> {
		if self.is_empty() {
			return None;
		}
		Some(self.on_count().to_f32()? / self.len().to_f32()?)
	}

	/// The records as a dataframe with an extra enum column holding the predicted status.
	pub fn to_dataframe(&self) -> DataFrame {
		results_to_dataframe(&self.rows)
	}
}
