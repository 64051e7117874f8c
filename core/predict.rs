use crate::{
	features::{records_to_dataframe, FeatureRecord, N_FEATURES},
	model::Model,
	Result,
};
use dewater_dataframe::{Column, DataFrame, EnumColumn};
use ndarray::prelude::*;
use std::num::NonZeroUsize;

pub const PREDICTION_COLUMN_NAME: &str = "pump_prediction";

#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
pub struct PredictOptions {
	/// The pump is switched on when the probability of ON is strictly greater than this value.
	pub threshold: f32,
}

impl Default for PredictOptions {
	fn default() -> PredictOptions {
		PredictOptions { threshold: 0.5 }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PumpStatus {
	Off,
	On,
}

impl PumpStatus {
	/// The binary label, 0 for OFF and 1 for ON.
	pub fn label(self) -> u8 {
		match self {
			PumpStatus::Off => 0,
			PumpStatus::On => 1,
		}
	}

	/// A probability exactly at the threshold is OFF, so a tie between the classes resolves to the first class.
	pub fn from_probability(probability: f32, threshold: f32) -> PumpStatus {
		if probability > threshold {
			PumpStatus::On
		} else {
			PumpStatus::Off
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			PumpStatus::Off => "OFF",
			PumpStatus::On => "ON",
		}
	}
}

impl std::fmt::Display for PumpStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PredictionResult {
	pub record: FeatureRecord,
	pub label: PumpStatus,
	/// The probability of ON, averaged over the trees.
	pub probability: f32,
}

/// Predict the pump status for a single record.
pub fn predict(model: &Model, record: &FeatureRecord) -> Result<PredictionResult> {
	predict_with_options(model, record, PredictOptions::default())
}

pub fn predict_with_options(
	model: &Model,
	record: &FeatureRecord,
	options: PredictOptions,
) -> Result<PredictionResult> {
	let values = record.to_values();
	let features = ArrayView2::from_shape((1, N_FEATURES), &values[..])
		.map_err(|error| crate::Error::Input(error.to_string()))?;
	let mut results = classify(model, features, std::slice::from_ref(record), options)?;
	Ok(results.remove(0))
}

/// Predict the pump status for many records at once. The result is identical to calling [`predict`] on each record.
pub fn predict_batch(model: &Model, records: &[FeatureRecord]) -> Result<Vec<PredictionResult>> {
	predict_batch_with_options(model, records, PredictOptions::default())
}

pub fn predict_batch_with_options(
	model: &Model,
	records: &[FeatureRecord],
	options: PredictOptions,
) -> Result<Vec<PredictionResult>> {
	let features = records_to_dataframe(records).to_rows();
	classify(model, features.view(), records, options)
}

/// Run the classifier over rows that were built from `records`, one row per record.
fn classify(
	model: &Model,
	features: ArrayView2<dewater_dataframe::Value>,
	records: &[FeatureRecord],
	options: PredictOptions,
) -> Result<Vec<PredictionResult>> {
	model.check_schema()?;
	let mut probabilities = Array2::zeros((records.len(), 2));
	model
		.classifier
		.predict(features, probabilities.view_mut());
	let results = records
		.iter()
		.zip(probabilities.genrows())
		.map(|(record, probabilities)| {
			let probability = probabilities[1];
			PredictionResult {
				record: *record,
				label: PumpStatus::from_probability(probability, options.threshold),
				probability,
			}
		})
		.collect();
	Ok(results)
}

/// Build a dataframe of the records that produced `results`, with an extra enum column holding the predicted status.
pub fn results_to_dataframe(results: &[PredictionResult]) -> DataFrame {
	let records: Vec<FeatureRecord> = results.iter().map(|result| result.record).collect();
	let mut df = records_to_dataframe(&records);
	df.columns.push(Column::Enum(EnumColumn {
		name: PREDICTION_COLUMN_NAME.to_owned(),
		options: vec![
			PumpStatus::Off.name().to_owned(),
			PumpStatus::On.name().to_owned(),
		],
		data: results
			.iter()
			.map(|result| NonZeroUsize::new(result.label.label() as usize + 1))
			.collect(),
	}));
	df
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{features::build_feature_record, model::test::test_model, Error, TimeOfDay};

	#[test]
	fn test_predict() {
		let model = test_model();
		let high_water = build_feature_record(8.0, 10.0, 400.0, TimeOfDay::Noon, 15.0);
		let result = predict(&model, &high_water).unwrap();
		assert_eq!(result.record, high_water);
		assert_eq!(result.probability, 0.5);
		// Exactly one of the two trees votes ON, which ties and resolves to OFF.
		assert_eq!(result.label, PumpStatus::Off);
		let storm = build_feature_record(8.0, 90.0, 400.0, TimeOfDay::Noon, 15.0);
		let result = predict(&model, &storm).unwrap();
		assert_eq!(result.probability, 1.0);
		assert_eq!(result.label, PumpStatus::On);
		assert_eq!(result.label.label(), 1);
	}

	#[test]
	fn test_threshold() {
		let model = test_model();
		let record = build_feature_record(8.0, 10.0, 400.0, TimeOfDay::Noon, 15.0);
		let result =
			predict_with_options(&model, &record, PredictOptions { threshold: 0.4 }).unwrap();
		assert_eq!(result.label, PumpStatus::On);
	}

	#[test]
	fn test_predict_is_deterministic() {
		let model = test_model();
		let record = build_feature_record(5.0, 30.0, 400.0, TimeOfDay::Noon, 15.0);
		let first = predict(&model, &record).unwrap();
		for _ in 0..10 {
			assert_eq!(predict(&model, &record).unwrap(), first);
		}
	}

	#[test]
	fn test_predict_batch_matches_predict() {
		let model = test_model();
		let records: Vec<FeatureRecord> = (0..20)
			.map(|i| {
				let i = i as f32;
				build_feature_record(
					i / 2.0,
					i * 5.0,
					i * 50.0,
					TimeOfDay::ALL[i as usize % 4],
					10.0 + i / 2.0,
				)
			})
			.collect();
		let batch = predict_batch(&model, &records).unwrap();
		assert_eq!(batch.len(), records.len());
		for (result, record) in batch.iter().zip(records.iter()) {
			assert_eq!(*result, predict(&model, record).unwrap());
		}
		assert!(predict_batch(&model, &[]).unwrap().is_empty());
	}

	#[test]
	fn test_results_to_dataframe() {
		let model = test_model();
		let records = vec![
			build_feature_record(8.0, 90.0, 400.0, TimeOfDay::Noon, 15.0),
			build_feature_record(1.0, 10.0, 400.0, TimeOfDay::Night, 15.0),
		];
		let results = predict_batch(&model, &records).unwrap();
		let df = results_to_dataframe(&results);
		assert_eq!(df.nrows(), 2);
		let predictions = df.column(PREDICTION_COLUMN_NAME).unwrap();
		assert_eq!(predictions.display_value(0), "ON");
		assert_eq!(predictions.display_value(1), "OFF");
		assert_eq!(df.column("time_of_day").unwrap().display_value(0), "Noon");
	}

	#[test]
	fn test_schema_mismatch() {
		let mut model = test_model();
		model.feature_names.reverse();
		let record = build_feature_record(5.0, 30.0, 400.0, TimeOfDay::Noon, 15.0);
		assert!(matches!(
			predict(&model, &record),
			Err(Error::SchemaMismatch { .. })
		));
		assert!(matches!(
			predict_batch(&model, &[record]),
			Err(Error::SchemaMismatch { .. })
		));
	}
}
