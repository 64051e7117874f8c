use crate::{model::Model, Error, Result};
use dewater_util::finite::Finite;
use std::cmp::Reverse;

#[derive(Clone, Debug, PartialEq)]
pub struct FeatureImportance {
	pub feature_name: String,
	pub weight: f32,
}

/// The importance of each feature, in the order of the model's features.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportanceVector {
	pub entries: Vec<FeatureImportance>,
}

impl ImportanceVector {
	pub fn iter(&self) -> impl Iterator<Item = &FeatureImportance> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, feature_name: &str) -> Option<f32> {
		self.entries
			.iter()
			.find(|entry| entry.feature_name == feature_name)
			.map(|entry| entry.weight)
	}

	pub fn sum(&self) -> f32 {
		self.entries.iter().map(|entry| entry.weight).sum()
	}

	/// The entries from most to least important. Ties keep the feature order, and non finite weights sort last.
	pub fn sorted(&self) -> Vec<&FeatureImportance> {
		let mut entries: Vec<&FeatureImportance> = self.entries.iter().collect();
		entries.sort_by_key(|entry| Reverse(Finite::new(entry.weight).ok()));
		entries
	}
}

/// Read the feature importances the model was trained with. The weights are returned exactly as stored.
pub fn feature_importance(model: &Model) -> Result<ImportanceVector> {
	let weights = model
		.classifier
		.feature_importances
		.as_ref()
		.ok_or(Error::MissingFeatureImportances)?;
	if weights.len() != model.feature_names.len() {
		return Err(Error::ImportanceCount {
			expected: model.feature_names.len(),
			found: weights.len(),
		});
	}
	let entries = model
		.feature_names
		.iter()
		.zip(weights.iter())
		.map(|(feature_name, weight)| FeatureImportance {
			feature_name: feature_name.clone(),
			weight: *weight,
		})
		.collect();
	Ok(ImportanceVector { entries })
}
