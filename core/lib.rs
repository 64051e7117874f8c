/*!
This crate is the inference pipeline for the dewatering pump simulator. It turns five scalar readings into a [`FeatureRecord`](features::FeatureRecord), runs a pre-trained random forest on it, and exposes the forest's feature importances and a seeded synthetic dataset classified by the same forest.
*/

#![allow(clippy::tabs_in_doc_comments)]

pub mod config;
mod error;
pub mod features;
pub mod importances;
pub mod model;
pub mod predict;
pub mod synthetic;

pub use self::{
	error::{Error, Result},
	features::{build_feature_record, FeatureRecord, TimeOfDay, FEATURE_NAMES},
	importances::{feature_importance, ImportanceVector},
	model::Model,
	predict::{predict, predict_batch, PredictOptions, PredictionResult, PumpStatus},
	synthetic::{generate_synthetic_dataset, sample_feature_records, SyntheticDataset},
};
