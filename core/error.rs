use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	/// The model artifact is missing, unreadable, of an unknown version, or structurally invalid.
	#[error("failed to load model from {location}: {message}")]
	Load { location: String, message: String },
	#[error("failed to write model to {location}: {message}")]
	Save { location: String, message: String },
	/// The model was trained on a different feature schema than the pipeline produces.
	#[error("the model expects features {found:?} but the pipeline produces {expected:?}")]
	SchemaMismatch {
		expected: Vec<String>,
		found: Vec<String>,
	},
	#[error("the model does not expose feature importances")]
	MissingFeatureImportances,
	#[error("the model has {found} feature importances for {expected} features")]
	ImportanceCount { expected: usize, found: usize },
	#[error("failed to load config from {location}: {message}")]
	Config { location: String, message: String },
	#[error("invalid input: {0}")]
	Input(String),
}

pub type Result<T> = std::result::Result<T, Error>;
