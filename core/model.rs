use crate::{features::FEATURE_NAMES, Error, Result};
use dewater_tree::BinaryClassifier;
use std::{
	io::{Read, Write},
	path::Path,
};

/// The first byte of a binary model file.
const MAJOR_VERSION: u8 = 0;

/// A pre-trained pump classifier together with the names of the features it was trained on, in training order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Model {
	pub name: String,
	pub feature_names: Vec<String>,
	pub classifier: BinaryClassifier,
}

impl Model {
	/// Deserialize a `Model` from the bytes of a binary model file.
	pub fn from_slice(slice: &[u8]) -> Result<Self> {
		let location = "<bytes>";
		let (major_version, slice) = slice
			.split_first()
			.ok_or_else(|| load_error(location, "the model is empty"))?;
		check_major_version(location, *major_version)?;
		let model: Self =
			rmp_serde::from_slice(slice).map_err(|error| load_error(location, error))?;
		model.validate(location)?;
		Ok(model)
	}

	/// Deserialize a `Model` from json.
	pub fn from_json(json: &str) -> Result<Self> {
		let location = "<json>";
		let model: Self = serde_json::from_str(json).map_err(|error| load_error(location, error))?;
		model.validate(location)?;
		Ok(model)
	}

	/// Deserialize a `Model` by reading the file at `path`. Files with a `.json` extension are read as json, and all others as binary model files.
	pub fn from_path(path: &Path) -> Result<Self> {
		let location = path.display().to_string();
		let file = std::fs::File::open(path).map_err(|error| load_error(&location, error))?;
		let mut reader = std::io::BufReader::new(file);
		let model: Model = if path.extension().map_or(false, |e| e == "json") {
			serde_json::from_reader(reader).map_err(|error| load_error(&location, error))?
		} else {
			let mut major_version = [0u8; 1];
			reader
				.read_exact(&mut major_version)
				.map_err(|error| load_error(&location, error))?;
			check_major_version(&location, major_version[0])?;
			rmp_serde::from_read(&mut reader).map_err(|error| load_error(&location, error))?
		};
		model.validate(&location)?;
		log::debug!(
			"loaded model \"{}\" with {} trees from {}",
			model.name,
			model.classifier.trees.len(),
			location
		);
		Ok(model)
	}

	/// Write this model to the file at `path` in the binary format.
	pub fn to_file(&self, path: &Path) -> Result<()> {
		let location = path.display().to_string();
		let save_error = |error: &dyn std::fmt::Display| Error::Save {
			location: location.clone(),
			message: error.to_string(),
		};
		let file = std::fs::File::create(path).map_err(|error| save_error(&error))?;
		let mut writer = std::io::BufWriter::new(file);
		writer
			.write_all(&[MAJOR_VERSION])
			.map_err(|error| save_error(&error))?;
		rmp_serde::encode::write_named(&mut writer, self).map_err(|error| save_error(&error))?;
		writer.flush().map_err(|error| save_error(&error))?;
		Ok(())
	}

	/// Check that the model was trained on exactly the pipeline's features, with the same names in the same order.
	pub fn check_schema(&self) -> Result<()> {
		if self.feature_names.iter().map(String::as_str).eq(FEATURE_NAMES.iter().copied()) {
			Ok(())
		} else {
			Err(Error::SchemaMismatch {
				expected: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
				found: self.feature_names.clone(),
			})
		}
	}

	/// The name of the class at `index`, where 0 is the negative class and 1 is the positive class.
	pub fn class_name(&self, index: usize) -> Option<&str> {
		self.classifier.classes.get(index).map(String::as_str)
	}

	fn validate(&self, location: &str) -> Result<()> {
		self.classifier
			.validate(self.feature_names.len())
			.map_err(|error| load_error(location, error))
	}
}

fn check_major_version(location: &str, major_version: u8) -> Result<()> {
	if major_version != MAJOR_VERSION {
		return Err(load_error(
			location,
			format!("unknown major version {}", major_version),
		));
	}
	Ok(())
}

fn load_error(location: &str, message: impl std::fmt::Display) -> Error {
	Error::Load {
		location: location.to_owned(),
		message: message.to_string(),
	}
}

#[cfg(test)]
pub(crate) mod test {
	use super::*;
	use dewater_tree::{
		BranchNode, BranchSplit, BranchSplitContinuous, LeafNode, Node, SplitDirection, Tree,
	};

	pub fn stump(feature_index: usize, split_value: f32, left: f32, right: f32) -> Tree {
		Tree {
			nodes: vec![
				Node::Branch(BranchNode {
					left_child_index: 1,
					right_child_index: 2,
					split: BranchSplit::Continuous(BranchSplitContinuous {
						feature_index,
						split_value,
						invalid_values_direction: SplitDirection::Left,
					}),
				}),
				Node::Leaf(LeafNode { value: left }),
				Node::Leaf(LeafNode { value: right }),
			],
		}
	}

	/// A forest that switches the pump on when the water is high or rain is coming.
	pub fn test_model() -> Model {
		Model {
			name: "test".to_owned(),
			feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
			classifier: BinaryClassifier {
				classes: vec!["OFF".to_owned(), "ON".to_owned()],
				trees: vec![stump(0, 5.0, 0.0, 1.0), stump(1, 50.0, 0.0, 1.0)],
				feature_importances: Some(vec![0.5, 0.5, 0.0, 0.0, 0.0]),
			},
		}
	}

	fn temp_path(name: &str) -> std::path::PathBuf {
		std::env::temp_dir().join(format!("dewater_{}_{}", std::process::id(), name))
	}

	#[test]
	fn test_check_schema() {
		let mut model = test_model();
		assert!(model.check_schema().is_ok());
		model.feature_names.swap(0, 1);
		match model.check_schema() {
			Err(Error::SchemaMismatch { expected, found }) => {
				assert_eq!(expected[0], "water_level");
				assert_eq!(found[0], "rain_forecast");
			}
			other => panic!("expected a schema mismatch, got {:?}", other),
		}
		let mut model = test_model();
		model.feature_names.pop();
		assert!(model.check_schema().is_err());
	}

	#[test]
	fn test_binary_file() {
		let model = test_model();
		let path = temp_path("test_binary_file.pump");
		model.to_file(&path).unwrap();
		let loaded = Model::from_path(&path).unwrap();
		let bytes = std::fs::read(&path).unwrap();
		std::fs::remove_file(&path).unwrap();
		assert_eq!(loaded, model);
		assert_eq!(bytes[0], MAJOR_VERSION);
		assert_eq!(Model::from_slice(&bytes).unwrap(), model);
	}

	#[test]
	fn test_unknown_major_version() {
		let model = test_model();
		let path = temp_path("test_unknown_major_version.pump");
		model.to_file(&path).unwrap();
		let mut bytes = std::fs::read(&path).unwrap();
		std::fs::remove_file(&path).unwrap();
		bytes[0] = 7;
		assert!(matches!(Model::from_slice(&bytes), Err(Error::Load { .. })));
		assert!(matches!(Model::from_slice(&[]), Err(Error::Load { .. })));
	}

	#[test]
	fn test_missing_file() {
		let path = temp_path("does_not_exist.pump");
		assert!(matches!(Model::from_path(&path), Err(Error::Load { .. })));
	}

	#[test]
	fn test_invalid_structure_is_a_load_error() {
		let mut model = test_model();
		// Point a split at a feature the model does not have.
		model.classifier.trees[0] = stump(5, 1.0, 0.0, 1.0);
		let json = serde_json::to_string(&model).unwrap();
		match Model::from_json(&json) {
			Err(Error::Load { message, .. }) => assert!(message.contains("feature 5")),
			other => panic!("expected a load error, got {:?}", other),
		}
		assert!(matches!(
			Model::from_json("{\"name\": \"truncated\""),
			Err(Error::Load { .. })
		));
	}
}
