use super::{Node, Tree};
use dewater_dataframe::Value;
use itertools::izip;
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use thiserror::Error;

/// A binary classifier is a random forest trained to predict binary target values, for example whether a pump should be switched on or not.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BinaryClassifier {
	/// The names of the two classes. The second class is the positive class.
	pub classes: Vec<String>,
	/// The trees for this model.
	pub trees: Vec<Tree>,
	/// The importance of each feature, as computed when the model was trained. Some models do not carry importances.
	#[serde(default)]
	pub feature_importances: Option<Vec<f32>>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
	#[error("the forest has no trees")]
	EmptyForest,
	#[error("expected 2 classes but found {0}")]
	ClassCount(usize),
	#[error("tree {tree_index} has no nodes")]
	EmptyTree { tree_index: usize },
	#[error("node {node_index} of tree {tree_index} has invalid child index {child_index}")]
	ChildIndex {
		tree_index: usize,
		node_index: usize,
		child_index: usize,
	},
	#[error("node {node_index} of tree {tree_index} splits on feature {feature_index} but the model has {n_features} features")]
	FeatureIndex {
		tree_index: usize,
		node_index: usize,
		feature_index: usize,
		n_features: usize,
	},
	#[error("leaf {node_index} of tree {tree_index} has value {value}, which is not a probability")]
	LeafValue {
		tree_index: usize,
		node_index: usize,
		value: f32,
	},
}

impl BinaryClassifier {
	/// Make predictions. `features` has shape (n_examples, n_features) and `probabilities` has shape (n_examples, 2), where the columns are the probabilities of the negative and positive class.
	pub fn predict(&self, features: ArrayView2<Value>, mut probabilities: ArrayViewMut2<f32>) {
		for (example, mut probabilities) in
			izip!(features.genrows(), probabilities.genrows_mut())
		{
			let example = example.to_vec();
			let probability = self.predict_one(&example);
			probabilities[0] = 1.0 - probability;
			probabilities[1] = probability;
		}
	}

	/// Compute the probability of the positive class for a single example by averaging the output of every tree.
	pub fn predict_one(&self, features: &[Value]) -> f32 {
		let n_trees = self.trees.len().to_f32().unwrap_or(0.0);
		let total: f32 = self.trees.iter().map(|tree| tree.predict(features)).sum();
		total / n_trees
	}

	/// Check that every tree can be evaluated on examples with `n_features` features. After this succeeds, prediction will not index out of bounds or loop forever.
	pub fn validate(&self, n_features: usize) -> Result<(), ValidationError> {
		if self.classes.len() != 2 {
			return Err(ValidationError::ClassCount(self.classes.len()));
		}
		if self.trees.is_empty() {
			return Err(ValidationError::EmptyForest);
		}
		for (tree_index, tree) in self.trees.iter().enumerate() {
			if tree.nodes.is_empty() {
				return Err(ValidationError::EmptyTree { tree_index });
			}
			for (node_index, node) in tree.nodes.iter().enumerate() {
				match node {
					Node::Branch(branch) => {
						// Children must come after their parent, which rules out cycles.
						for child_index in [branch.left_child_index, branch.right_child_index].iter() {
							if *child_index <= node_index || *child_index >= tree.nodes.len() {
								return Err(ValidationError::ChildIndex {
									tree_index,
									node_index,
									child_index: *child_index,
								});
							}
						}
						let feature_index = branch.split.feature_index();
						if feature_index >= n_features {
							return Err(ValidationError::FeatureIndex {
								tree_index,
								node_index,
								feature_index,
								n_features,
							});
						}
					}
					Node::Leaf(leaf) => {
						if !(0.0..=1.0).contains(&leaf.value) {
							return Err(ValidationError::LeafValue {
								tree_index,
								node_index,
								value: leaf.value,
							});
						}
					}
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{continuous, leaf};

	fn forest() -> BinaryClassifier {
		BinaryClassifier {
			classes: vec!["OFF".to_owned(), "ON".to_owned()],
			trees: vec![
				Tree {
					nodes: vec![continuous(0, 4.0, 1, 2), leaf(0.0), leaf(1.0)],
				},
				Tree {
					nodes: vec![continuous(1, 50.0, 1, 2), leaf(0.25), leaf(0.75)],
				},
			],
			feature_importances: Some(vec![0.5, 0.5]),
		}
	}

	#[test]
	fn test_predict_averages_trees() {
		let model = forest();
		let features = arr2(&[
			[Value::Number(5.0), Value::Number(10.0)],
			[Value::Number(1.0), Value::Number(90.0)],
		]);
		let mut probabilities = Array2::zeros((2, 2));
		model.predict(features.view(), probabilities.view_mut());
		assert_eq!(probabilities, arr2(&[[0.375, 0.625], [0.625, 0.375]]));
	}

	#[test]
	fn test_validate() {
		let model = forest();
		assert_eq!(model.validate(2), Ok(()));
		assert_eq!(
			model.validate(1),
			Err(ValidationError::FeatureIndex {
				tree_index: 1,
				node_index: 0,
				feature_index: 1,
				n_features: 1,
			})
		);
	}

	#[test]
	fn test_validate_rejects_cycles() {
		let mut model = forest();
		model.trees[0].nodes[0] = continuous(0, 4.0, 0, 2);
		assert_eq!(
			model.validate(2),
			Err(ValidationError::ChildIndex {
				tree_index: 0,
				node_index: 0,
				child_index: 0,
			})
		);
	}

	#[test]
	fn test_validate_rejects_bad_leaves_and_classes() {
		let mut model = forest();
		model.trees[1].nodes[2] = leaf(1.5);
		assert_eq!(
			model.validate(2),
			Err(ValidationError::LeafValue {
				tree_index: 1,
				node_index: 2,
				value: 1.5,
			})
		);
		let mut model = forest();
		model.classes.pop();
		assert_eq!(model.validate(2), Err(ValidationError::ClassCount(1)));
		let mut model = forest();
		model.trees.clear();
		assert_eq!(model.validate(2), Err(ValidationError::EmptyForest));
	}
}
