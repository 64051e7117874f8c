/*!
This crate implements inference for ensembles of decision trees. A [`BinaryClassifier`] is a random forest: every tree outputs the fraction of positive training examples in the leaf an example lands in, and the forest averages those fractions to get the probability of the positive class.

Training is not part of this crate. Models are produced elsewhere and deserialized with serde.
*/

#![allow(clippy::tabs_in_doc_comments)]

use dewater_dataframe::Value;
use num_traits::ToPrimitive;

mod binary_classifier;

pub use binary_classifier::{BinaryClassifier, ValidationError};

/// Trees are stored as a `Vec` of `Node`s. Each branch in the tree has two indexes into the `Vec`, one for each of its children. The root is always the first node.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tree {
	pub nodes: Vec<Node>,
}

impl Tree {
	/// Make a prediction for a given example.
	pub fn predict(&self, features: &[Value]) -> f32 {
		// Start at the root node.
		let mut node_index = 0;
		// Traverse the tree until we get to a leaf.
		loop {
			match &self.nodes[node_index] {
				Node::Branch(BranchNode {
					left_child_index,
					right_child_index,
					split,
				}) => {
					let direction = split.direction(features);
					node_index = match direction {
						SplitDirection::Left => *left_child_index,
						SplitDirection::Right => *right_child_index,
					};
				}
				// We made it to a leaf! The prediction is the leaf's value.
				Node::Leaf(LeafNode { value }) => return *value,
			}
		}
	}
}

/// A node is either a branch or a leaf.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
	Branch(BranchNode),
	Leaf(LeafNode),
}

/// A `BranchNode` is a branch in a tree.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BranchNode {
	/// This is the index in the tree's node vector for this node's left child.
	pub left_child_index: usize,
	/// This is the index in the tree's node vector for this node's right child.
	pub right_child_index: usize,
	/// When making predictions, an example will be sent either to the right or left child. The `split` contains the information necessary to determine which way it will go.
	pub split: BranchSplit,
}

/// A `BranchSplit` describes how examples are sent to the left or right child given their feature values. A `Continous` split compares a number against a threshold, and a `Discrete` split looks up a category code.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchSplit {
	Continuous(BranchSplitContinuous),
	Discrete(BranchSplitDiscrete),
}

/// A continuous branch split takes the value of a single feature, compares it with a `split_value`, and if the value is <= `split_value`, the example is sent left, and if it is > `split_value`, it is sent right.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BranchSplitContinuous {
	/// This is the index of the feature to get the value for.
	pub feature_index: usize,
	/// This is the threshold value of the split.
	pub split_value: f32,
	/// This is the direction invalid values should be sent.
	pub invalid_values_direction: SplitDirection,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitDirection {
	Left,
	Right,
}

/// A discrete branch split takes the category code of a single feature and looks up which way the example should be sent. Codes with no entry in `directions` are sent left.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BranchSplitDiscrete {
	/// This is the index of the feature to get the value for.
	pub feature_index: usize,
	/// This specifies which direction, left or right, an example should be sent, indexed by the feature's category code.
	pub directions: Vec<SplitDirection>,
}

/// The leaves in a tree hold the values to output for examples that get sent to them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LeafNode {
	/// This is the value to output. For a classifier's trees it is the fraction of positive examples that reached this leaf during training.
	pub value: f32,
}

impl BranchSplit {
	pub fn feature_index(&self) -> usize {
		match self {
			Self::Continuous(b) => b.feature_index,
			Self::Discrete(b) => b.feature_index,
		}
	}

	fn direction(&self, features: &[Value]) -> SplitDirection {
		match self {
			Self::Continuous(BranchSplitContinuous {
				feature_index,
				split_value,
				invalid_values_direction,
			}) => match feature_number(features[*feature_index]) {
				Some(value) if value <= *split_value => SplitDirection::Left,
				Some(_) => SplitDirection::Right,
				None => *invalid_values_direction,
			},
			Self::Discrete(BranchSplitDiscrete {
				feature_index,
				directions,
			}) => feature_code(features[*feature_index])
				.and_then(|code| directions.get(code).copied())
				.unwrap_or(SplitDirection::Left),
		}
	}
}

/// Read a feature as a number. Enum values are compared by their 0-based code, which is how models trained on integer-coded categories see them.
fn feature_number(value: Value) -> Option<f32> {
	match value {
		Value::Number(value) if value.is_nan() => None,
		Value::Number(value) => Some(value),
		Value::Enum(Some(value)) => (value.get() - 1).to_f32(),
		Value::Enum(None) => None,
	}
}

/// Read a feature as a 0-based category code. Numbers must be non-negative integers.
fn feature_code(value: Value) -> Option<usize> {
	match value {
		Value::Number(value) if value >= 0.0 && value.fract() == 0.0 => value.to_usize(),
		Value::Number(_) => None,
		Value::Enum(Some(value)) => Some(value.get() - 1),
		Value::Enum(None) => None,
	}
}

#[cfg(test)]
pub(crate) fn continuous(
	feature_index: usize,
	split_value: f32,
	left_child_index: usize,
	right_child_index: usize,
) -> Node {
	Node::Branch(BranchNode {
		left_child_index,
		right_child_index,
		split: BranchSplit::Continuous(BranchSplitContinuous {
			feature_index,
			split_value,
			invalid_values_direction: SplitDirection::Right,
		}),
	})
}

#[cfg(test)]
pub(crate) fn leaf(value: f32) -> Node {
	Node::Leaf(LeafNode { value })
}
