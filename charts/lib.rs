/*!
This crate draws charts as plain text for display in a terminal.
*/

#![allow(clippy::tabs_in_doc_comments)]

pub mod bar_chart;
pub mod scatter_chart;

pub use self::{bar_chart::*, scatter_chart::*};
