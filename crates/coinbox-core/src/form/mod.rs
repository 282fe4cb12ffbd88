//! # Forms
//!
//! Generic list/detail editing: a [`FormController`] per entity type and a
//! [`FormPage`] view model driving it.

mod controller;
mod page;

pub use controller::{FieldDescriptor, FieldValue, FormController, FormData};
pub use page::{ButtonStates, FormMode, FormPage};
