//! Tabular data handling for the grade prediction pipeline: dataset
//! assembly, the column-typed frame, and the persisted categorical
//! encoder table.

pub mod assembly;
pub mod encode;
pub mod error;
pub mod frame;

pub use encode::{EncoderTable, FieldEncoder, OOV_SENTINEL};
pub use error::{Result, TabularError};
pub use frame::{Column, Frame};
