//! Read/write aid-tensor JSON files.
//!
//! Tensor JSON is the "portable" representation of a run's aid surface:
//! the three named axes plus row-major values, with `null` marking cells
//! that had no household-economics record. The schema is defined by
//! `domain::TensorFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::TensorFile;
use crate::error::AppError;
use crate::model::aid::AidTensor;

/// Write an aid tensor to a JSON file.
pub fn write_tensor_json(path: &Path, aid: &AidTensor) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::ingest(format!("Failed to create tensor JSON '{}': {e}", path.display()))
    })?;

    serde_json::to_writer_pretty(file, &aid.to_file())
        .map_err(|e| AppError::ingest(format!("Failed to write tensor JSON: {e}")))?;

    Ok(())
}

/// Read a previously exported tensor file.
pub fn read_tensor_json(path: &Path) -> Result<TensorFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::ingest(format!("Failed to open tensor JSON '{}': {e}", path.display()))
    })?;
    let tensor: TensorFile = serde_json::from_reader(file)
        .map_err(|e| AppError::ingest(format!("Invalid tensor JSON: {e}")))?;
    Ok(tensor)
}
