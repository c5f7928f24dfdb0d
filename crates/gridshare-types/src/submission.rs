//! Incoming grid payloads and their schema checks.
//!
//! Shape errors (wrong JSON types, negative channel values, blocks that are
//! not four-element arrays) are rejected by deserialization. Everything the
//! type system cannot express is checked by [`GridSubmission::validate`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::grid::{GridClass, GridData, NewGrid, RuntimeVersion};
use crate::visibility::Visibility;

/// Number of components in a runtime version descriptor.
pub const RUNTIME_VERSION_PARTS: usize = 5;

/// A grid as posted by a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSubmission {
    pub python_version: RuntimeVersion,
    pub ipb_version: String,
    pub ipb_class: GridClass,
    /// Present but possibly `null`.
    #[serde(deserialize_with = "required_nullable")]
    pub code_cells: Option<Vec<String>>,
    pub secret: bool,
    pub grid_data: GridData,
}

fn required_nullable<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer)
}

impl GridSubmission {
    /// Parse and validate a JSON request body.
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        let submission: Self = serde_json::from_slice(body)
            .map_err(|e| ValidationError::MalformedJson(e.to_string()))?;
        submission.validate()?;
        Ok(submission)
    }

    /// Check the constraints deserialization does not cover.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.python_version.0.len() != RUNTIME_VERSION_PARTS {
            return Err(ValidationError::RuntimeVersionLength {
                expected: RUNTIME_VERSION_PARTS,
                actual: self.python_version.0.len(),
            });
        }
        if !contains_dotted_version(&self.ipb_version) {
            return Err(ValidationError::LibraryVersion(self.ipb_version.clone()));
        }
        if matches!(&self.code_cells, Some(cells) if cells.is_empty()) {
            return Err(ValidationError::EmptyCodeCells);
        }
        validate_grid_data(&self.grid_data)
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::from_secret_flag(self.secret)
    }

    /// Convert into the store's input type.
    pub fn into_new_grid(self) -> NewGrid {
        NewGrid {
            visibility: Visibility::from_secret_flag(self.secret),
            library_version: self.ipb_version,
            runtime_version: self.python_version,
            grid_class: self.ipb_class,
            code_cells: self.code_cells,
            grid_data: self.grid_data,
        }
    }
}

fn validate_grid_data(data: &GridData) -> Result<(), ValidationError> {
    if data.width == 0 {
        return Err(ValidationError::ZeroDimension { name: "width" });
    }
    if data.height == 0 {
        return Err(ValidationError::ZeroDimension { name: "height" });
    }
    let first = data.blocks.first().ok_or(ValidationError::NoBlocks)?;
    let expected = first.len();
    for (row, blocks) in data.blocks.iter().enumerate() {
        if blocks.is_empty() {
            return Err(ValidationError::EmptyRow { row });
        }
        if blocks.len() != expected {
            return Err(ValidationError::RaggedRows {
                row,
                expected,
                actual: blocks.len(),
            });
        }
    }
    Ok(())
}

/// True if `s` contains `<digits>.<digits>` anywhere.
fn contains_dotted_version(s: &str) -> bool {
    s.as_bytes()
        .windows(3)
        .any(|w| w[0].is_ascii_digit() && w[1] == b'.' && w[2].is_ascii_digit())
}
