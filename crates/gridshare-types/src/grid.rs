use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::GridId;
use crate::visibility::Visibility;

/// One cell of a grid: four non-negative channel values (red, green, blue,
/// size). The meaning belongs to the client; only the shape is checked.
pub type Block = [u32; 4];

/// Grid flavour the client rendered from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridClass {
    BlockGrid,
    ImageGrid,
}

impl fmt::Display for GridClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockGrid => write!(f, "BlockGrid"),
            Self::ImageGrid => write!(f, "ImageGrid"),
        }
    }
}

/// Opaque language runtime version descriptor, e.g. `[3, 11, 4, "final", 0]`.
///
/// Stored exactly as received.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeVersion(pub Vec<serde_json::Value>);

impl RuntimeVersion {
    pub fn new(parts: Vec<serde_json::Value>) -> Self {
        Self(parts)
    }
}

/// The grid payload itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridData {
    pub lines_on: bool,
    pub width: u32,
    pub height: u32,
    /// Rows of blocks.
    pub blocks: Vec<Vec<Block>>,
}

impl GridData {
    pub fn new(width: u32, height: u32, lines_on: bool, blocks: Vec<Vec<Block>>) -> Self {
        Self {
            lines_on,
            width,
            height,
            blocks,
        }
    }

    /// Number of blocks across all rows.
    pub fn block_count(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }
}

/// A grid as handed to the store, before it has an id or timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewGrid {
    pub visibility: Visibility,
    pub library_version: String,
    pub runtime_version: RuntimeVersion,
    pub grid_class: GridClass,
    pub code_cells: Option<Vec<String>>,
    pub grid_data: GridData,
}

impl NewGrid {
    /// Attach the store-assigned id and insertion time.
    pub fn into_document(self, id: GridId, created_at: DateTime<Utc>) -> GridDocument {
        GridDocument {
            id,
            visibility: self.visibility,
            library_version: self.library_version,
            runtime_version: self.runtime_version,
            grid_class: self.grid_class,
            code_cells: self.code_cells,
            grid_data: self.grid_data,
            created_at,
        }
    }
}

/// A stored grid. Immutable once written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridDocument {
    pub id: GridId,
    pub visibility: Visibility,
    pub library_version: String,
    pub runtime_version: RuntimeVersion,
    pub grid_class: GridClass,
    pub code_cells: Option<Vec<String>>,
    pub grid_data: GridData,
    pub created_at: DateTime<Utc>,
}

impl GridDocument {
    /// The fields a client supplied, without the store-assigned ones.
    pub fn content(&self) -> NewGrid {
        NewGrid {
            visibility: self.visibility,
            library_version: self.library_version.clone(),
            runtime_version: self.runtime_version.clone(),
            grid_class: self.grid_class,
            code_cells: self.code_cells.clone(),
            grid_data: self.grid_data.clone(),
        }
    }

    /// Project to the externally visible form (no internal id).
    pub fn to_view(&self) -> GridView {
        GridView {
            secret: self.visibility.is_secret(),
            ipb_version: self.library_version.clone(),
            python_version: self.runtime_version.clone(),
            ipb_class: self.grid_class,
            code_cells: self.code_cells.clone(),
            grid_data: self.grid_data.clone(),
            created_at: self.created_at,
        }
    }
}

/// Wire form of a stored grid, using the same field names as submissions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridView {
    pub secret: bool,
    pub ipb_version: String,
    pub python_version: RuntimeVersion,
    pub ipb_class: GridClass,
    pub code_cells: Option<Vec<String>>,
    pub grid_data: GridData,
    pub created_at: DateTime<Utc>,
}
