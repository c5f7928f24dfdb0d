//! Foundation types for gridshare.
//!
//! Every other gridshare crate depends on `gridshare-types`. It owns the
//! stored entity ([`GridDocument`]), the two visibility partitions, the
//! partition-local row identifier and the public token that stands in for
//! it, plus validation of incoming grid submissions.
//!
//! # Key Types
//!
//! - [`Visibility`] — `Public` or `Secret`; selects partition and salt
//! - [`GridId`] — partition-local, 1-based row identifier (never exposed)
//! - [`GridToken`] — short obfuscated identifier handed to users
//! - [`GridData`] — width/height/lines flag and the block matrix
//! - [`NewGrid`] — fields of a grid before the store assigns id and time
//! - [`GridDocument`] — a stored grid
//! - [`GridSubmission`] — the wire payload accepted from clients

pub mod error;
pub mod grid;
pub mod id;
pub mod submission;
pub mod visibility;

pub use error::ValidationError;
pub use grid::{Block, GridClass, GridData, GridDocument, GridView, NewGrid, RuntimeVersion};
pub use id::{GridId, GridToken};
pub use submission::GridSubmission;
pub use visibility::Visibility;
