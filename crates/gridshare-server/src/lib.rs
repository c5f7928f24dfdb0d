//! HTTP server for gridshare.
//!
//! Exposes the [`GridRepository`] over a small JSON API:
//!
//! | route                      | result                                   |
//! |----------------------------|------------------------------------------|
//! | `POST /post`               | store a submission, return its share URL |
//! | `GET /get/{token}`         | `grid_data` of a public grid             |
//! | `GET /get/secret/{token}`  | `grid_data` of a secret grid             |
//! | `GET /grid/{token}`        | full view of a public grid               |
//! | `GET /grid/secret/{token}` | full view of a secret grid               |
//! | `GET /random`              | `303` to a random public grid            |
//! | `GET /health`              | liveness                                 |
//!
//! The URL prefix alone decides which partition a token is decoded in.
//!
//! [`GridRepository`]: gridshare_repo::GridRepository

pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use error::{ServerError, ServerResult};
pub use handler::{share_url, AppState};
pub use router::build_router;
pub use server::GridshareServer;
