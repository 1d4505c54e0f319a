//! # castmatch server
//!
//! HTTP surface for the castmatch face-identification service.
//!
//! Three multipart endpoints drive the pipeline: `/add_known_face`
//! enrolls an identity from a photo, `/photo_recognition` and
//! `/video_recognition` match uploaded media against the catalog and
//! return enriched profile records. All collaborators (embedding store,
//! face extractor, person directory) are constructed at startup and
//! injected through [`state::AppState`].

pub mod config;
pub mod error;
pub mod media;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;
