//! Docker image build and publish functionality for buildenv
//!
//! This crate builds the generated builder-image Dockerfiles against the
//! Docker Engine API and pushes the resulting tags to the target registry,
//! including build context creation and registry authentication.

pub mod auth;
pub mod builder;
pub mod context;
pub mod error;
pub mod pusher;

pub use auth::RegistryAuth;
pub use builder::ImageBuilder;
pub use context::ContextBuilder;
pub use error::{BuildError, BuildResult};
pub use pusher::{ImagePusher, split_image_tag};
