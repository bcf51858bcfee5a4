//! Remote stage service abstraction
//!
//! The pipeline treats requirements analysis, impact assessment and code
//! generation as opaque remote calls. This module provides the trait the
//! controller depends on, an HTTP implementation, and a scripted mock.

mod client;
mod error;
mod http;
mod mock;
pub mod types;

pub use client::RemoteStageService;
pub use error::ServiceError;
pub use http::HttpStageService;
pub use mock::{MockReply, MockStageService, RecordedCall};
pub use types::{GeneratedFile, RequirementsRequest};
