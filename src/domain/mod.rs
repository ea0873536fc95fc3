pub mod engine;
pub mod errors;
pub mod ignore;
pub mod models;
pub mod pac_response;
pub mod uri;

pub use engine::{Engine, EngineOptions};
pub use errors::{ProxyError, Result};
pub use ignore::{is_ignored, IgnorePattern};
pub use models::{ConfigCandidate, Priority, ProxyUri};
pub use uri::{ParseError, Uri};
