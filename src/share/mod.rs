pub mod codec;
mod context;
pub mod middleware;
pub mod policy;
pub mod resolver;
mod validator;

pub use context::{redact_key, ShareContext};
pub use resolver::{resolve, ExecutionSide, ResolvedShare, ShareForwarded};
pub use validator::{validate_share_key, ShareValidator};
