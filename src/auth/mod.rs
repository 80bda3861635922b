mod extractors;
pub mod jwt;
mod session;

pub use extractors::{AdminSession, AppState, FromRef};
pub use jwt::{create_session_token, decode_session_token, Claims};
pub use session::{session_token, SessionAuth, SessionVerdict};
