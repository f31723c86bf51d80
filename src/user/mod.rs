pub mod auth;
pub mod permissions;
pub mod session;

pub use auth::{AuthResponse, AuthTokenValue, AuthenticationError, Authenticator, RestAuthenticator};
pub use permissions::{is_allowed, is_allowed_raw, parse_role, Action, Role};
pub use session::{Session, SessionState};
