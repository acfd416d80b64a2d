//! Officer authentication.
//!
//! Credential checks are delegated to an [`IdentityProvider`]; this module only
//! issues, verifies, and clears the signed `auth-token` session cookie.

mod error;
pub mod gate;
pub mod identity;
pub mod router;
pub mod session;

pub use error::AuthError;
pub use gate::{LoginRequest, LoginSuccess, SessionGate, SessionState};
pub use identity::{IdentityProvider, OfficerIdentity, ProviderError, StaticIdentityProvider};
pub use router::auth_router;
pub use session::{
    OfficerSession, SessionCookie, SessionKeys, SESSION_COOKIE_NAME, SESSION_TTL_DAYS,
};
