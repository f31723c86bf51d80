//! Navigation targets and the guard deciding who may open them.

mod guard;
mod route;

pub use guard::{authorize, nav_entries, navigate, Navigation, RouteDecision, NAV_BAR};
pub use route::{RequiredRoles, Route, RouteAccess};
