use super::route::{RequiredRoles, Route, RouteAccess};
use crate::user::Session;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToLogin,
    /// The user is logged in but may not view the route, send them to [`Route::FALLBACK`].
    RedirectToFallback,
}

/// Decides whether `session` may view a route guarded by `required`.
/// Being logged out always wins over role checks.
pub fn authorize(session: Option<&Session>, required: RequiredRoles) -> RouteDecision {
    match session {
        None => RouteDecision::RedirectToLogin,
        Some(session) if required.admits(session.role) => RouteDecision::Allow,
        Some(_) => RouteDecision::RedirectToFallback,
    }
}

/// Outcome of opening a path in the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
    NotFound,
}

pub fn navigate(session: Option<&Session>, path: &str) -> Navigation {
    let trimmed = path.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return match session {
            Some(_) => Navigation::Redirect(Route::Home),
            None => Navigation::Redirect(Route::Login),
        };
    }

    let route = match Route::from_path(trimmed) {
        Some(route) => route,
        None if session.is_some() => return Navigation::NotFound,
        None => return Navigation::Redirect(Route::Login),
    };

    match route.access() {
        RouteAccess::Public => Navigation::Render(route),
        RouteAccess::Guarded(required) => match authorize(session, required) {
            RouteDecision::Allow => Navigation::Render(route),
            RouteDecision::RedirectToLogin => {
                debug!("Navigation to {} needs a login", route.path());
                Navigation::Redirect(Route::Login)
            }
            RouteDecision::RedirectToFallback => {
                debug!("Navigation to {} not allowed for this role", route.path());
                Navigation::Redirect(Route::FALLBACK)
            }
        },
    }
}

/// Navigation bar entries, in display order.
pub const NAV_BAR: [Route; 6] = [
    Route::Home,
    Route::PremiumListing,
    Route::Sales,
    Route::Statistics,
    Route::LowStock,
    Route::Customers,
];

/// The navigation bar entries `session` may follow.
pub fn nav_entries(session: Option<&Session>) -> Vec<Route> {
    NAV_BAR
        .into_iter()
        .filter(|route| match route.access() {
            RouteAccess::Public => true,
            RouteAccess::Guarded(required) => {
                authorize(session, required) == RouteDecision::Allow
            }
        })
        .collect()
}
