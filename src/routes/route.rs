use crate::user::Role;

const ADMIN_OR_STAFF: &[Role] = &[Role::Admin, Role::Staff];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Who may view a guarded route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRoles {
    AnyAuthenticated,
    OneOf(&'static [Role]),
}

impl RequiredRoles {
    pub fn admits(&self, role: Role) -> bool {
        match self {
            RequiredRoles::AnyAuthenticated => true,
            RequiredRoles::OneOf(roles) => roles.contains(&role),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Guarded(RequiredRoles),
}

/// Every navigation target of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Home,
    PremiumListing,
    Sales,
    Customers,
    Statistics,
    PriceAggregate,
    LowStock,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Login,
        Route::Register,
        Route::Home,
        Route::PremiumListing,
        Route::Sales,
        Route::Customers,
        Route::Statistics,
        Route::PriceAggregate,
        Route::LowStock,
    ];

    /// Where an authenticated user lands when a route is off limits.
    pub const FALLBACK: Route = Route::Home;

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Home => "/home",
            Route::PremiumListing => "/expensive",
            Route::Sales => "/sales",
            Route::Customers => "/customers",
            Route::Statistics => "/statistics",
            Route::PriceAggregate => "/cars/average-price",
            Route::LowStock => "/low-stock",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Register => "Register",
            Route::Home => "Home",
            Route::PremiumListing => "Expensive Cars",
            Route::Sales => "Sales",
            Route::Customers => "Customers",
            Route::Statistics => "Statistics",
            Route::PriceAggregate => "Average Price",
            Route::LowStock => "Low Stock",
        }
    }

    /// Resolves a path, aliases included. Trailing slashes are ignored.
    /// The root path is not a route, see [`super::navigate`].
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        match path {
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/home" => Some(Route::Home),
            "/expensive" | "/expensive-cars" => Some(Route::PremiumListing),
            "/sales" => Some(Route::Sales),
            "/customers" => Some(Route::Customers),
            "/statistics" => Some(Route::Statistics),
            "/cars/average-price" => Some(Route::PriceAggregate),
            "/low-stock" | "/cars/low-stock" => Some(Route::LowStock),
            _ => None,
        }
    }

    pub fn access(self) -> RouteAccess {
        match self {
            Route::Login | Route::Register => RouteAccess::Public,
            Route::Home | Route::PremiumListing => {
                RouteAccess::Guarded(RequiredRoles::AnyAuthenticated)
            }
            Route::Sales | Route::Statistics | Route::PriceAggregate | Route::LowStock => {
                RouteAccess::Guarded(RequiredRoles::OneOf(ADMIN_OR_STAFF))
            }
            Route::Customers => RouteAccess::Guarded(RequiredRoles::OneOf(ADMIN_ONLY)),
        }
    }
}
