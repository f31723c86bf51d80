use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[serde(rename = "view_cars")]
    ViewInventory,
    #[serde(rename = "add_car")]
    AddItem,
    #[serde(rename = "edit_car")]
    EditItem,
    #[serde(rename = "delete_car")]
    DeleteItem,
    ViewStatistics,
    #[serde(rename = "view_average_price")]
    ViewPriceAggregate,
    #[serde(rename = "view_expensive")]
    ViewPremiumListing,
    ViewLowStock,
    ManageSales,
    ManageCustomers,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::ViewInventory,
        Action::AddItem,
        Action::EditItem,
        Action::DeleteItem,
        Action::ViewStatistics,
        Action::ViewPriceAggregate,
        Action::ViewPremiumListing,
        Action::ViewLowStock,
        Action::ManageSales,
        Action::ManageCustomers,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::ViewInventory => "view_cars",
            Action::AddItem => "add_car",
            Action::EditItem => "edit_car",
            Action::DeleteItem => "delete_car",
            Action::ViewStatistics => "view_statistics",
            Action::ViewPriceAggregate => "view_average_price",
            Action::ViewPremiumListing => "view_expensive",
            Action::ViewLowStock => "view_low_stock",
            Action::ManageSales => "manage_sales",
            Action::ManageCustomers => "manage_customers",
        }
    }

    /// Exact match on the capability token, unknown tokens yield `None`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Action::ALL.into_iter().find(|action| action.as_str() == s)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const ADMIN_ACTIONS: &[Action] = &[
    Action::ViewInventory,
    Action::AddItem,
    Action::EditItem,
    Action::DeleteItem,
    Action::ViewStatistics,
    Action::ViewPriceAggregate,
    Action::ViewPremiumListing,
    Action::ViewLowStock,
    Action::ManageSales,
    Action::ManageCustomers,
];
const STAFF_ACTIONS: &[Action] = &[
    Action::ViewInventory,
    Action::ViewStatistics,
    Action::ViewPriceAggregate,
    Action::ViewPremiumListing,
    Action::ViewLowStock,
    Action::ManageSales,
];
const CUSTOMER_ACTIONS: &[Action] = &[
    Action::ViewInventory,
    Action::ViewStatistics,
    Action::ViewPriceAggregate,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Customer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Staff, Role::Customer];

    /// The role assumed whenever the real one can't be determined.
    pub const LEAST_PRIVILEGED: Role = Role::Customer;

    pub fn actions(&self) -> &'static [Action] {
        match self {
            Role::Admin => ADMIN_ACTIONS,
            Role::Staff => STAFF_ACTIONS,
            Role::Customer => CUSTOMER_ACTIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Customer => "customer",
        }
    }

    /// Case-insensitive, strict: anything outside the closed set is `None`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total parse used at every trust boundary (server responses, persisted records).
/// Unrecognized input maps to [`Role::LEAST_PRIVILEGED`].
pub fn parse_role(raw: &str) -> Role {
    Role::from_str(raw).unwrap_or(Role::LEAST_PRIVILEGED)
}

pub fn is_allowed(role: Role, action: Action) -> bool {
    role.actions().contains(&action)
}

/// Same as [`is_allowed`] over raw tokens. An unknown role or action is never allowed,
/// it does not fall back to the least privileged role.
pub fn is_allowed_raw(role: &str, action: &str) -> bool {
    match (Role::from_str(role), Action::from_str(action)) {
        (Some(role), Some(action)) => is_allowed(role, action),
        _ => false,
    }
}
