//! Shared constants for end-to-end tests
//!
//! Credentials and inventory of the fake backend live here, update only this
//! file when the test data changes.

// ============================================================================
// Test User Credentials
// ============================================================================

pub const ADMIN_USER: &str = "alice";
pub const ADMIN_PASS: &str = "adminpass123";

pub const STAFF_USER: &str = "bob";
pub const STAFF_PASS: &str = "staffpass123";

pub const CUSTOMER_USER: &str = "carol";
pub const CUSTOMER_PASS: &str = "customerpass123";

/// Known to the backend, which reports no role for it.
pub const ROLELESS_USER: &str = "dave";
pub const ROLELESS_PASS: &str = "rolelesspass123";

/// Known to the backend, which reports a role the console does not know.
pub const SUPERUSER_USER: &str = "erin";
pub const SUPERUSER_PASS: &str = "superpass123";

// ============================================================================
// Test Inventory
// ============================================================================

pub const CAR_1_ID: u64 = 1;
pub const CAR_2_ID: u64 = 2;
pub const CAR_5_ID: u64 = 5;

/// Number of cars seeded into every fake backend.
pub const SEEDED_CARS: usize = 5;

/// Cars per page of the paginated listing, small enough to need several pages.
pub const PAGE_SIZE: usize = 2;

/// The fake backend lists cars priced above this as expensive.
pub const PREMIUM_PRICE_THRESHOLD: f64 = 40000.0;

/// The fake backend lists cars with less stock than this as low on stock.
pub const LOW_STOCK_THRESHOLD: u32 = 3;

/// Image shown for cars without images of their own.
pub const DEFAULT_IMAGE: &str = "/default.jpeg";

// ============================================================================
// Server Configuration
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;
pub const REQUEST_TIMEOUT_SEC: u64 = 5;
