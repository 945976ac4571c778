//! Services for facturas-service.

pub mod auth;
pub mod database;
pub mod jwt;
pub mod ledger;
pub mod lifecycle;
pub mod metrics;
pub mod numbering;

pub use auth::{AuthService, LoginResponse, Role};
pub use database::Database;
pub use jwt::{AccessTokenClaims, JwtService};
pub use ledger::{AddLineInput, LedgerService};
pub use lifecycle::LifecycleService;
pub use numbering::NumberingService;
