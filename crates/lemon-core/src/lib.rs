//! # lemon-core: Pure Business Logic for Little Lemon
//!
//! This crate is the **heart** of the ordering backend. It contains the
//! money arithmetic, the domain types, and the role/permission rules as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Little Lemon Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 lemon-api (axum + services)                     │   │
//! │  │    bearer token ──► RoleSet ──► policy::authorize ──► engine    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lemon-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  policy   │  │   │
//! │  │   │ MenuItem  │  │   Money   │  │ snapshot  │  │ RoleSet   │  │   │
//! │  │   │  Order    │  │ checked + │  │ totals    │  │ Operation │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lemon-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, cart & order transactions    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (MenuItem, CartLine, Order, OrderItem, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Price snapshotting and exact order totals
//! - [`policy`] - Roles, the operation → allowed-roles table, order scoping
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use lemon_core::money::Money;
//!
//! let price = Money::from_cents(1000); // $10.00
//! let line = price.checked_multiply_quantity(2).unwrap();
//! let total = Money::checked_sum([line, Money::from_cents(500)]).unwrap();
//!
//! assert_eq!(total.cents(), 2500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod policy;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use policy::{Caller, Operation, OrderScope, Role, RoleSet};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of menu item titles, category titles and slugs.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum length of a username.
pub const MAX_USERNAME_LENGTH: usize = 150;
