//! Lightweight synchronous SQL access layer.
//!
//! Sits directly above a native driver (consumed through the narrow traits in
//! [`driver`]) and centralizes connection lifecycle with lazy timeout-based
//! reconnects, typed named-parameter binding with a MySQL-normalizing
//! dialect, batched multi-row writes via `:VALUES` rewriting, and result
//! shaping (scalar / one / all / indexed / grouped / column). Callers issue
//! plain SQL strings with `:name` placeholders; everything else is a
//! pass-through to the driver.

pub mod batch;
pub mod binder;
pub mod client;
pub mod driver;
pub mod dsn;
pub mod error;
pub mod prelude;
pub mod results;
pub mod shape;
pub mod types;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use indexmap::IndexMap;

pub use batch::VALUES_MARKER;
pub use client::{DbClient, OnConnect, Statement};
pub use dsn::{ConnectOptions, parse_dsn};
pub use error::SqlAccessError;
pub use results::{ResultSet, Row};
pub use shape::{JsonFlag, ShapeFlags};
pub use types::{BatchRow, BatchValue, BindDialect, ParamType, Params, Value};
