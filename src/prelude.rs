//! Convenient imports for common functionality.

pub use crate::IndexMap;
pub use crate::batch::VALUES_MARKER;
pub use crate::client::{DbClient, OnConnect, Statement};
pub use crate::driver::{Driver, DriverConnection, DriverStatement};
pub use crate::dsn::ConnectOptions;
pub use crate::error::SqlAccessError;
pub use crate::results::{ResultSet, Row};
pub use crate::shape::{JsonFlag, ShapeFlags};
pub use crate::types::{BatchRow, BatchValue, BindDialect, ParamType, Params, Value};
pub use crate::{batch_row, params};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteDriver;
