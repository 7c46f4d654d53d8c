//! # sqlgrade-sqlite
//!
//! Runs a single read-only query against a throwaway in-memory SQLite copy
//! of a sample schema.
//!
//! Every call to [`Sandbox::execute`] opens its own store, loads the sample
//! rows, switches the store to `query_only`, runs the query under a
//! deadline and a row ceiling, and closes the store again. Nothing is shared
//! between calls except the read-only [`Schema`](sqlgrade_core::Schema).
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sqlgrade_core::{Schema, SqlQuery};
//! use sqlgrade_sqlite::{Sandbox, SandboxLimits};
//!
//! # async fn demo(schema: Arc<Schema>) -> sqlgrade_sqlite::Result<()> {
//! let sandbox = Sandbox::new(SandboxLimits::default());
//! match sandbox.execute(&SqlQuery::student("SELECT * FROM users"), &schema).await? {
//!     Ok(result) => println!("{result}"),
//!     Err(failure) => println!("{}: {failure}", failure.reason()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
mod loader;
pub mod result;
pub mod value;

pub use error::{Execution, ExecutionFailure, Result, SandboxError};
pub use executor::{Sandbox, SandboxLimits};
pub use result::ResultSet;
pub use value::Value;
