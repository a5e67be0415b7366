//! Mock tools
//!
//! Recording stand-ins for imagemin, sass and webpack so orchestration can
//! be tested without Node.js. All three mocks share one call log, which
//! keeps the cross-tool ordering observable.
//!
//! # Usage
//!
//! ```
//! use asset_builder::mock::{MockTools, Tool};
//!
//! let mock = MockTools::new();
//! mock.inject_error(Tool::Sass, "undefined variable");
//! let toolset = mock.toolset();
//! # drop(toolset);
//! ```

mod failure;
mod tools;

pub use failure::{FailureConfig, FailureInjector, Tool};
pub use tools::{CallLog, MockBundler, MockImageOptimizer, MockStyleCompiler, MockTools, ToolCall};
