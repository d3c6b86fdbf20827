//! Output writers - render the target tree as source code.

#[cfg(feature = "write-python")]
pub mod python;

#[cfg(feature = "write-python")]
pub use python::PythonWriter;
