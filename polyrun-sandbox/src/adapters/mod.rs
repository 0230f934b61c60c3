//! Language adapters

mod java;
mod javascript;
mod python;

pub use java::JavaAdapter;
pub use javascript::JavaScriptAdapter;
pub use python::PythonAdapter;
