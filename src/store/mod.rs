mod event_handler;
mod lister;
mod manifest;
mod memory_store;

#[cfg(test)]
mod memory_store_test;

#[doc(hidden)]
pub use event_handler::*;
#[doc(hidden)]
pub use lister::*;
#[doc(hidden)]
pub use manifest::*;
#[doc(hidden)]
pub use memory_store::*;
