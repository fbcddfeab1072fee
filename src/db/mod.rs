//! Database layer (in-process store).

pub mod store;

pub use store::{NewUser, PhotoCollection, Store};
