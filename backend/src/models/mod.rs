//! Data models for the riders club storefront and back-office.
//!
//! Field names serialize in camelCase to match the JSON data files and the frontend.

mod album;
mod catalog;
mod order;
mod ride;
mod site;
mod user;

pub use album::*;
pub use catalog::*;
pub use order::*;
pub use ride::*;
pub use site::*;
pub use user::*;
