pub mod db;
pub mod models;
mod pages;
mod records;
mod tables;
mod users;

pub use db::{Database, DatabaseError};
pub use tables::*;
