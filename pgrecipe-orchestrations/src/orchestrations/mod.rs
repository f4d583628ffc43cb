//! Put and Delete orchestrations

pub mod delete_database;
pub mod put_database;
