pub mod core;
pub use crate::core::shared;

pub mod email;
pub mod invoicing;
pub mod main_module;
pub mod pdf;
pub mod security;
pub mod tenancy;
pub mod web;
