pub mod attributes;
pub mod domain;
pub mod error;
pub mod protocol;
