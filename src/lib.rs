pub mod bbox;
pub mod config;
pub mod error;
pub mod headers;
pub mod page;
pub mod record;
pub mod resize;
pub mod rows;
pub mod skew;
pub mod table;

#[cfg(test)]
mod testutil;
