pub mod ethereum;
pub mod persistence;
pub mod web;
