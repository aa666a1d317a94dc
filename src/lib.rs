//! Christmas countdown for Raspberry Pi LED matrices.
//!
//! A tree on the left half of the panel and the days left until Christmas
//! stacked on the right, in the largest font that fits.

pub mod config;
pub mod countdown;
pub mod display;
pub mod layout;
pub mod models;
pub mod utils;
pub mod web;
