//! Domain types shared by the meal-planning core and its front ends.

pub mod domain;
pub mod error;
pub mod request;
