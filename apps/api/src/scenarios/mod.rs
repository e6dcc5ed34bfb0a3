// Practice scenarios: the built-in RA/TA catalog plus user-authored ones.

pub mod catalog;
pub mod custom;
pub mod handlers;
