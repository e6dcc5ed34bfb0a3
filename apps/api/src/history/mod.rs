// Persistence of practice conversations and their feedback.
// Storage sits behind the `Repository` trait; nothing here knows about the backend.

pub mod handlers;
pub mod repository;
pub mod store;
