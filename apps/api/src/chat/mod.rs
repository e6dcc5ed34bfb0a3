// Practice chat: persona replies for the simulated student/resident.
// Model calls go through llm_client; the canned reply is the floor.

pub mod handlers;
pub mod persona;
