pub mod direction;
pub mod followup;
pub mod history;
pub mod identity;
pub mod location;
pub mod session;
pub mod visit;
