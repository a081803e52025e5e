//! Domain entities - Core business objects with identity

mod character;
mod event;
mod group;
mod location;

pub use character::Character;
pub use event::Event;
pub use group::Group;
pub use location::Location;
