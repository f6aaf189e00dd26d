pub mod bucket;
pub mod character;
pub mod inventory;
pub mod item;
pub mod profile;
pub mod types;
