pub mod activity;
pub mod profile;
pub mod user;

pub use profile::{NewProfile, Profile, ProfileUpdate};
pub use user::{NewUser, User, UserRow, UserUpdate};
