//! Typed ids for every entity the service touches.

pub use super::id::Id;

/// Marker for users (owners of stories and fairytales).
pub struct User;

/// Marker for user-authored source stories.
pub struct Story;

/// Marker for fairytale generation jobs.
pub struct Fairytale;

/// Marker for generated fairytale pages.
pub struct FairytalePage;

/// Marker for registered push devices.
pub struct Device;

pub type UserId = Id<User>;
pub type StoryId = Id<Story>;
pub type FairytaleId = Id<Fairytale>;
pub type FairytalePageId = Id<FairytalePage>;
pub type DeviceId = Id<Device>;
