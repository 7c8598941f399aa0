//! Data model structs shared by repositories, services and handlers

pub mod family;
pub mod gift_group;
pub mod message;
pub mod profile;
pub mod user;
pub mod wishlist;

pub use family::{Family, FamilyMember, FamilyMemberWithUser, FamilyRole, FamilyWithMembers};
pub use gift_group::{
    GiftGroup, GiftGroupCreate, GiftGroupDetail, GiftGroupMember, GiftGroupMemberWithUser,
    GiftGroupUpdate, GiftGroupWithCounts,
};
pub use message::{Message, MessageWithUser};
pub use profile::{Profile, ProfileUpsert};
pub use user::{User, UserSummary};
pub use wishlist::{
    Priority, WishlistItem, WishlistItemCreate, WishlistItemUpdate, WishlistItemView,
};
