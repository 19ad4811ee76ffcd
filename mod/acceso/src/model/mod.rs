mod user;
mod group;
mod membership;
mod role;
mod permission;

pub use user::*;
pub use group::*;
pub use membership::*;
pub use role::*;
pub use permission::*;
