//! The auxiliary key-value side of the friend subsystem: live-connection
//! tracking, unread-apply counters, the remark cache, and the hand-off
//! boundary to the real-time transport. Everything here is rebuildable
//! state — advisory input to notification decisions, never a participant
//! in relational transactions.

pub mod counters;
pub mod notify;
pub mod registry;
pub mod remarks;

pub use counters::UnreadApplyCounter;
pub use notify::{ChannelNotifier, Notifier, NullNotifier};
pub use registry::PresenceRegistry;
pub use remarks::FriendRemarkCache;
