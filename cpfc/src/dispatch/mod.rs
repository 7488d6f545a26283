//! Dispatch resolution for customization point calls.
//!
//! Given the declaration a call enters at and the call's argument types,
//! this module selects the single declaration that is invoked. Unlike flat
//! overload resolution, the override tree is walked greedily from the root:
//! at every level the visible, viable children compete, the unique most
//! specialized one is descended into, and descent stops at the first node
//! with no viable child.
//!
//! # Module Structure
//!
//! - [`associated`] - Associated classes, which gate friend-scoped overrides
//! - [`result`] - Resolution results and dispatch errors
//! - [`resolver`] - The descent algorithm

mod associated;
mod resolver;
mod result;


pub use associated::AssociatedClasses;
pub use resolver::DispatchResolver;
pub use result::{DispatchError, DispatchResult, NoViableReason, Resolution};
