pub mod dom;
pub mod error;
pub mod event;
pub mod patch;
pub mod vnode;

pub use dom::{Dom, ListenerId, NodeId};
pub use error::{DomError, Result};
pub use event::{DomEvent, Listener};
pub use patch::{mount, patch, unmount, MountedNode};
pub use vnode::{Content, Hook, Hooks, VNode};
