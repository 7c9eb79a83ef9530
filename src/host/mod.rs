//! Model of the hosted page the gate coordinates: objects whose properties
//! appear asynchronously, the editor instance, and the native host bridge.

mod bridge;
mod editor;
mod local;
mod realm;
mod subscriptions;
mod value;

pub use bridge::*;
pub use editor::*;
pub use local::*;
pub use realm::*;
pub use subscriptions::*;
pub use value::*;
