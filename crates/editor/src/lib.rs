// coauthor-editor: client-core state machines for the selection-driven
// AI edit pipeline. Selection tracking, request dispatch, and preview/apply
// are pure state machines; all I/O lives behind the traits they consume.

pub mod backend;
pub mod dispatch;
pub mod preview;
pub mod selection;
pub mod surface;
