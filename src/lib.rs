#![deny(unsafe_op_in_unsafe_fn)]

// not concurrent
pub mod non_concurrent;

// diagnostics
pub mod logging;

// the list is the main API, re-export it at the root
pub use non_concurrent::linked_list::{Node, SinglyLinkedList};
