//! Schema-indexed data model shared by the mount services and the codec

mod node;
mod path;
mod qname;

pub use node::{ContainerNode, DataNode, LeafNode, LeafValue, ListNode};
pub use path::{InstanceIdentifier, SchemaPath};
pub use qname::{QName, QNameModule};
