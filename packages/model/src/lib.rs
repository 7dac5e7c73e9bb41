//! # cfgtree model
//!
//! Pure, synchronous configuration document model.
//!
//! ```text
//! schema.yaml ──► FieldTypeRegistry ──┐
//!                                     ▼
//! document ◄──── TreeCodec ────► ConfigTree
//!     │
//!     ├──► diff (two versions side by side)
//!     └──► binding (merge fetched model parameters)
//! ```
//!
//! Fields are looked up by [`PathAddress`], which names a schema slot rather
//! than a tree position, so every repeated instance of a group shares the
//! same field types.

pub mod binding;
pub mod codec;
pub mod codecs;
pub mod diff;
mod errors;
pub mod field_type;
pub mod list_text;
pub mod path;
pub mod registry;
pub mod schema;
pub mod tree;

pub use binding::{FetchedModel, ModelParams, DEFAULT_BINDING_PREFIX};
pub use codec::{Document, TreeCodec};
pub use codecs::{FieldCodec, NumericRange, Partition, TimeRanges, TIME_FORMAT};
pub use diff::{copy_one_path, diff, value_at, DiffNode, DiffPair};
pub use errors::{CodecError, ModelError, ModelResult, SchemaError};
pub use field_type::FieldType;
pub use list_text::{list_to_text, text_to_list, text_to_list_shaped, ListShape, ScalarHint};
pub use path::{is_instance_counter_label, PathAddress};
pub use registry::{FieldEntry, FieldTypeRegistry};
pub use schema::{SchemaFile, SchemaNode, SchemaTree};
pub use tree::{ConfigTree, LeafControl, NodeData, NodeId, NodeKind, Subtree, TreeNode};
