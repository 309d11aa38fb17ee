//! Generic graph item model
//!
//! Adapters turn Azure resources into [`Item`]s. Each item carries a flat
//! attribute bag and a list of [`LinkedItemQuery`]s that point at the
//! resources it depends on or affects, annotated with [`BlastPropagation`].

mod error;
mod item;
mod item_type;

pub use error::QueryError;
pub use item::{
    BlastPropagation, Health, Item, LinkedItemQuery, Query, QueryMethod, GLOBAL_SCOPE,
};
pub use item_type::{ItemType, UnknownItemType};
