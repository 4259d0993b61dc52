//! Conversions between the flat staging index and the tree-object graph

pub mod builder;
