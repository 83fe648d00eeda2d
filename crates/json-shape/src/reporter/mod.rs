//! Reporters: presentation-only views over a decode result. They never
//! mutate or reinterpret the decoded or failed value.

pub mod fatal;
pub mod path;
