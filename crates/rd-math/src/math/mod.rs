//! Core math modules.

pub mod canonical;
pub mod distance;
pub mod linalg;
pub mod shaping;
pub mod stats;
pub mod tensor;
