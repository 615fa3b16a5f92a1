//! The estimation core: category mapping, the income grid, tensor assembly,
//! and aggregation.

pub mod aggregate;
pub mod aid;
pub mod category;
pub mod filers;
pub mod income;

pub use aggregate::{AggregateResult, aggregate};
pub use aid::{AidTensor, assemble_aid_tensor, compute_aid};
pub use category::bedroom_category;
pub use filers::{FilerTensor, build_filer_tensor};
pub use income::income_grid;
