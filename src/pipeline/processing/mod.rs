// Per-candidate processing: normalization, filtering, enrichment, and assembly

pub mod assemble;
pub mod classify;
pub mod enrich;
pub mod filter;
pub mod normalize;
pub mod policy;
pub mod price;
pub mod reference;
