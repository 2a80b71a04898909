//! Consensus rules of a hybrid proof of work / proof of stake chain: difficulty retargeting, block
//! proof validation and chain work accounting. Chain state is owned by the caller and accessed
//! through [`ChainAncestry`](rapids_consensus_core::ancestry::ChainAncestry).

pub mod consensus;
pub mod errors;
pub mod model;
pub mod processes;
pub mod test_helpers;
