//! Custom Resource Definitions (CRDs) for barbican-operator.
//!
//! - `Barbican`: Deploy the Barbican key manager API, worker and keystone listener
//! - `BarbicanSpecCore`: Reduced spec embedded by the control plane aggregator

mod barbican;
mod defaults;

pub use barbican::*;
