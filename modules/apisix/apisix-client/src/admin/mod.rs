//! Clusters backed by the APISIX admin API.
//!
//! Each cluster owns one HTTP client; its four resource handlers share it
//! and address `{base_url}/{collection}[/{id}]`. Both the v2 (etcd `node`)
//! and v3 (`key`/`value`, `list`) response envelopes are understood.

mod cluster;
mod envelope;
mod resource;

pub use cluster::{AdminCluster, AdminClusterFactory};
