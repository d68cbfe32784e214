//! Mesh-set file loading and smooth-path generation.
//!
//! This crate augments the [`tilenav`] query engine with two capabilities:
//!
//! - the `MSET` mesh-set binary format, bundling mesh parameters with a
//!   stream of engine tile blobs ([`load_mesh_file`] / [`save_mesh_set`])
//! - a path smoothing pipeline that turns a coarse polygon corridor into a
//!   walkable sequence of world-space points ([`find_smooth_path`])
//!
//! Both are exposed through [`MeshSession`], a facade owning one navigation
//! mesh and offering coarse paths, smooth paths, random point sampling,
//! line-of-sight checks, and polygon-flag lookup.

mod corridor;
mod error;
mod loader;
mod session;
mod smooth;
mod steering;

mod corridor_tests;
mod session_tests;
mod steering_tests;

pub use corridor::{PathCorridor, MAX_CORRIDOR};
pub use error::{Error, Result};
pub use loader::{load_mesh_file, save_mesh_set, MSET_MAGIC, MSET_VERSION};
pub use session::{LosStatus, MeshSession};
pub use smooth::{find_smooth_path, MAX_SMOOTH};
pub use steering::{steer_target, SteerTarget};
