pub mod config;
pub mod dti_qa;
pub mod error;
pub mod freesurfer;
pub mod fsl;
pub mod io;
pub mod paths;
pub mod recipe;
pub mod util;

pub use error::{Result, SeamError};

/// Version stamped into every generated script header.
pub const SEAM_VERSION: &str = env!("CARGO_PKG_VERSION");
