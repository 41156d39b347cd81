pub mod build_recon;
pub mod config;
pub mod dtiqa;
pub mod freesurfer;
pub mod fsl;
pub mod xvfb;
