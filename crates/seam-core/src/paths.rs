//! Canonical artifact names for the recon recipe.
//!
//! Every function here is pure string/path joining. Nothing checks that a
//! directory exists; callers create directories before writing into them.

use crate::error::{Result, SeamError};
use crate::freesurfer::Hemisphere;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Name constants
// ---------------------------------------------------------------------------

pub const RECON_SCRIPT_SUFFIX: &str = "recon.sh";
pub const TKMEDIT_TCL_SUFFIX: &str = "tkmedit.tcl";
pub const SCREENSHOTS_SUFFIX: &str = "_screenshots";
pub const LABEL_DIR: &str = "label";
pub const A2009S_ANNOT: &str = "aparc.a2009s.annot";

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

pub fn recon_script_name(subject_id: &str) -> String {
    format!("{subject_id}.{RECON_SCRIPT_SUFFIX}")
}

pub fn tkmedit_tcl_name(subject_id: &str) -> String {
    format!("{subject_id}.{TKMEDIT_TCL_SUFFIX}")
}

pub fn tksurfer_tcl_name(subject_id: &str, hemi: Hemisphere) -> String {
    format!("{subject_id}.tksurfer.{hemi}.tcl")
}

pub fn screenshots_dir(subject_id: &str) -> String {
    format!("{subject_id}{SCREENSHOTS_SUFFIX}")
}

// ---------------------------------------------------------------------------
// Paths under the script directory
// ---------------------------------------------------------------------------

pub fn recon_script_path(script_dir: &Path, subject_id: &str) -> PathBuf {
    script_dir.join(recon_script_name(subject_id))
}

pub fn tkmedit_tcl_path(script_dir: &Path, subject_id: &str) -> PathBuf {
    script_dir.join(tkmedit_tcl_name(subject_id))
}

pub fn tksurfer_tcl_path(script_dir: &Path, subject_id: &str, hemi: Hemisphere) -> PathBuf {
    script_dir.join(tksurfer_tcl_name(subject_id, hemi))
}

pub fn screenshots_path(script_dir: &Path, subject_id: &str) -> PathBuf {
    script_dir.join(screenshots_dir(subject_id))
}

/// Prefix for tksurfer images; the Tcl appends `-lateral.tiff` and friends.
pub fn tksurfer_screenshot_basepath(
    script_dir: &Path,
    subject_id: &str,
    hemi: Hemisphere,
) -> PathBuf {
    screenshots_path(script_dir, subject_id).join(hemi.as_str())
}

// ---------------------------------------------------------------------------
// Paths under the subjects directory
// ---------------------------------------------------------------------------

pub fn label_dir(subjects_dir: &Path, subject_id: &str) -> PathBuf {
    subjects_dir.join(subject_id).join(LABEL_DIR)
}

/// The Destrieux (a2009s) annotation for one hemisphere.
pub fn annotation_file(subjects_dir: &Path, subject_id: &str, hemi: Hemisphere) -> PathBuf {
    label_dir(subjects_dir, subject_id).join(format!("{hemi}.{A2009S_ANNOT}"))
}

// ---------------------------------------------------------------------------
// Subject id validation
// ---------------------------------------------------------------------------

static SUBJECT_ID_RE: OnceLock<Regex> = OnceLock::new();

fn subject_id_re() -> &'static Regex {
    SUBJECT_ID_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._\-]*$").unwrap())
}

/// Reject ids that would produce surprising paths (empty, separators,
/// leading dot or dash). Formatters and the recipe builder never call this.
pub fn validate_subject_id(subject_id: &str) -> Result<()> {
    if subject_id.is_empty() || subject_id.len() > 128 || !subject_id_re().is_match(subject_id) {
        return Err(SeamError::InvalidSubjectId(subject_id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
