//! FreeSurfer command formatters.
//!
//! Covers the `recon-all` import/full-pipeline pair, the Tcl snippets that
//! drive `tkmedit`/`tksurfer` screenshots, and `mri_annotation2label`.

use crate::error::SeamError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Flags always passed to the full `recon-all` run.
pub const RECON_ALL_FLAGS: &[&str] = &[
    "-all",
    "-qcache",
    "-measure thickness",
    "-measure curv",
    "-measure sulc",
    "-measure area",
    "-measure jacobian_white",
];

pub const DEFAULT_ANNOTATION: &str = "aparc.a2009s.annot";

// ---------------------------------------------------------------------------
// Hemisphere
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    Lh,
    Rh,
}

impl Hemisphere {
    /// Both hemispheres in pipeline order.
    pub fn both() -> [Hemisphere; 2] {
        [Hemisphere::Lh, Hemisphere::Rh]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Hemisphere::Lh => "lh",
            Hemisphere::Rh => "rh",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hemisphere {
    type Err = SeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lh" => Ok(Hemisphere::Lh),
            "rh" => Ok(Hemisphere::Rh),
            other => Err(SeamError::invalid(
                "hemisphere",
                format!("'{other}' is not one of lh, rh"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// recon-all
// ---------------------------------------------------------------------------

/// `recon-all -i`: create the subject directory and import raw images.
///
/// One `-i` segment per input, in the order given.
pub fn recon_input(subject_id: &str, inputs: &[String]) -> String {
    let mut parts = vec!["recon-all".to_string(), format!("-s {subject_id}")];
    parts.extend(inputs.iter().map(|image| format!("-i {image}")));
    parts.join(" ")
}

/// `recon-all -all` with the measures the QA stack expects, then `flags`.
pub fn recon_all(subject_id: &str, flags: &[String]) -> String {
    let mut parts = vec!["recon-all".to_string(), format!("-s {subject_id}")];
    parts.extend(RECON_ALL_FLAGS.iter().map(|f| f.to_string()));
    parts.extend(flags.iter().cloned());
    parts.join(" ")
}

// ---------------------------------------------------------------------------
// tkmedit
// ---------------------------------------------------------------------------

/// Slices visited by the tkmedit screenshot loop: `beg <= i < end`, stepping
/// by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceRange {
    pub beg: u32,
    pub end: u32,
    pub step: u32,
}

impl Default for SliceRange {
    fn default() -> Self {
        Self {
            beg: 5,
            end: 256,
            step: 10,
        }
    }
}

/// Tcl that saves `{basepath}/tkmedit-$i.tiff` for every slice in `range`.
pub fn tkmedit_screenshot_tcl(basepath: &Path, range: SliceRange) -> String {
    let tiff_path = basepath.join("tkmedit-$i.tiff");
    format!(
        "for {{ set i {beg} }} {{ $i < {end} }} {{ incr i {step} }} {{\n\
         SetSlice $i\n\
         RedrawScreen\n\
         SaveTIFF {tiff}\n\
         }}\n\
         exit\n",
        beg = range.beg,
        end = range.end,
        step = range.step,
        tiff = tiff_path.display(),
    )
}

/// Run a Tcl script in `tkmedit` against one of the subject's volumes.
pub fn tkmedit_screenshot_cmd(
    subject_id: &str,
    volume: &str,
    tcl_path: &Path,
    flags: &[String],
) -> String {
    let mut parts = vec![
        "tkmedit".to_string(),
        subject_id.to_string(),
        volume.to_string(),
    ];
    parts.extend(flags.iter().cloned());
    parts.push(format!("-tcl {}", tcl_path.display()));
    parts.join(" ")
}

// ---------------------------------------------------------------------------
// tksurfer
// ---------------------------------------------------------------------------

/// Tcl that takes four surface screenshots under the `basepath` prefix:
/// lateral, medial, and the same two views with `annot` loaded.
pub fn tksurfer_screenshot_tcl(basepath: &Path, annot: &str) -> String {
    let base = basepath.display();
    format!(
        "make_lateral_view;\n\
         redraw;\n\
         save_tiff {base}-lateral.tiff;\n\
         rotate_brain_y 180;\n\
         redraw;\n\
         save_tiff {base}-medial.tiff;\n\
         labl_import_annotation {annot};\n\
         redraw;\n\
         make_lateral_view;\n\
         redraw;\n\
         save_tiff {base}-annot-lateral.tiff;\n\
         rotate_brain_y 180;\n\
         redraw;\n\
         save_tiff {base}-annot-medial.tiff;\n\
         exit;"
    )
}

/// Run a Tcl script in `tksurfer` on one hemisphere's `surface`.
pub fn tksurfer_screenshot_cmd(
    subject_id: &str,
    hemi: Hemisphere,
    surface: &str,
    tcl_path: &Path,
    flags: &[String],
) -> String {
    let mut parts = vec![
        "tksurfer".to_string(),
        subject_id.to_string(),
        hemi.to_string(),
        surface.to_string(),
    ];
    parts.extend(flags.iter().cloned());
    parts.push(format!("-tcl {}", tcl_path.display()));
    parts.join(" ")
}

// ---------------------------------------------------------------------------
// mri_annotation2label
// ---------------------------------------------------------------------------

pub fn annot2label_cmd(
    subject_id: &str,
    hemi: Hemisphere,
    annot_path: &Path,
    outdir: &Path,
    surface: &str,
) -> String {
    format!(
        "mri_annotation2label --subject {subject_id} --hemi {hemi} --annotation {} --outdir {} --surface {surface}",
        annot_path.display(),
        outdir.display(),
    )
}
