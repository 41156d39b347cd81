use crate::output::print_command;
use clap::Subcommand;
use seam_core::freesurfer::{self, Hemisphere, SliceRange};
use seam_core::paths;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum FreesurferSubcommand {
    /// `recon-all -i`: import raw images for a subject
    ReconInput {
        subject_id: String,
        /// Input image (repeat for multiple images)
        #[arg(short = 'i', long = "input", required = true, value_name = "IMAGE")]
        inputs: Vec<String>,
    },

    /// `recon-all -all` with the standard measures
    ReconAll {
        subject_id: String,
        /// Extra flags appended to the command (after `--`)
        #[arg(last = true, value_name = "FLAGS")]
        flags: Vec<String>,
    },

    /// Tcl driving tkmedit slice screenshots
    TkmeditTcl {
        /// Directory the screenshots are saved in
        basepath: PathBuf,
        #[arg(long, default_value_t = SliceRange::default().beg)]
        beg: u32,
        #[arg(long, default_value_t = SliceRange::default().end)]
        end: u32,
        #[arg(long, default_value_t = SliceRange::default().step)]
        step: u32,
    },

    /// Run a Tcl script in tkmedit
    TkmeditCmd {
        subject_id: String,
        volume: String,
        tcl_path: PathBuf,
        /// Flag passed to tkmedit (repeatable)
        #[arg(long = "flag", allow_hyphen_values = true, value_name = "FLAG")]
        flags: Vec<String>,
    },

    /// Tcl taking lateral/medial tksurfer screenshots, with and without an annotation
    TksurferTcl {
        /// Prefix for the saved images
        basepath: PathBuf,
        #[arg(long, default_value = freesurfer::DEFAULT_ANNOTATION)]
        annot: String,
    },

    /// Run a Tcl script in tksurfer
    TksurferCmd {
        subject_id: String,
        /// lh or rh
        hemi: Hemisphere,
        surface: String,
        tcl_path: PathBuf,
        /// Flag passed to tksurfer (repeatable)
        #[arg(long = "flag", allow_hyphen_values = true, value_name = "FLAG")]
        flags: Vec<String>,
    },

    /// `mri_annotation2label`: split an annotation into label files
    Annot2label {
        subject_id: String,
        /// lh or rh
        hemi: Hemisphere,
        annot_path: PathBuf,
        outdir: PathBuf,
        #[arg(long, default_value = "white")]
        surface: String,
    },
}

pub fn run(subcmd: FreesurferSubcommand, json: bool) -> anyhow::Result<()> {
    let output = match subcmd {
        FreesurferSubcommand::ReconInput { subject_id, inputs } => {
            paths::validate_subject_id(&subject_id)?;
            freesurfer::recon_input(&subject_id, &inputs)
        }
        FreesurferSubcommand::ReconAll { subject_id, flags } => {
            paths::validate_subject_id(&subject_id)?;
            freesurfer::recon_all(&subject_id, &flags)
        }
        FreesurferSubcommand::TkmeditTcl {
            basepath,
            beg,
            end,
            step,
        } => {
            if step == 0 {
                anyhow::bail!("--step must be greater than 0");
            }
            freesurfer::tkmedit_screenshot_tcl(&basepath, SliceRange { beg, end, step })
        }
        FreesurferSubcommand::TkmeditCmd {
            subject_id,
            volume,
            tcl_path,
            flags,
        } => {
            paths::validate_subject_id(&subject_id)?;
            freesurfer::tkmedit_screenshot_cmd(&subject_id, &volume, &tcl_path, &flags)
        }
        FreesurferSubcommand::TksurferTcl { basepath, annot } => {
            freesurfer::tksurfer_screenshot_tcl(&basepath, &annot)
        }
        FreesurferSubcommand::TksurferCmd {
            subject_id,
            hemi,
            surface,
            tcl_path,
            flags,
        } => {
            paths::validate_subject_id(&subject_id)?;
            freesurfer::tksurfer_screenshot_cmd(&subject_id, hemi, &surface, &tcl_path, &flags)
        }
        FreesurferSubcommand::Annot2label {
            subject_id,
            hemi,
            annot_path,
            outdir,
            surface,
        } => {
            paths::validate_subject_id(&subject_id)?;
            freesurfer::annot2label_cmd(&subject_id, hemi, &annot_path, &outdir, &surface)
        }
    };
    print_command(output.trim_end_matches('\n'), json)
}
