use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Args;
use seam_core::{config::RecipeConfig, paths, recipe::ReconRecipe};
use std::path::PathBuf;

#[derive(Args)]
pub struct BuildReconArgs {
    /// Subject identifier
    pub subject_id: String,

    /// Directory to write scripts & screenshots
    pub script_dir: PathBuf,

    /// Input image (repeat for multiple images, imported in order)
    #[arg(short = 'i', long = "input", required = true, value_name = "IMAGE")]
    pub inputs: Vec<String>,

    /// Use xvfb-run for graphical programs (tkmedit, tksurfer)
    #[arg(long)]
    pub use_xvfb: bool,

    /// FreeSurfer subjects directory (falls back to SCRIPT_DIR with a warning)
    #[arg(long, env = "SUBJECTS_DIR", value_name = "DIR")]
    pub subjects_dir: Option<PathBuf>,

    /// Recipe config file (YAML); defaults apply to anything not set
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extra flags passed through to `recon-all -all` (after `--`)
    #[arg(last = true, value_name = "RECON_FLAGS")]
    pub recon_flags: Vec<String>,
}

pub fn run(args: BuildReconArgs, json: bool) -> anyhow::Result<()> {
    paths::validate_subject_id(&args.subject_id)?;

    let config = match &args.config {
        Some(path) => super::config::load_checked(path)?,
        None => RecipeConfig::default(),
    };

    let recipe = ReconRecipe::new(&args.subject_id, args.inputs, &args.script_dir)
        .subjects_dir(args.subjects_dir)
        .headless(args.use_xvfb)
        .recon_flags(args.recon_flags)
        .config(config);

    let artifacts = recipe.build().with_context(|| {
        format!(
            "failed to write recon recipe for '{}' in {}",
            args.subject_id,
            args.script_dir.display()
        )
    })?;

    if json {
        print_json(&serde_json::json!({
            "subject_id": args.subject_id,
            "main_script": artifacts.main_script,
            "tkmedit_tcl": artifacts.tkmedit_tcl,
            "tksurfer_tcl": artifacts.tksurfer_tcl,
        }))?;
    } else {
        let labels = ["main script", "tkmedit tcl", "tksurfer lh tcl", "tksurfer rh tcl"];
        let rows = labels
            .iter()
            .zip(artifacts.paths())
            .map(|(label, path)| vec![label.to_string(), path.display().to_string()])
            .collect();
        print_table(&["ARTIFACT", "PATH"], rows);
        println!();
        println!(
            "Main executable script written to {}",
            artifacts.main_script.display()
        );
    }
    Ok(())
}
