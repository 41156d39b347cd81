use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use seam_core::{dti_qa, io};
use std::path::PathBuf;

#[derive(Args)]
pub struct DtiqaArgs {
    /// DTI image(s); more than one selects the multi-image pipeline
    #[arg(required = true, value_name = "IMAGE")]
    pub images: Vec<String>,

    /// Output directory for DTI_QA results
    #[arg(long, value_name = "DIR")]
    pub basedir: PathBuf,

    /// Path to the DTI_QA installation
    #[arg(long, value_name = "DIR")]
    pub dtiqa_path: PathBuf,

    /// Number of b0 volumes at the start of each image
    #[arg(long, default_value_t = 1)]
    pub n_b0: u32,

    /// Write the m-code to FILE instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: DtiqaArgs, json: bool) -> anyhow::Result<()> {
    let mcode = dti_qa::dtiqa_mcode(&args.images, &args.basedir, &args.dtiqa_path, args.n_b0)?;

    match &args.output {
        Some(path) => {
            io::write_file(path, mcode.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            if json {
                print_json(&serde_json::json!({ "path": path }))?;
            } else {
                println!("DTI_QA m-code written to {}", path.display());
            }
        }
        None if json => print_json(&serde_json::json!({ "mcode": mcode }))?,
        None => print!("{mcode}"),
    }
    Ok(())
}
