use crate::output::print_command;
use clap::Subcommand;
use seam_core::fsl::{
    invwarp, Applywarp, Bet, ConvertXfm, Flirt, Fnirt, Interp, MeshSpace, Probtrackx2,
    SuperLevel, XfmOperation,
};

#[derive(Subcommand)]
pub enum FslSubcommand {
    /// Linear registration; needs at least one of --omat / --out
    Flirt {
        /// Input image (moved to the reference)
        input: String,
        /// Reference image (stationary)
        reference: String,
        #[arg(long)]
        omat: Option<String>,
        #[arg(long)]
        out: Option<String>,
        #[arg(long, default_value = "spline")]
        inter: String,
        /// Extra flag (repeatable), e.g. --flag "-dof 12"
        #[arg(long = "flag", allow_hyphen_values = true, value_name = "FLAG")]
        flags: Vec<String>,
    },

    /// Nonlinear registration; needs at least one of --cout / --iout
    Fnirt {
        input: String,
        reference: String,
        #[arg(long)]
        cout: Option<String>,
        #[arg(long)]
        iout: Option<String>,
        /// Affine matrix from flirt
        #[arg(long)]
        aff: Option<String>,
        #[arg(long = "flag", allow_hyphen_values = true, value_name = "FLAG")]
        flags: Vec<String>,
    },

    /// Invert a warp field
    Invwarp {
        warp: String,
        /// Image originally given to fnirt
        reference: String,
        out: String,
        #[arg(long = "flag", allow_hyphen_values = true, value_name = "FLAG")]
        flags: Vec<String>,
    },

    /// Apply a warp field
    Applywarp {
        input: String,
        reference: String,
        out: String,
        warp: String,
        /// nn, trilinear, sinc or spline
        #[arg(long, default_value = "spline")]
        interp: Interp,
        /// Supersampling level: 'a' for auto or an integer
        #[arg(long, default_value = "a")]
        superlevel: SuperLevel,
        /// Disable intermediate supersampling
        #[arg(long)]
        no_super: bool,
        #[arg(long = "flag", allow_hyphen_values = true, value_name = "FLAG")]
        flags: Vec<String>,
    },

    /// Invert or concatenate affine matrices; exactly one of --inverse / --concat
    ConvertXfm {
        omat: String,
        #[arg(long)]
        inverse: Option<String>,
        /// BtoC AtoB
        #[arg(long, num_args = 2, value_names = ["B_TO_C", "A_TO_B"])]
        concat: Option<Vec<String>>,
        #[arg(long)]
        fixscaleskew: Option<String>,
    },

    /// Brain extraction
    Bet {
        input: String,
        output: String,
        /// Fractional intensity threshold
        #[arg(long, default_value_t = 0.5)]
        frac: f64,
        /// Generate a binary brain mask
        #[arg(long)]
        mask: bool,
        #[arg(long = "flag", allow_hyphen_values = true, value_name = "FLAG")]
        flags: Vec<String>,
    },

    /// Probabilistic tractography
    Probtrackx2 {
        /// Basename for samples files, e.g. bedpostx/merged
        samples: String,
        /// Binary mask in diffusion space
        mask: String,
        /// Seed volume, surface, or text file of seeds
        seed: String,
        #[arg(long, default_value = "fdt_paths")]
        out: String,
        #[arg(long = "dir", default_value = "logdir")]
        directory: String,
        #[arg(long, default_value_t = 5000)]
        nsamples: u32,
        #[arg(long, default_value_t = 2000)]
        nsteps: u32,
        #[arg(long, default_value_t = 0.5)]
        steplength: f64,
        #[arg(long, default_value_t = 0.0)]
        distthresh: f64,
        #[arg(long, default_value_t = 0.2)]
        cthr: f64,
        #[arg(long, default_value_t = 0.01)]
        fibthresh: f64,
        #[arg(long, default_value_t = 0)]
        randfib: u8,
        #[arg(long, default_value_t = 0)]
        sampvox: u32,
        #[arg(long, default_value_t = 0)]
        verbose: u8,
        #[arg(long)]
        xfm: Option<String>,
        #[arg(long)]
        invxfm: Option<String>,
        #[arg(long)]
        seedref: Option<String>,
        /// caret, freesurfer, first or voxel
        #[arg(long, default_value = "caret")]
        meshspace: MeshSpace,
        /// Do not output path distributions
        #[arg(long)]
        no_opd: bool,
        #[arg(long)]
        pd: bool,
        #[arg(long)]
        usef: bool,
        #[arg(long)]
        loopcheck: bool,
        #[arg(long)]
        modeuler: bool,
        /// Do not output seeds to targets
        #[arg(long)]
        no_os2t: bool,
        /// Do not write seed-to-target counts as text
        #[arg(long)]
        no_s2tastext: bool,
        #[arg(long = "flag", allow_hyphen_values = true, value_name = "FLAG")]
        flags: Vec<String>,
    },
}

pub fn run(subcmd: FslSubcommand, json: bool) -> anyhow::Result<()> {
    let command = match subcmd {
        FslSubcommand::Flirt {
            input,
            reference,
            omat,
            out,
            inter,
            flags,
        } => {
            let mut flirt = Flirt::new(input, reference).inter(inter).flags(flags);
            flirt.omat = omat;
            flirt.out = out;
            flirt.command()?
        }
        FslSubcommand::Fnirt {
            input,
            reference,
            cout,
            iout,
            aff,
            flags,
        } => {
            let mut fnirt = Fnirt::new(input, reference).flags(flags);
            fnirt.cout = cout;
            fnirt.iout = iout;
            fnirt.aff = aff;
            fnirt.command()?
        }
        FslSubcommand::Invwarp {
            warp,
            reference,
            out,
            flags,
        } => invwarp(&warp, &reference, &out, &flags),
        FslSubcommand::Applywarp {
            input,
            reference,
            out,
            warp,
            interp,
            superlevel,
            no_super,
            flags,
        } => Applywarp::new(input, reference, out, warp)
            .interp(interp)
            .supersample((!no_super).then_some(superlevel))
            .flags(flags)
            .command(),
        FslSubcommand::ConvertXfm {
            omat,
            inverse,
            concat,
            fixscaleskew,
        } => {
            let concat = concat.map(|pair| (pair[0].clone(), pair[1].clone()));
            let mut xfm = ConvertXfm::new(omat, XfmOperation::from_parts(inverse, concat)?);
            xfm.fixscaleskew = fixscaleskew;
            xfm.command()
        }
        FslSubcommand::Bet {
            input,
            output,
            frac,
            mask,
            flags,
        } => Bet::new(input, output)
            .frac(frac)
            .mask(mask)
            .flags(flags)
            .command(),
        FslSubcommand::Probtrackx2 {
            samples,
            mask,
            seed,
            out,
            directory,
            nsamples,
            nsteps,
            steplength,
            distthresh,
            cthr,
            fibthresh,
            randfib,
            sampvox,
            verbose,
            xfm,
            invxfm,
            seedref,
            meshspace,
            no_opd,
            pd,
            usef,
            loopcheck,
            modeuler,
            no_os2t,
            no_s2tastext,
            flags,
        } => Probtrackx2 {
            out,
            directory,
            nsamples,
            nsteps,
            steplength,
            distthresh,
            cthr,
            fibthresh,
            randfib,
            sampvox,
            verbose,
            xfm,
            invxfm,
            seedref,
            meshspace,
            opd: !no_opd,
            pd,
            usef,
            loopcheck,
            modeuler,
            os2t: !no_os2t,
            s2tastext: !no_s2tastext,
            flags,
            ..Probtrackx2::new(samples, mask, seed)
        }
        .command(),
    };
    print_command(&command, json)
}
