//! FSL command formatters.
//!
//! Each tool gets an options struct with the required inputs in `new` and
//! chainable setters for the rest. `command()` assembles the final string and
//! is where mutually exclusive or required outputs are checked.

use crate::error::{Result, SeamError};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// flirt
// ---------------------------------------------------------------------------

/// Linear registration (`flirt`). At least one of `omat` or `out` is required.
#[derive(Debug, Clone, PartialEq)]
pub struct Flirt {
    pub input: String,
    pub reference: String,
    pub omat: Option<String>,
    pub out: Option<String>,
    pub inter: String,
    pub flags: Vec<String>,
}

impl Flirt {
    pub fn new(input: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reference: reference.into(),
            omat: None,
            out: None,
            inter: "spline".to_string(),
            flags: Vec::new(),
        }
    }

    pub fn omat(mut self, omat: impl Into<String>) -> Self {
        self.omat = Some(omat.into());
        self
    }

    pub fn out(mut self, out: impl Into<String>) -> Self {
        self.out = Some(out.into());
        self
    }

    pub fn inter(mut self, inter: impl Into<String>) -> Self {
        self.inter = inter.into();
        self
    }

    pub fn flags(mut self, flags: Vec<String>) -> Self {
        self.flags = flags;
        self
    }

    pub fn command(&self) -> Result<String> {
        if self.omat.is_none() && self.out.is_none() {
            return Err(SeamError::invalid(
                "flirt",
                "requires at least one output (omat or out)",
            ));
        }
        let mut parts = vec![
            "flirt".to_string(),
            format!("-in {}", self.input),
            format!("-ref {}", self.reference),
        ];
        if let Some(omat) = &self.omat {
            parts.push(format!("-omat {omat}"));
        }
        if let Some(out) = &self.out {
            parts.push(format!("-out {out}"));
        }
        parts.push(format!("-inter {}", self.inter));
        parts.extend(self.flags.iter().cloned());
        Ok(parts.join(" "))
    }
}

// ---------------------------------------------------------------------------
// fnirt
// ---------------------------------------------------------------------------

/// Nonlinear registration (`fnirt`). At least one of `cout` or `iout` is
/// required.
#[derive(Debug, Clone, PartialEq)]
pub struct Fnirt {
    pub input: String,
    pub reference: String,
    pub cout: Option<String>,
    pub iout: Option<String>,
    pub aff: Option<String>,
    pub flags: Vec<String>,
}

impl Fnirt {
    pub fn new(input: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reference: reference.into(),
            cout: None,
            iout: None,
            aff: None,
            flags: Vec::new(),
        }
    }

    pub fn cout(mut self, cout: impl Into<String>) -> Self {
        self.cout = Some(cout.into());
        self
    }

    pub fn iout(mut self, iout: impl Into<String>) -> Self {
        self.iout = Some(iout.into());
        self
    }

    /// Affine matrix from a previous `flirt` run.
    pub fn aff(mut self, aff: impl Into<String>) -> Self {
        self.aff = Some(aff.into());
        self
    }

    pub fn flags(mut self, flags: Vec<String>) -> Self {
        self.flags = flags;
        self
    }

    pub fn command(&self) -> Result<String> {
        if self.cout.is_none() && self.iout.is_none() {
            return Err(SeamError::invalid(
                "fnirt",
                "requires at least one output (cout or iout)",
            ));
        }
        let mut parts = vec![
            "fnirt".to_string(),
            format!("--in={}", self.input),
            format!("--ref={}", self.reference),
        ];
        if let Some(cout) = &self.cout {
            parts.push(format!("--cout={cout}"));
        }
        if let Some(iout) = &self.iout {
            parts.push(format!("--iout={iout}"));
        }
        if let Some(aff) = &self.aff {
            parts.push(format!("--aff={aff}"));
        }
        parts.extend(self.flags.iter().cloned());
        Ok(parts.join(" "))
    }
}

// ---------------------------------------------------------------------------
// invwarp
// ---------------------------------------------------------------------------

/// Invert a warp field. `reference` is the image originally given to fnirt.
pub fn invwarp(warp: &str, reference: &str, out: &str, flags: &[String]) -> String {
    let mut parts = vec![
        "invwarp".to_string(),
        format!("-w {warp}"),
        format!("-r {reference}"),
        format!("-o {out}"),
    ];
    parts.extend(flags.iter().cloned());
    parts.join(" ")
}

// ---------------------------------------------------------------------------
// applywarp
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interp {
    Nn,
    Trilinear,
    Sinc,
    Spline,
}

impl Interp {
    pub fn as_str(self) -> &'static str {
        match self {
            Interp::Nn => "nn",
            Interp::Trilinear => "trilinear",
            Interp::Sinc => "sinc",
            Interp::Spline => "spline",
        }
    }
}

impl fmt::Display for Interp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interp {
    type Err = SeamError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nn" => Ok(Interp::Nn),
            "trilinear" => Ok(Interp::Trilinear),
            "sinc" => Ok(Interp::Sinc),
            "spline" => Ok(Interp::Spline),
            other => Err(SeamError::invalid(
                "applywarp",
                format!("interp '{other}' must be one of nn, trilinear, sinc, spline"),
            )),
        }
    }
}

/// Intermediate supersampling level for `applywarp -s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperLevel {
    Auto,
    Level(u32),
}

impl fmt::Display for SuperLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuperLevel::Auto => f.write_str("a"),
            SuperLevel::Level(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for SuperLevel {
    type Err = SeamError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "a" {
            return Ok(SuperLevel::Auto);
        }
        s.parse::<u32>().map(SuperLevel::Level).map_err(|_| {
            SeamError::invalid(
                "applywarp",
                format!("superlevel '{s}' must be 'a' or an integer"),
            )
        })
    }
}

/// Apply a warp field (`applywarp`). Supersampling is on (`Auto`) by default;
/// `supersample(None)` turns it off.
#[derive(Debug, Clone, PartialEq)]
pub struct Applywarp {
    pub input: String,
    pub reference: String,
    pub out: String,
    pub warp: String,
    pub interp: Interp,
    pub superlevel: Option<SuperLevel>,
    pub flags: Vec<String>,
}

impl Applywarp {
    pub fn new(
        input: impl Into<String>,
        reference: impl Into<String>,
        out: impl Into<String>,
        warp: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            reference: reference.into(),
            out: out.into(),
            warp: warp.into(),
            interp: Interp::Spline,
            superlevel: Some(SuperLevel::Auto),
            flags: Vec::new(),
        }
    }

    pub fn interp(mut self, interp: Interp) -> Self {
        self.interp = interp;
        self
    }

    pub fn supersample(mut self, level: Option<SuperLevel>) -> Self {
        self.superlevel = level;
        self
    }

    pub fn flags(mut self, flags: Vec<String>) -> Self {
        self.flags = flags;
        self
    }

    pub fn command(&self) -> String {
        let mut parts = vec![
            "applywarp".to_string(),
            format!("-i {}", self.input),
            format!("-o {}", self.out),
            format!("-r {}", self.reference),
            format!("-w {}", self.warp),
            format!("--interp={}", self.interp),
        ];
        if let Some(level) = self.superlevel {
            parts.push("-s".to_string());
            parts.push(format!("--superlevel={level}"));
        }
        parts.extend(self.flags.iter().cloned());
        parts.join(" ")
    }
}

// ---------------------------------------------------------------------------
// convert_xfm
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XfmOperation {
    /// Invert the given matrix.
    Inverse(String),
    /// Concatenate `(b_to_c, a_to_b)` into `a_to_c`.
    Concat(String, String),
}

impl XfmOperation {
    /// Build from the optional-argument form, rejecting both or neither.
    pub fn from_parts(inverse: Option<String>, concat: Option<(String, String)>) -> Result<Self> {
        match (inverse, concat) {
            (Some(inv), None) => Ok(XfmOperation::Inverse(inv)),
            (None, Some((b_to_c, a_to_b))) => Ok(XfmOperation::Concat(b_to_c, a_to_b)),
            _ => Err(SeamError::invalid(
                "convert_xfm",
                "must pass either inverse or concat but not both",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertXfm {
    pub omat: String,
    pub operation: XfmOperation,
    pub fixscaleskew: Option<String>,
}

impl ConvertXfm {
    pub fn new(omat: impl Into<String>, operation: XfmOperation) -> Self {
        Self {
            omat: omat.into(),
            operation,
            fixscaleskew: None,
        }
    }

    pub fn fixscaleskew(mut self, matrix: impl Into<String>) -> Self {
        self.fixscaleskew = Some(matrix.into());
        self
    }

    pub fn command(&self) -> String {
        let mut parts = vec!["convert_xfm".to_string(), format!("-omat {}", self.omat)];
        match &self.operation {
            XfmOperation::Inverse(inv) => parts.push(format!("-inverse {inv}")),
            XfmOperation::Concat(b_to_c, a_to_b) => {
                parts.push(format!("-concat {b_to_c} {a_to_b}"))
            }
        }
        if let Some(fix) = &self.fixscaleskew {
            parts.push(format!("-fixscaleskew {fix}"));
        }
        parts.join(" ")
    }
}

// ---------------------------------------------------------------------------
// bet
// ---------------------------------------------------------------------------

/// Brain extraction (`bet`).
#[derive(Debug, Clone, PartialEq)]
pub struct Bet {
    pub input: String,
    pub output: String,
    pub frac: f64,
    pub mask: bool,
    pub flags: Vec<String>,
}

impl Bet {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            frac: 0.5,
            mask: false,
            flags: Vec::new(),
        }
    }

    pub fn frac(mut self, frac: f64) -> Self {
        self.frac = frac;
        self
    }

    pub fn mask(mut self, mask: bool) -> Self {
        self.mask = mask;
        self
    }

    pub fn flags(mut self, flags: Vec<String>) -> Self {
        self.flags = flags;
        self
    }

    pub fn command(&self) -> String {
        let mut parts = vec![
            "bet".to_string(),
            self.input.clone(),
            self.output.clone(),
            format!("-f {}", self.frac),
        ];
        if self.mask {
            parts.push("-m".to_string());
        }
        parts.extend(self.flags.iter().cloned());
        parts.join(" ")
    }
}

// ---------------------------------------------------------------------------
// probtrackx2
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshSpace {
    Caret,
    Freesurfer,
    First,
    Voxel,
}

impl MeshSpace {
    pub fn as_str(self) -> &'static str {
        match self {
            MeshSpace::Caret => "caret",
            MeshSpace::Freesurfer => "freesurfer",
            MeshSpace::First => "first",
            MeshSpace::Voxel => "voxel",
        }
    }
}

impl fmt::Display for MeshSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeshSpace {
    type Err = SeamError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "caret" => Ok(MeshSpace::Caret),
            "freesurfer" => Ok(MeshSpace::Freesurfer),
            "first" => Ok(MeshSpace::First),
            "voxel" => Ok(MeshSpace::Voxel),
            other => Err(SeamError::invalid(
                "probtrackx2",
                format!("meshspace '{other}' must be one of caret, freesurfer, first, voxel"),
            )),
        }
    }
}

/// Probabilistic tractography (`probtrackx2`).
///
/// Only the tracking options are modelled; matrix options go through `flags`.
/// Every numeric option is always emitted so the generated command documents
/// the exact settings used.
#[derive(Debug, Clone, PartialEq)]
pub struct Probtrackx2 {
    pub samples: String,
    pub mask: String,
    pub seed: String,
    pub out: String,
    pub directory: String,
    pub nsamples: u32,
    pub nsteps: u32,
    pub steplength: f64,
    pub distthresh: f64,
    pub cthr: f64,
    pub fibthresh: f64,
    /// 0: off, 1: random fibres above `fibthresh`, 2: proportional to f,
    /// 3: all populations at random.
    pub randfib: u8,
    pub sampvox: u32,
    pub verbose: u8,
    pub xfm: Option<String>,
    pub invxfm: Option<String>,
    pub seedref: Option<String>,
    pub meshspace: MeshSpace,
    pub opd: bool,
    pub pd: bool,
    pub usef: bool,
    pub loopcheck: bool,
    pub modeuler: bool,
    pub os2t: bool,
    pub s2tastext: bool,
    pub flags: Vec<String>,
}

impl Probtrackx2 {
    pub fn new(
        samples: impl Into<String>,
        mask: impl Into<String>,
        seed: impl Into<String>,
    ) -> Self {
        Self {
            samples: samples.into(),
            mask: mask.into(),
            seed: seed.into(),
            out: "fdt_paths".to_string(),
            directory: "logdir".to_string(),
            nsamples: 5000,
            nsteps: 2000,
            steplength: 0.5,
            distthresh: 0.0,
            cthr: 0.2,
            fibthresh: 0.01,
            randfib: 0,
            sampvox: 0,
            verbose: 0,
            xfm: None,
            invxfm: None,
            seedref: None,
            meshspace: MeshSpace::Caret,
            opd: true,
            pd: false,
            usef: false,
            loopcheck: false,
            modeuler: false,
            os2t: true,
            s2tastext: true,
            flags: Vec::new(),
        }
    }

    pub fn command(&self) -> String {
        let mut parts = vec![
            "probtrackx2".to_string(),
            format!("-s {}", self.samples),
            format!("-m {}", self.mask),
            format!("-x {}", self.seed),
            format!("-o {}", self.out),
            format!("--dir={}", self.directory),
            "--forcedir".to_string(),
            format!("-P {}", self.nsamples),
            format!("-S {}", self.nsteps),
            format!("--steplength={}", self.steplength),
            format!("--distthresh={}", self.distthresh),
            format!("--cthr={}", self.cthr),
            format!("--fibthresh={}", self.fibthresh),
            format!("--randfib={}", self.randfib),
            format!("--sampvox={}", self.sampvox),
            format!("--verbose={}", self.verbose),
        ];
        if let Some(xfm) = &self.xfm {
            parts.push(format!("--xfm={xfm}"));
        }
        if let Some(invxfm) = &self.invxfm {
            parts.push(format!("--invxfm={invxfm}"));
        }
        if let Some(seedref) = &self.seedref {
            parts.push(format!("--seedref={seedref}"));
        }
        parts.push(format!("--meshspace={}", self.meshspace));
        let switches = [
            (self.opd, "--opd"),
            (self.pd, "--pd"),
            (self.usef, "--usef"),
            (self.loopcheck, "--loopcheck"),
            (self.modeuler, "--modeuler"),
            (self.os2t, "--os2t"),
            (self.s2tastext, "--s2tastext"),
        ];
        parts.extend(
            switches
                .iter()
                .filter(|(on, _)| *on)
                .map(|(_, flag)| flag.to_string()),
        );
        parts.extend(self.flags.iter().cloned());
        parts.join(" ")
    }
}
