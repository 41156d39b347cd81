use crate::output::print_command;
use clap::Args;
use seam_core::util::{self, XvfbOptions, DEFAULT_XVFB_SERVER_ARGS, DEFAULT_XVFB_WAIT};

#[derive(Args)]
pub struct XvfbWrapArgs {
    /// Seconds to wait for the X server to start
    #[arg(long, default_value_t = DEFAULT_XVFB_WAIT)]
    pub wait: u32,

    /// Arguments for the Xvfb server
    #[arg(long, default_value = DEFAULT_XVFB_SERVER_ARGS, allow_hyphen_values = true)]
    pub server_args: String,

    /// Xauthority file (random /tmp name if omitted)
    #[arg(long, value_name = "FILE")]
    pub auth_file: Option<String>,

    /// Server error log (random /tmp name if omitted)
    #[arg(long, value_name = "FILE")]
    pub error_file: Option<String>,

    /// Derive the auth and error file names from the command instead of randomly
    #[arg(long)]
    pub stable: bool,

    /// Command to wrap
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

pub fn run(args: XvfbWrapArgs, json: bool) -> anyhow::Result<()> {
    let cmd = args.command.join(" ");
    let mut opts = XvfbOptions {
        wait: args.wait,
        server_args: args.server_args,
        auth_file: args.auth_file,
        error_file: args.error_file,
    };
    if args.stable {
        opts = opts.stable_for(&cmd);
    }
    print_command(&util::wrap_with_xvfb(&cmd, &opts), json)
}
