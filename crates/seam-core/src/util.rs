//! Helpers shared by the formatters: headless wrapping and temp file names.

use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::path::Path;

pub const DEFAULT_TMP_DIR: &str = "/tmp";
pub const DEFAULT_TMP_EXT: &str = "out";
pub const DEFAULT_TMP_NAME_LEN: usize = 32;

pub const DEFAULT_XVFB_WAIT: u32 = 5;
pub const DEFAULT_XVFB_SERVER_ARGS: &str = "-screen 0, 1600x1200x24";

// ---------------------------------------------------------------------------
// Temp file names
// ---------------------------------------------------------------------------

/// A random file name `{basename}/{name_len random chars}.{ext}`.
///
/// Only the name is produced; nothing is created on disk.
pub fn tmp_filename(ext: &str, basename: &Path, name_len: usize) -> String {
    let name: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(name_len)
        .map(char::from)
        .collect();
    basename.join(format!("{name}.{ext}")).display().to_string()
}

/// Like [`tmp_filename`] but the name is the hex SHA-256 of `seed`, truncated
/// to `name_len` (at most 64) characters. Same seed, same name.
pub fn hashed_tmp_filename(seed: &str, ext: &str, basename: &Path, name_len: usize) -> String {
    let digest = format!("{:x}", Sha256::digest(seed.as_bytes()));
    let name = &digest[..name_len.min(digest.len())];
    basename.join(format!("{name}.{ext}")).display().to_string()
}

// ---------------------------------------------------------------------------
// xvfb-run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XvfbOptions {
    /// Seconds xvfb-run waits for the X server to start.
    pub wait: u32,
    pub server_args: String,
    /// Xauthority file (`-f`). A random `/tmp` name is used when `None`.
    pub auth_file: Option<String>,
    /// Server error log (`-e`). A random `/tmp` name is used when `None`.
    pub error_file: Option<String>,
}

impl Default for XvfbOptions {
    fn default() -> Self {
        Self {
            wait: DEFAULT_XVFB_WAIT,
            server_args: DEFAULT_XVFB_SERVER_ARGS.to_string(),
            auth_file: None,
            error_file: None,
        }
    }
}

impl XvfbOptions {
    /// Fill the auth and error files with names derived from `cmd`, so the
    /// same command always wraps to the same string.
    pub fn stable_for(mut self, cmd: &str) -> Self {
        let tmp = Path::new(DEFAULT_TMP_DIR);
        if self.auth_file.is_none() {
            self.auth_file = Some(hashed_tmp_filename(
                &format!("auth:{cmd}"),
                DEFAULT_TMP_EXT,
                tmp,
                DEFAULT_TMP_NAME_LEN,
            ));
        }
        if self.error_file.is_none() {
            self.error_file = Some(hashed_tmp_filename(
                &format!("error:{cmd}"),
                DEFAULT_TMP_EXT,
                tmp,
                DEFAULT_TMP_NAME_LEN,
            ));
        }
        self
    }
}

/// Prefix `cmd` with `xvfb-run` so a graphical tool runs without a display.
pub fn wrap_with_xvfb(cmd: &str, opts: &XvfbOptions) -> String {
    let tmp = Path::new(DEFAULT_TMP_DIR);
    let auth = opts
        .auth_file
        .clone()
        .unwrap_or_else(|| tmp_filename(DEFAULT_TMP_EXT, tmp, DEFAULT_TMP_NAME_LEN));
    let error = opts
        .error_file
        .clone()
        .unwrap_or_else(|| tmp_filename(DEFAULT_TMP_EXT, tmp, DEFAULT_TMP_NAME_LEN));
    format!(
        "xvfb-run -a --wait={wait} -f {auth} -e {error} --server-args=\"{args}\" {cmd}",
        wait = opts.wait,
        args = opts.server_args,
    )
}
