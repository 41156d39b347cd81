//! The FreeSurfer recon recipe.
//!
//! One call produces an executable bash script that imports the subject's
//! images, runs the full `recon-all` stream, and captures QA screenshots of
//! the volume and of both inflated hemispheres. The Tcl scripts driving
//! `tkmedit` and `tksurfer` are written next to it.
//!
//! Layout under `script_dir`:
//!
//! ```text
//! {id}.recon.sh            main script, mode 0700
//! {id}.tkmedit.tcl         volume screenshots
//! {id}.tksurfer.lh.tcl     left hemisphere screenshots
//! {id}.tksurfer.rh.tcl     right hemisphere screenshots
//! {id}_screenshots/        filled in when the script runs
//! ```
//!
//! The builder trusts its inputs: ids and paths are embedded as given. Every
//! build overwrites the previous artifacts. Two builds for the same id and
//! directory at the same time race and the last writer wins; callers that
//! need more must serialise builds themselves.

use crate::config::RecipeConfig;
use crate::error::Result;
use crate::freesurfer::{self, Hemisphere};
use crate::util::wrap_with_xvfb;
use crate::{io, paths, SEAM_VERSION};
use std::path::{Path, PathBuf};

pub const GENERATOR: &str = "seam";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local time formatted for the script header.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// `explicit` if set, otherwise `script_dir`.
pub fn resolve_subjects_dir(explicit: Option<&Path>, script_dir: &Path) -> PathBuf {
    explicit.unwrap_or(script_dir).to_path_buf()
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ReconRecipe {
    pub subject_id: String,
    /// Raw T1 images, imported with one `-i` each in this order.
    pub inputs: Vec<String>,
    pub script_dir: PathBuf,
    /// FreeSurfer's `SUBJECTS_DIR`. `None` falls back to `script_dir`.
    pub subjects_dir: Option<PathBuf>,
    /// Wrap `tkmedit`/`tksurfer` in `xvfb-run`.
    pub headless: bool,
    /// Extra flags appended to `recon-all -all`.
    pub recon_flags: Vec<String>,
    pub config: RecipeConfig,
}

impl ReconRecipe {
    pub fn new(
        subject_id: impl Into<String>,
        inputs: Vec<String>,
        script_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            inputs,
            script_dir: script_dir.into(),
            subjects_dir: None,
            headless: false,
            recon_flags: Vec::new(),
            config: RecipeConfig::default(),
        }
    }

    pub fn subjects_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.subjects_dir = dir;
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn recon_flags(mut self, flags: Vec<String>) -> Self {
        self.recon_flags = flags;
        self
    }

    pub fn config(mut self, config: RecipeConfig) -> Self {
        self.config = config;
        self
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// A file the recipe writes, before it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Everything a build would write, computed without touching the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRecipe {
    pub subjects_dir: PathBuf,
    pub main_script: ScriptFile,
    pub tkmedit_tcl: ScriptFile,
    /// `[lh, rh]`
    pub tksurfer_tcl: [ScriptFile; 2],
}

/// Paths written by [`ReconRecipe::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeArtifacts {
    pub main_script: PathBuf,
    pub tkmedit_tcl: PathBuf,
    /// `[lh, rh]`
    pub tksurfer_tcl: [PathBuf; 2],
}

impl RecipeArtifacts {
    /// Main script, tkmedit Tcl, lh tksurfer Tcl, rh tksurfer Tcl.
    pub fn paths(&self) -> [&Path; 4] {
        [
            &self.main_script,
            &self.tkmedit_tcl,
            &self.tksurfer_tcl[0],
            &self.tksurfer_tcl[1],
        ]
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

impl ReconRecipe {
    fn maybe_headless(&self, cmd: String) -> String {
        if !self.headless {
            return cmd;
        }
        let opts = self.config.xvfb.options().stable_for(&cmd);
        wrap_with_xvfb(&cmd, &opts)
    }

    fn tkmedit_part(&self) -> (ScriptFile, String) {
        let id = &self.subject_id;
        let shots = paths::screenshots_path(&self.script_dir, id);
        let tcl_path = paths::tkmedit_tcl_path(&self.script_dir, id);
        let tkm = &self.config.tkmedit;
        let cmd = freesurfer::tkmedit_screenshot_cmd(id, &tkm.volume, &tcl_path, &tkm.flags);
        let tcl = ScriptFile {
            contents: freesurfer::tkmedit_screenshot_tcl(&shots, tkm.slices),
            path: tcl_path,
        };
        (tcl, self.maybe_headless(cmd))
    }

    fn tksurfer_part(&self, hemi: Hemisphere) -> (ScriptFile, String) {
        let id = &self.subject_id;
        let basepath = paths::tksurfer_screenshot_basepath(&self.script_dir, id, hemi);
        let tcl_path = paths::tksurfer_tcl_path(&self.script_dir, id, hemi);
        let tks = &self.config.tksurfer;
        let cmd =
            freesurfer::tksurfer_screenshot_cmd(id, hemi, &tks.surface, &tcl_path, &tks.flags);
        let tcl = ScriptFile {
            contents: freesurfer::tksurfer_screenshot_tcl(
                &basepath,
                freesurfer::DEFAULT_ANNOTATION,
            ),
            path: tcl_path,
        };
        (tcl, self.maybe_headless(cmd))
    }

    fn annot2label_part(&self, subjects_dir: &Path, hemi: Hemisphere) -> String {
        let id = &self.subject_id;
        freesurfer::annot2label_cmd(
            id,
            hemi,
            &paths::annotation_file(subjects_dir, id, hemi),
            &paths::label_dir(subjects_dir, id),
            &self.config.tksurfer.label_surface,
        )
    }

    /// Compute every artifact for this recipe without touching the disk or
    /// logging. `generated_at` is stamped into the header verbatim; everything
    /// else depends only on `self`.
    pub fn render(&self, generated_at: &str) -> RenderedRecipe {
        let id = &self.subject_id;
        let subjects_dir = resolve_subjects_dir(self.subjects_dir.as_deref(), &self.script_dir);

        let input_cmd = freesurfer::recon_input(id, &self.inputs);
        let all_cmd = freesurfer::recon_all(id, &self.recon_flags);
        let (tkmedit_tcl, tkm_cmd) = self.tkmedit_part();

        let mut lines = vec![
            "#!/bin/bash".to_string(),
            format!("# Generated by {GENERATOR} version {SEAM_VERSION} at {generated_at}"),
            String::new(),
            "# Recon Input Command".to_string(),
            input_cmd,
            String::new(),
            "# Recon All command".to_string(),
            all_cmd,
            String::new(),
            "# TKMedit Screenshots command".to_string(),
            tkm_cmd,
        ];

        let [lh, rh] = Hemisphere::both().map(|hemi| {
            let a2l_cmd = self.annot2label_part(&subjects_dir, hemi);
            let (tcl, tks_cmd) = self.tksurfer_part(hemi);
            lines.extend([
                String::new(),
                format!("# Convert 2009 {hemi} annotation to labels"),
                a2l_cmd,
                String::new(),
                format!("# TKSurfer {hemi} Screenshot command"),
                tks_cmd,
            ]);
            tcl
        });

        let mut contents = lines.join("\n");
        contents.push('\n');

        RenderedRecipe {
            main_script: ScriptFile {
                path: paths::recon_script_path(&self.script_dir, id),
                contents,
            },
            subjects_dir,
            tkmedit_tcl,
            tksurfer_tcl: [lh, rh],
        }
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    /// Write the recipe to disk and return the artifact paths.
    ///
    /// Stops at the first I/O error; files already written are left in place.
    pub fn build(&self) -> Result<RecipeArtifacts> {
        self.build_at(&timestamp_now())
    }

    /// [`build`](Self::build) with a caller-supplied header timestamp.
    pub fn build_at(&self, generated_at: &str) -> Result<RecipeArtifacts> {
        if self.subjects_dir.is_none() {
            tracing::warn!(
                "SUBJECTS_DIR is not set; using {} as the subjects directory",
                self.script_dir.display()
            );
        }
        io::ensure_dir(&self.script_dir)?;
        io::ensure_dir(&paths::screenshots_path(&self.script_dir, &self.subject_id))?;

        let rendered = self.render(generated_at);

        io::write_file(&rendered.tkmedit_tcl.path, rendered.tkmedit_tcl.contents.as_bytes())?;
        for tcl in &rendered.tksurfer_tcl {
            io::write_file(&tcl.path, tcl.contents.as_bytes())?;
        }

        let main = &rendered.main_script;
        io::write_file(&main.path, main.contents.as_bytes())?;
        io::make_owner_executable(&main.path)?;

        tracing::info!(
            subject = %self.subject_id,
            script = %main.path.display(),
            "recon recipe written"
        );

        let [lh, rh] = rendered.tksurfer_tcl;
        Ok(RecipeArtifacts {
            main_script: rendered.main_script.path,
            tkmedit_tcl: rendered.tkmedit_tcl.path,
            tksurfer_tcl: [lh.path, rh.path],
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const STAMP: &str = "2024-01-02 03:04:05";

    fn sub0001(script_dir: &Path) -> ReconRecipe {
        ReconRecipe::new("sub0001", vec!["/data/t1.nii".to_string()], script_dir)
            .subjects_dir(Some(PathBuf::from("/subjects")))
    }

    fn lines(script: &str) -> Vec<&str> {
        script.lines().collect()
    }

    fn position(lines: &[&str], needle: &str) -> usize {
        lines
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("no line containing {needle:?}"))
    }

    #[test]
    fn script_has_commands_in_pipeline_order() {
        let rendered = sub0001(Path::new("/out")).render(STAMP);
        let script = &rendered.main_script.contents;
        let lines = lines(script);

        assert_eq!(lines[0], "#!/bin/bash");
        assert_eq!(
            lines[1],
            format!("# Generated by seam version {SEAM_VERSION} at {STAMP}")
        );

        let input = position(&lines, "recon-all -s sub0001 -i /data/t1.nii");
        assert_eq!(lines[input], "recon-all -s sub0001 -i /data/t1.nii");
        let all = position(&lines, "-measure jacobian_white");
        assert_eq!(
            lines[all],
            "recon-all -s sub0001 -all -qcache -measure thickness -measure curv \
             -measure sulc -measure area -measure jacobian_white"
        );
        let tkm = position(&lines, "-tcl /out/sub0001.tkmedit.tcl");
        assert_eq!(
            lines[tkm],
            "tkmedit sub0001 brain.finalsurfs.mgz -aseg -surfs -tcl /out/sub0001.tkmedit.tcl"
        );
        let a2l_lh = position(&lines, "--hemi lh");
        let tks_lh = position(&lines, "-tcl /out/sub0001.tksurfer.lh.tcl");
        let a2l_rh = position(&lines, "--hemi rh");
        let tks_rh = position(&lines, "-tcl /out/sub0001.tksurfer.rh.tcl");

        assert!(input < all);
        assert!(all < tkm);
        assert!(tkm < a2l_lh);
        assert!(a2l_lh < tks_lh);
        assert!(tks_lh < a2l_rh);
        assert!(a2l_rh < tks_rh);

        assert_eq!(
            lines[a2l_lh],
            "mri_annotation2label --subject sub0001 --hemi lh \
             --annotation /subjects/sub0001/label/lh.aparc.a2009s.annot \
             --outdir /subjects/sub0001/label --surface white"
        );
        assert_eq!(
            lines[tks_rh],
            "tksurfer sub0001 rh inflated -gray -tcl /out/sub0001.tksurfer.rh.tcl"
        );
        assert!(script.ends_with('\n'));
    }

    #[test]
    fn blocks_are_commented_and_separated() {
        let rendered = sub0001(Path::new("/out")).render(STAMP);
        let script = &rendered.main_script.contents;
        for comment in [
            "\n\n# Recon Input Command\n",
            "\n\n# Recon All command\n",
            "\n\n# TKMedit Screenshots command\n",
            "\n\n# Convert 2009 lh annotation to labels\n",
            "\n\n# TKSurfer lh Screenshot command\n",
            "\n\n# Convert 2009 rh annotation to labels\n",
            "\n\n# TKSurfer rh Screenshot command\n",
        ] {
            assert!(script.contains(comment), "missing block {comment:?}");
        }
    }

    #[test]
    fn headless_wraps_only_graphical_tools() {
        let rendered = sub0001(Path::new("/out")).headless(true).render(STAMP);
        let script = &rendered.main_script.contents;
        let mut graphical = 0;
        for line in script.lines() {
            if line.contains("tkmedit sub0001") || line.contains("tksurfer sub0001") {
                assert!(line.starts_with("xvfb-run "), "not wrapped: {line}");
                graphical += 1;
            }
            if line.starts_with("mri_annotation2label") || line.starts_with("recon-all") {
                assert!(!line.contains("xvfb-run"));
            }
        }
        assert_eq!(graphical, 3);
    }

    #[test]
    fn two_inputs_keep_order() {
        let recipe = ReconRecipe::new(
            "sub0001",
            vec!["/data/first.nii".to_string(), "/data/second.nii".to_string()],
            "/out",
        );
        let rendered = recipe.render(STAMP);
        assert!(rendered
            .main_script
            .contents
            .lines()
            .any(|l| l == "recon-all -s sub0001 -i /data/first.nii -i /data/second.nii"));
    }

    #[test]
    fn recon_flags_are_appended() {
        let rendered = sub0001(Path::new("/out"))
            .recon_flags(vec!["-use-gpu".to_string()])
            .render(STAMP);
        assert!(rendered
            .main_script
            .contents
            .lines()
            .any(|l| l.starts_with("recon-all -s sub0001 -all") && l.ends_with("-use-gpu")));
    }

    #[test]
    fn missing_subjects_dir_falls_back_to_script_dir() {
        let recipe = ReconRecipe::new("sub0001", vec!["/data/t1.nii".to_string()], "/out");
        let rendered = recipe.render(STAMP);
        assert_eq!(rendered.subjects_dir, PathBuf::from("/out"));
        assert!(rendered
            .main_script
            .contents
            .contains("--annotation /out/sub0001/label/lh.aparc.a2009s.annot"));
    }

    #[test]
    fn render_differs_only_in_timestamp() {
        let recipe = sub0001(Path::new("/out")).headless(true);
        let a = recipe.render("2024-01-02 03:04:05");
        let b = recipe.render("2024-01-02 03:04:06");
        let a_lines = lines(&a.main_script.contents);
        let b_lines = lines(&b.main_script.contents);
        assert_eq!(a_lines.len(), b_lines.len());
        let differing: Vec<usize> = (0..a_lines.len())
            .filter(|&i| a_lines[i] != b_lines[i])
            .collect();
        assert_eq!(differing, vec![1]);
        assert_eq!(a.tkmedit_tcl, b.tkmedit_tcl);
        assert_eq!(a.tksurfer_tcl, b.tksurfer_tcl);
    }

    #[test]
    fn aux_scripts_point_at_screenshot_dir() {
        let rendered = sub0001(Path::new("/out")).render(STAMP);
        assert!(rendered
            .tkmedit_tcl
            .contents
            .contains("SaveTIFF /out/sub0001_screenshots/tkmedit-$i.tiff"));
        assert!(rendered.tksurfer_tcl[0]
            .contents
            .contains("save_tiff /out/sub0001_screenshots/lh-lateral.tiff;"));
        assert!(rendered.tksurfer_tcl[1]
            .contents
            .contains("save_tiff /out/sub0001_screenshots/rh-annot-medial.tiff;"));
    }

    #[test]
    fn build_writes_four_artifacts_in_order() {
        let dir = TempDir::new().unwrap();
        let script_dir = dir.path().join("scripts");
        let artifacts = sub0001(&script_dir).build().unwrap();

        let paths = artifacts.paths();
        assert_eq!(paths.len(), 4);
        assert_eq!(paths[0], script_dir.join("sub0001.recon.sh"));
        assert_eq!(paths[1], script_dir.join("sub0001.tkmedit.tcl"));
        assert_eq!(paths[2], script_dir.join("sub0001.tksurfer.lh.tcl"));
        assert_eq!(paths[3], script_dir.join("sub0001.tksurfer.rh.tcl"));
        for path in paths {
            assert!(path.is_file(), "{} not written", path.display());
        }
        assert!(script_dir.join("sub0001_screenshots").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn build_makes_main_script_executable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let artifacts = sub0001(dir.path()).build().unwrap();
        let mode = std::fs::metadata(&artifacts.main_script)
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn rebuild_overwrites_with_identical_content() {
        let dir = TempDir::new().unwrap();
        let recipe = sub0001(dir.path()).headless(true);
        let first = recipe.build_at(STAMP).unwrap();
        let before = std::fs::read_to_string(&first.main_script).unwrap();
        let second = recipe.build_at(STAMP).unwrap();
        let after = std::fs::read_to_string(&second.main_script).unwrap();
        assert_eq!(first, second);
        assert_eq!(before, after);
        assert_eq!(after.matches("#!/bin/bash").count(), 1);
    }

    #[test]
    fn build_without_subjects_dir_still_succeeds() {
        let dir = TempDir::new().unwrap();
        let recipe = ReconRecipe::new("sub0001", vec!["/data/t1.nii".to_string()], dir.path());
        let artifacts = recipe.build().unwrap();
        let script = std::fs::read_to_string(&artifacts.main_script).unwrap();
        let label_dir = dir.path().join("sub0001").join("label");
        assert!(script.contains(&format!("--outdir {}", label_dir.display())));
    }

    #[test]
    fn build_into_unwritable_location_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let recipe = sub0001(&blocker.join("scripts"));
        assert!(matches!(recipe.build(), Err(crate::SeamError::Io(_))));
    }

    #[test]
    fn failed_main_script_write_keeps_tcl_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub0001.recon.sh")).unwrap();

        let err = sub0001(dir.path()).build_at(STAMP).unwrap_err();
        assert!(matches!(err, crate::SeamError::Io(_)));

        for name in [
            "sub0001.tkmedit.tcl",
            "sub0001.tksurfer.lh.tcl",
            "sub0001.tksurfer.rh.tcl",
        ] {
            assert!(dir.path().join(name).is_file(), "{name} was removed");
        }
        assert!(dir.path().join("sub0001.recon.sh").is_dir());
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        // three Tcl files, the blocking directory and the screenshots dir
        assert_eq!(entries, 5);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logs_of(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn render_does_not_log_fallback_warning() {
        let recipe = ReconRecipe::new("sub0001", vec!["/data/t1.nii".to_string()], "/out");
        let logs = logs_of(|| {
            recipe.render(STAMP);
        });
        assert!(logs.is_empty(), "unexpected logs: {logs}");
    }

    #[test]
    fn build_warns_once_about_missing_subjects_dir() {
        let dir = TempDir::new().unwrap();
        let recipe = ReconRecipe::new("sub0001", vec!["/data/t1.nii".to_string()], dir.path());
        let logs = logs_of(|| {
            recipe.build_at(STAMP).unwrap();
        });
        assert_eq!(logs.matches("SUBJECTS_DIR is not set").count(), 1);

        let logs = logs_of(|| {
            sub0001(dir.path()).build_at(STAMP).unwrap();
        });
        assert!(!logs.contains("SUBJECTS_DIR"));
    }

    #[test]
    fn config_changes_tool_arguments() {
        let mut config = RecipeConfig::default();
        config.tkmedit.volume = "T1.mgz".to_string();
        config.tkmedit.flags = Vec::new();
        config.tksurfer.surface = "pial".to_string();
        let rendered = sub0001(Path::new("/out")).config(config).render(STAMP);
        let script = &rendered.main_script.contents;
        assert!(script.contains("tkmedit sub0001 T1.mgz -tcl /out/sub0001.tkmedit.tcl"));
        assert!(script.contains("tksurfer sub0001 lh pial -gray -tcl"));
    }
}
