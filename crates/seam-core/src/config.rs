use crate::error::Result;
use crate::freesurfer::SliceRange;
use crate::util::{XvfbOptions, DEFAULT_XVFB_SERVER_ARGS, DEFAULT_XVFB_WAIT};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// TkmeditConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TkmeditConfig {
    #[serde(default = "default_tkmedit_volume")]
    pub volume: String,
    #[serde(default = "default_tkmedit_flags")]
    pub flags: Vec<String>,
    #[serde(default)]
    pub slices: SliceRange,
}

fn default_tkmedit_volume() -> String {
    "brain.finalsurfs.mgz".to_string()
}

fn default_tkmedit_flags() -> Vec<String> {
    vec!["-aseg".to_string(), "-surfs".to_string()]
}

impl Default for TkmeditConfig {
    fn default() -> Self {
        Self {
            volume: default_tkmedit_volume(),
            flags: default_tkmedit_flags(),
            slices: SliceRange::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// TksurferConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TksurferConfig {
    #[serde(default = "default_tksurfer_surface")]
    pub surface: String,
    #[serde(default = "default_tksurfer_flags")]
    pub flags: Vec<String>,
    /// Surface used by `mri_annotation2label` to place label coordinates.
    #[serde(default = "default_label_surface")]
    pub label_surface: String,
}

fn default_tksurfer_surface() -> String {
    "inflated".to_string()
}

fn default_tksurfer_flags() -> Vec<String> {
    vec!["-gray".to_string()]
}

fn default_label_surface() -> String {
    "white".to_string()
}

impl Default for TksurferConfig {
    fn default() -> Self {
        Self {
            surface: default_tksurfer_surface(),
            flags: default_tksurfer_flags(),
            label_surface: default_label_surface(),
        }
    }
}

// ---------------------------------------------------------------------------
// XvfbConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XvfbConfig {
    #[serde(default = "default_xvfb_wait")]
    pub wait: u32,
    #[serde(default = "default_xvfb_server_args")]
    pub server_args: String,
}

fn default_xvfb_wait() -> u32 {
    DEFAULT_XVFB_WAIT
}

fn default_xvfb_server_args() -> String {
    DEFAULT_XVFB_SERVER_ARGS.to_string()
}

impl Default for XvfbConfig {
    fn default() -> Self {
        Self {
            wait: default_xvfb_wait(),
            server_args: default_xvfb_server_args(),
        }
    }
}

impl XvfbConfig {
    pub fn options(&self) -> XvfbOptions {
        XvfbOptions {
            wait: self.wait,
            server_args: self.server_args.clone(),
            ..XvfbOptions::default()
        }
    }
}

// ---------------------------------------------------------------------------
// RecipeConfig
// ---------------------------------------------------------------------------

/// Tunables for the recon recipe. Every field has a default, so an empty
/// YAML document (or no file at all) gives the standard pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeConfig {
    #[serde(default)]
    pub tkmedit: TkmeditConfig,
    #[serde(default)]
    pub tksurfer: TksurferConfig,
    #[serde(default)]
    pub xvfb: XvfbConfig,
}

impl RecipeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: RecipeConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::write_file(path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let slices = self.tkmedit.slices;

        // A zero step never terminates the Tcl loop.
        if slices.step == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "tkmedit.slices.step must be greater than 0".to_string(),
            });
        }

        if slices.beg >= slices.end {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "tkmedit.slices range {}..{} is empty; no volume screenshots will be taken",
                    slices.beg, slices.end
                ),
            });
        }

        for (field, value) in [
            ("tkmedit.volume", &self.tkmedit.volume),
            ("tksurfer.surface", &self.tksurfer.surface),
            ("tksurfer.label_surface", &self.tksurfer.label_surface),
        ] {
            if value.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{field} must not be empty"),
                });
            }
        }

        if self.xvfb.wait > 60 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("xvfb.wait={} (>60s is unusual)", self.xvfb.wait),
            });
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg: RecipeConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, RecipeConfig::default());
        assert_eq!(cfg.tkmedit.volume, "brain.finalsurfs.mgz");
        assert_eq!(cfg.tkmedit.flags, vec!["-aseg", "-surfs"]);
        assert_eq!(cfg.tksurfer.surface, "inflated");
        assert_eq!(cfg.tksurfer.flags, vec!["-gray"]);
        assert_eq!(cfg.tksurfer.label_surface, "white");
        assert_eq!(cfg.xvfb.wait, 5);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let yaml = "tkmedit:\n  volume: T1.mgz\n  slices:\n    beg: 0\n    end: 128\n    step: 4\n";
        let cfg: RecipeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.tkmedit.volume, "T1.mgz");
        assert_eq!(cfg.tkmedit.flags, vec!["-aseg", "-surfs"]);
        assert_eq!(
            cfg.tkmedit.slices,
            SliceRange {
                beg: 0,
                end: 128,
                step: 4
            }
        );
        assert_eq!(cfg.tksurfer, TksurferConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seam.yaml");
        let mut cfg = RecipeConfig::default();
        cfg.xvfb.server_args = "-screen 0, 800x600x16".to_string();
        cfg.save(&path).unwrap();
        assert_eq!(RecipeConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = RecipeConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, crate::SeamError::Io(_)));
    }

    #[test]
    fn validate_default_config_no_warnings() {
        assert!(RecipeConfig::default().validate().is_empty());
    }

    #[test]
    fn validate_zero_step_is_error() {
        let mut cfg = RecipeConfig::default();
        cfg.tkmedit.slices.step = 0;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("step")));
    }

    #[test]
    fn validate_empty_range_and_blank_surface() {
        let mut cfg = RecipeConfig::default();
        cfg.tkmedit.slices.beg = 300;
        cfg.tksurfer.surface = " ".to_string();
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("empty")));
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("tksurfer.surface")));
    }

    #[test]
    fn xvfb_options_carry_config() {
        let cfg = XvfbConfig {
            wait: 12,
            server_args: "-screen 0, 640x480x8".to_string(),
        };
        let opts = cfg.options();
        assert_eq!(opts.wait, 12);
        assert_eq!(opts.server_args, "-screen 0, 640x480x8");
        assert!(opts.auth_file.is_none());
    }
}
