//! Handling the beamprop CLI
//!
//! This module handles the command line parsing as well as basic information (e.g. help dialog, version information, etc.).
use crate::error::{BeamPropError, BpResult};
use crate::plottable::PltBackEnd;
use clap::Parser;
use std::path::{Path, PathBuf};

/// File extensions accepted for the plot output.
const PLOT_EXTENSIONS: [&str; 5] = ["png", "bmp", "jpg", "jpeg", "svg"];

/// Command line arguments for the beamprop application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// file path of the beam setup, which should be read in
    pub file_path: PathBuf,
    /// file path of the plot to be created
    pub output: PathBuf,
}
impl Args {
    /// Returns the plotting backend matching the output file.
    #[must_use]
    pub fn backend(&self) -> PltBackEnd {
        PltBackEnd::from_path(&self.output)
    }
}

/// Unchecked command line arguments as parsed by `clap`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct PartialArgs {
    /// filepath of the beam setup (.yaml) to read in
    #[arg(short, long)]
    file_path: String,

    /// filepath of the plot (.png, .bmp, .jpg or .svg). if not defined, the setup file name with a .png extension is used
    #[arg(short, long)]
    output: Option<String>,
}

/// Checks if the passed file path is valid.
/// # Attributes
/// * `path`: Path to the file
/// # Returns
/// Returns True if the file exists and has a `.yaml` or `.yml` extension, false otherwise
fn file_path_is_valid(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

fn eval_file_path_input(file_path: &str) -> Option<PathBuf> {
    let path = PathBuf::from(file_path);
    file_path_is_valid(&path).then_some(path)
}

/// Evaluates the output path of the plot.
/// # Attributes
/// * `output`: user given output path, if any
/// * `file_path`: (valid) path of the setup file
/// # Returns
/// * the given output path, if its extension is supported and its directory exists
/// * the setup file path with a `.png` extension if no output is given
/// * None otherwise
fn eval_output_input(output: Option<&str>, file_path: &Path) -> Option<PathBuf> {
    let Some(output) = output else {
        return Some(file_path.with_extension("png"));
    };
    let path = PathBuf::from(output);
    let extension_is_valid = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            PLOT_EXTENSIONS
                .iter()
                .any(|valid| ext.eq_ignore_ascii_case(valid))
        });
    let directory_exists = path
        .parent()
        .map_or(true, |dir| dir.as_os_str().is_empty() || dir.is_dir());
    (extension_is_valid && directory_exists).then_some(path)
}

impl TryFrom<PartialArgs> for Args {
    type Error = BeamPropError;

    fn try_from(part_args: PartialArgs) -> BpResult<Self> {
        let file_path = eval_file_path_input(&part_args.file_path).ok_or_else(|| {
            BeamPropError::Console(format!(
                "invalid setup file path: {}. Must be an existing .yaml or .yml file",
                part_args.file_path
            ))
        })?;
        let output = eval_output_input(part_args.output.as_deref(), &file_path).ok_or_else(
            || {
                BeamPropError::Console(format!(
                    "invalid output path: {}. Must end with one of {} in an existing directory",
                    part_args.output.as_deref().unwrap_or_default(),
                    PLOT_EXTENSIONS.join(", ")
                ))
            },
        )?;
        Ok(Self { file_path, output })
    }
}
