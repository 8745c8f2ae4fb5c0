//! Minimal CLI: JSON documents in → GML data-structure code out.
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert hand-authored JSON into GML ds_map/ds_list construction code
#[derive(Parser, Debug)]
#[command(name = "easy-ds", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// convert JSON documents to GML construction code
    Gml(GmlOut),
    /// parse-check JSON documents and report where they break
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select a subnode in each document (e.g. /data/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug)]
struct GmlOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// GML variable name for the root map
    #[arg(long, default_value = crate::emit::ROOT_MAP_NAME)]
    root_name: String,

    /// output .gml file (single input only; stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// write one .gml file per input into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// skip inputs that fail to convert instead of aborting
    #[arg(long, default_value_t = false)]
    lenient: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// emit a machine-readable JSON report instead of per-file lines
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Default, Serialize)]
struct CheckReport {
    ok: Vec<String>,
    failed: Vec<FailedInput>,
}

#[derive(Debug, Serialize)]
struct FailedInput {
    path: String,
    diagnostic: crate::diagnose::ParseDiagnostic,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Gml(target) => target.run(),
            Command::Check(target) => target.run(),
        }
    }
}

impl GmlOut {
    fn run(&self) -> anyhow::Result<()> {
        if !GML_IDENTIFIER.is_match(&self.root_name) {
            anyhow::bail!(
                "--root-name `{}` is not a valid GML identifier",
                self.root_name
            );
        }
        let sources = resolve_file_path_patterns(&self.input_settings.input)?;
        log::debug!("resolved {} input file(s)", sources.len());

        match (&self.out, &self.out_dir) {
            (Some(_), Some(_)) => {
                anyhow::bail!("--out and --out-dir are mutually exclusive")
            }
            (Some(out), None) => {
                let [source] = sources.as_slice() else {
                    anyhow::bail!("--out expects exactly one input, got {}", sources.len());
                };
                if let Some(gml) = self.convert(source)? {
                    write_output(out, &gml)?;
                }
            }
            (None, Some(out_dir)) => {
                std::fs::create_dir_all(out_dir)
                    .with_context(|| format!("failed to create {}", out_dir.display()))?;
                let targets = batch_output_targets(&sources, out_dir)?;
                // Generation is pure per document, so a batch can fan out.
                sources
                    .par_iter()
                    .zip(targets.par_iter())
                    .try_for_each(|(source, target)| {
                        let Some(gml) = self.convert(source)? else {
                            return Ok(());
                        };
                        write_output(target, &gml)
                    })?;
            }
            (None, None) => {
                for source in &sources {
                    if let Some(gml) = self.convert(source)? {
                        println!("{gml}");
                    }
                }
            }
        }
        Ok(())
    }

    /// Convert one input file. `Ok(None)` means the file failed but
    /// `--lenient` asked to keep going: an empty result, nothing to show.
    fn convert(&self, source: &Path) -> anyhow::Result<Option<String>> {
        match self.convert_inner(source) {
            Ok(gml) => Ok(Some(gml)),
            Err(error) if self.lenient => {
                log::warn!("skipping input: {error:#}");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    fn convert_inner(&self, source: &Path) -> anyhow::Result<String> {
        let text = std::fs::read_to_string(source)
            .with_context(|| format!("failed to read {}", source.display()))?;
        match self.input_settings.json_pointer.as_deref() {
            None => crate::emit::try_generate_named(&text, &self.root_name)
                .with_context(|| format!("failed to convert {}", source.display())),
            Some(pointer) => {
                let parsed: serde_json::Value = serde_json::from_str(&text)
                    .with_context(|| format!("invalid JSON in {}", source.display()))?;
                let node = parsed.pointer(pointer).with_context(|| {
                    format!(
                        "JSON pointer `{pointer}` selects nothing in {}",
                        source.display()
                    )
                })?;
                crate::emit::try_generate_value(node, &self.root_name)
                    .with_context(|| format!("failed to convert {}", source.display()))
            }
        }
    }
}

impl CheckArgs {
    fn run(&self) -> anyhow::Result<()> {
        let sources = resolve_file_path_patterns(&self.input)?;
        let mut report = CheckReport::default();

        for source in &sources {
            let display = source.display().to_string();
            let text = std::fs::read_to_string(source)
                .with_context(|| format!("failed to read {display}"))?;
            match crate::diagnose::parse_with_diagnostic(&text) {
                Ok(_) => {
                    if !self.json {
                        println!("{} {display}", "ok".green().bold());
                    }
                    report.ok.push(display);
                }
                Err(diagnostic) => {
                    if !self.json {
                        println!("{} {display} {diagnostic}", "bad".red().bold());
                    }
                    report.failed.push(FailedInput {
                        path: display,
                        diagnostic,
                    });
                }
            }
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        if report.failed.is_empty() {
            Ok(())
        } else {
            let total = report.ok.len() + report.failed.len();
            anyhow::bail!("{} of {total} input(s) failed to parse", report.failed.len())
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

static GML_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

fn write_output(target: &Path, gml: &str) -> anyhow::Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(target, gml)
        .with_context(|| format!("failed to write {}", target.display()))?;
    log::info!("wrote {}", target.display());
    Ok(())
}

/// One `.gml` target per input, named by file stem. Two inputs sharing a
/// stem would race to the same file with the last writer winning, so
/// collisions abort up front.
fn batch_output_targets(sources: &[PathBuf], out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = std::collections::HashMap::<PathBuf, &Path>::new();
    let mut targets = Vec::with_capacity(sources.len());
    for source in sources {
        let stem = source
            .file_stem()
            .unwrap_or_else(|| std::ffi::OsStr::new("out"));
        let target = out_dir.join(stem).with_extension("gml");
        if let Some(previous) = seen.insert(target.clone(), source.as_path()) {
            anyhow::bail!(
                "inputs {} and {} would both write {}",
                previous.display(),
                source.display(),
                target.display()
            );
        }
        targets.push(target);
    }
    Ok(targets)
}

fn resolve_file_path_patterns(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for pattern in patterns {
        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in
                glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))?
            {
                let path = entry.with_context(|| format!("unreadable match for {pattern}"))?;
                matched_any = true;
                out.push(path);
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing.
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // Treat as a literal path.
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gml_identifier_accepts_sane_names() {
        assert!(GML_IDENTIFIER.is_match("_converted_ds"));
        assert!(GML_IDENTIFIER.is_match("global_state2"));
        assert!(!GML_IDENTIFIER.is_match("2bad"));
        assert!(!GML_IDENTIFIER.is_match("has space"));
        assert!(!GML_IDENTIFIER.is_match(""));
    }

    #[test]
    fn batch_targets_map_stems_into_out_dir() {
        let sources = [PathBuf::from("a/menu.json"), PathBuf::from("a/level.json")];
        let targets = batch_output_targets(&sources, Path::new("out")).unwrap();
        assert_eq!(
            targets,
            [PathBuf::from("out/menu.gml"), PathBuf::from("out/level.gml")]
        );
    }

    #[test]
    fn batch_targets_reject_colliding_stems() {
        let sources = [PathBuf::from("a/level.json"), PathBuf::from("b/level.json")];
        let err = batch_output_targets(&sources, Path::new("out")).unwrap_err();
        assert!(err.to_string().contains("level.gml"));
    }

    #[test]
    fn literal_paths_pass_through_unresolved() {
        let resolved =
            resolve_file_path_patterns(&["level.json".to_string(), "a/b.json".to_string()])
                .unwrap();
        assert_eq!(resolved, [PathBuf::from("level.json"), PathBuf::from("a/b.json")]);
    }
}
