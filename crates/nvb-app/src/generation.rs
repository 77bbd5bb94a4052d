//! Project-file generation boundary
//!
//! Generating IDE project files is the job of an external collaborator. This
//! module defines the contract the launcher talks to ([`ProjectGenerator`]),
//! the package-source flags that control what gets generated, and two
//! implementations: one that does nothing and one that delegates to a
//! configured external command.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use nvb_core::prelude::*;
use nvb_core::CommandSpec;
use nvb_process::CommandRunner;

use crate::config::GenerationSettings;

// ─────────────────────────────────────────────────────────────────────────────
// Generation Flags
// ─────────────────────────────────────────────────────────────────────────────

/// Package source category for which project files are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationFlag {
    Embedded,
    Local,
    Registry,
    Git,
    BuiltIn,
    LocalTarball,
    Unknown,
    PlayerAssemblies,
}

impl GenerationFlag {
    /// Every flag, in settings-panel order.
    pub const ALL: [GenerationFlag; 8] = [
        GenerationFlag::Embedded,
        GenerationFlag::Local,
        GenerationFlag::Registry,
        GenerationFlag::Git,
        GenerationFlag::BuiltIn,
        GenerationFlag::LocalTarball,
        GenerationFlag::Unknown,
        GenerationFlag::PlayerAssemblies,
    ];

    /// Key used in config files and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            GenerationFlag::Embedded => "embedded",
            GenerationFlag::Local => "local",
            GenerationFlag::Registry => "registry",
            GenerationFlag::Git => "git",
            GenerationFlag::BuiltIn => "built_in",
            GenerationFlag::LocalTarball => "local_tarball",
            GenerationFlag::Unknown => "unknown",
            GenerationFlag::PlayerAssemblies => "player_assemblies",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GenerationFlag::Embedded => "Embedded packages",
            GenerationFlag::Local => "Local packages",
            GenerationFlag::Registry => "Registry packages",
            GenerationFlag::Git => "Git packages",
            GenerationFlag::BuiltIn => "Built-in packages",
            GenerationFlag::LocalTarball => "Local tarball",
            GenerationFlag::Unknown => "Packages from unknown sources",
            GenerationFlag::PlayerAssemblies => "Player projects",
        }
    }

    /// Longer help text, where the label alone is not enough
    pub fn description(&self) -> Option<&'static str> {
        match self {
            GenerationFlag::PlayerAssemblies => Some(
                "For each player project generate an additional csproj with the name 'project-player.csproj'",
            ),
            _ => None,
        }
    }
}

impl fmt::Display for GenerationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GenerationFlag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        GenerationFlag::ALL
            .into_iter()
            .find(|flag| flag.key() == normalized)
            .ok_or_else(|| {
                let known: Vec<_> = GenerationFlag::ALL.iter().map(|f| f.key()).collect();
                Error::config_invalid(format!(
                    "unknown generation flag '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// Set of enabled [`GenerationFlag`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationFlags(BTreeSet<GenerationFlag>);

impl Default for GenerationFlags {
    fn default() -> Self {
        Self::from_iter([GenerationFlag::Embedded, GenerationFlag::Local])
    }
}

impl FromIterator<GenerationFlag> for GenerationFlags {
    fn from_iter<I: IntoIterator<Item = GenerationFlag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl GenerationFlags {
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, flag: GenerationFlag) -> bool {
        self.0.contains(&flag)
    }

    /// Flip `flag`. Returns whether it is enabled afterwards.
    pub fn toggle(&mut self, flag: GenerationFlag) -> bool {
        if self.0.remove(&flag) {
            false
        } else {
            self.0.insert(flag);
            true
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = GenerationFlag> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Generator Contract
// ─────────────────────────────────────────────────────────────────────────────

/// Contract of the external project-generation collaborator.
#[trait_variant::make(ProjectGenerator: Send)]
pub trait LocalProjectGenerator {
    /// Regenerate whatever `changed` and `imported` affect, if anything.
    ///
    /// With `check_project_files`, the generator also regenerates project
    /// files that are missing or stale, even when both sets are empty.
    async fn sync_if_needed(
        &self,
        changed: &BTreeSet<String>,
        imported: &BTreeSet<String>,
        check_project_files: bool,
    ) -> Result<()>;

    /// Regenerate all project files unconditionally.
    async fn sync(&self) -> Result<()>;

    fn flags(&self) -> &GenerationFlags;

    /// Flip a generation flag. Returns whether it is enabled afterwards.
    fn toggle_flag(&mut self, flag: GenerationFlag) -> bool;
}

/// Generator used when no generator command is configured. Only logs.
#[derive(Debug, Clone, Default)]
pub struct NullProjectGenerator {
    flags: GenerationFlags,
}

impl NullProjectGenerator {
    pub fn new(flags: GenerationFlags) -> Self {
        Self { flags }
    }
}

impl ProjectGenerator for NullProjectGenerator {
    async fn sync_if_needed(
        &self,
        changed: &BTreeSet<String>,
        imported: &BTreeSet<String>,
        check_project_files: bool,
    ) -> Result<()> {
        debug!(
            "No project generator configured; ignoring {} changed / {} imported (check: {})",
            changed.len(),
            imported.len(),
            check_project_files
        );
        Ok(())
    }

    async fn sync(&self) -> Result<()> {
        info!("No project generator configured; nothing to regenerate");
        Ok(())
    }

    fn flags(&self) -> &GenerationFlags {
        &self.flags
    }

    fn toggle_flag(&mut self, flag: GenerationFlag) -> bool {
        self.flags.toggle(flag)
    }
}

/// Generator that delegates to an external command.
///
/// The configured argv is extended with `--include=<flag>` for every enabled
/// flag, then either `--all` (full sync) or one `--changed=<path>` /
/// `--imported=<path>` per path. A sync that asks for a project-file check
/// ends with `--check`.
#[derive(Debug, Clone)]
pub struct CommandProjectGenerator<R> {
    argv: Vec<String>,
    working_directory: PathBuf,
    timeout: Duration,
    flags: GenerationFlags,
    runner: R,
}

impl<R: CommandRunner + Sync> CommandProjectGenerator<R> {
    /// Returns `None` when `argv` is empty.
    pub fn new(
        argv: Vec<String>,
        working_directory: PathBuf,
        timeout: Duration,
        flags: GenerationFlags,
        runner: R,
    ) -> Option<Self> {
        if argv.is_empty() {
            return None;
        }
        Some(Self {
            argv,
            working_directory,
            timeout,
            flags,
            runner,
        })
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn base_command(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.argv[0])
            .args(self.argv[1..].iter().cloned())
            .current_dir(&self.working_directory);
        for flag in self.flags.iter() {
            spec = spec.arg(format!("--include={}", flag));
        }
        spec
    }

    /// Command for an incremental sync; `None` when there is nothing to do.
    pub fn incremental_command(
        &self,
        changed: &BTreeSet<String>,
        imported: &BTreeSet<String>,
        check_project_files: bool,
    ) -> Option<CommandSpec> {
        if changed.is_empty() && imported.is_empty() && !check_project_files {
            return None;
        }
        let mut spec = self
            .base_command()
            .args(changed.iter().map(|p| format!("--changed={}", p)))
            .args(imported.iter().map(|p| format!("--imported={}", p)));
        if check_project_files {
            spec = spec.arg("--check");
        }
        Some(spec)
    }

    pub fn full_command(&self) -> CommandSpec {
        self.base_command().arg("--all")
    }

    async fn run(&self, spec: CommandSpec) -> Result<()> {
        info!("Running project generator: {}", spec);
        let output = self
            .runner
            .run_captured(&spec, self.timeout)
            .await
            .map_err(|e| Error::generator(e.to_string()))?;
        debug!("Project generator finished in {:?}", output.elapsed);
        Ok(())
    }
}

impl<R: CommandRunner + Sync> ProjectGenerator for CommandProjectGenerator<R> {
    async fn sync_if_needed(
        &self,
        changed: &BTreeSet<String>,
        imported: &BTreeSet<String>,
        check_project_files: bool,
    ) -> Result<()> {
        match self.incremental_command(changed, imported, check_project_files) {
            Some(spec) => self.run(spec).await,
            None => {
                trace!("Nothing changed; skipping project generator");
                Ok(())
            }
        }
    }

    async fn sync(&self) -> Result<()> {
        self.run(self.full_command()).await
    }

    fn flags(&self) -> &GenerationFlags {
        &self.flags
    }

    fn toggle_flag(&mut self, flag: GenerationFlag) -> bool {
        self.flags.toggle(flag)
    }
}

/// Generator picked from `[generation]` settings.
#[derive(Debug, Clone)]
pub enum ConfiguredGenerator<R> {
    Null(NullProjectGenerator),
    Command(CommandProjectGenerator<R>),
}

impl<R: CommandRunner + Sync> ConfiguredGenerator<R> {
    /// An empty `command` selects the null generator.
    pub fn from_settings(settings: &GenerationSettings, project_root: &Path, runner: R) -> Self {
        match CommandProjectGenerator::new(
            settings.command.clone(),
            project_root.to_path_buf(),
            settings.timeout(),
            settings.flags.clone(),
            runner,
        ) {
            Some(generator) => Self::Command(generator),
            None => Self::Null(NullProjectGenerator::new(settings.flags.clone())),
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Command(_))
    }
}

impl<R: CommandRunner + Sync> ProjectGenerator for ConfiguredGenerator<R> {
    async fn sync_if_needed(
        &self,
        changed: &BTreeSet<String>,
        imported: &BTreeSet<String>,
        check_project_files: bool,
    ) -> Result<()> {
        match self {
            Self::Null(g) => {
                ProjectGenerator::sync_if_needed(g, changed, imported, check_project_files).await
            }
            Self::Command(g) => {
                ProjectGenerator::sync_if_needed(g, changed, imported, check_project_files).await
            }
        }
    }

    async fn sync(&self) -> Result<()> {
        match self {
            Self::Null(g) => ProjectGenerator::sync(g).await,
            Self::Command(g) => ProjectGenerator::sync(g).await,
        }
    }

    fn flags(&self) -> &GenerationFlags {
        match self {
            Self::Null(g) => ProjectGenerator::flags(g),
            Self::Command(g) => ProjectGenerator::flags(g),
        }
    }

    fn toggle_flag(&mut self, flag: GenerationFlag) -> bool {
        match self {
            Self::Null(g) => ProjectGenerator::toggle_flag(g, flag),
            Self::Command(g) => ProjectGenerator::toggle_flag(g, flag),
        }
    }
}
