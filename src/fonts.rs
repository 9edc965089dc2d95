//! Per-user font installation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{FontFile, FontProfile, REGISTRY_FONTS_KEY};
use crate::runner::{command_line, CommandRunner};
use crate::EditorFontError;

const RETRY_DELAY: Duration = Duration::from_millis(100);

/// The result of [`FontInstaller::install`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The fonts were already present and a reinstall was not forced
    AlreadyInstalled,
    /// The fonts were copied and found in the font directory afterwards
    Installed {
        /// Installed font files
        fonts: Vec<PathBuf>,
    },
    /// The fonts were copied but could not be found afterwards; signing out
    /// and back in usually resolves this
    Unverified {
        /// Font files that were copied
        fonts: Vec<PathBuf>,
    },
}

/// Copies a profile's fonts into the user font directory and registers them
pub struct FontInstaller<'a, R: CommandRunner> {
    runner: &'a R,
    profile: &'a FontProfile,
    fonts_dir: PathBuf,
    source_dir: PathBuf,
}

impl<'a, R: CommandRunner> FontInstaller<'a, R> {
    /// Create an installer reading fonts from `source_dir` and installing
    /// them into `fonts_dir`
    pub fn new(
        runner: &'a R,
        profile: &'a FontProfile,
        fonts_dir: impl Into<PathBuf>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        FontInstaller {
            runner,
            profile,
            fonts_dir: fonts_dir.into(),
            source_dir: source_dir.into(),
        }
    }

    fn destination(&self, font: &FontFile) -> PathBuf {
        self.fonts_dir.join(&font.file_name)
    }

    /// Whether any of the profile's fonts is present in the font directory
    pub fn is_installed(&self) -> bool {
        self.profile
            .fonts
            .iter()
            .any(|font| self.destination(font).is_file())
    }

    /// Copy and register the profile's fonts
    ///
    /// Does nothing if the fonts are already installed, unless `force` is set.
    pub fn install(&self, force: bool) -> Result<InstallOutcome, EditorFontError> {
        if !force && self.is_installed() {
            log::info!("Fonts already installed in {}", self.fonts_dir.display());
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        let mut found = vec![];
        let mut searched = vec![];
        for font in &self.profile.fonts {
            let source = self.source_dir.join(&font.source);
            if source.is_file() {
                found.push((font, source));
            } else {
                log::warn!("Font {} not found", source.display());
                searched.push(source);
            }
        }
        if found.is_empty() {
            return Err(EditorFontError::FontsNotFound { searched });
        }

        std::fs::create_dir_all(&self.fonts_dir)?;
        let mut installed = vec![];
        for (font, source) in found {
            let destination = self.destination(font);
            log::info!("Installing {}", destination.display());
            replace_file(&source, &destination)?;
            if self.profile.register_fonts {
                let args = vec![
                    "add".to_string(),
                    REGISTRY_FONTS_KEY.to_string(),
                    "/v".to_string(),
                    font.registry_name.clone(),
                    "/t".to_string(),
                    "REG_SZ".to_string(),
                    "/d".to_string(),
                    destination.display().to_string(),
                    "/f".to_string(),
                ];
                self.runner.run("reg", &args)?.check("reg", &args)?;
            }
            installed.push(destination);
        }

        if self.is_installed() {
            Ok(InstallOutcome::Installed { fonts: installed })
        } else {
            log::warn!("Fonts copied but verification failed");
            Ok(InstallOutcome::Unverified { fonts: installed })
        }
    }

    /// Delete the profile's fonts and their registrations
    ///
    /// Returns the font files that were deleted. A registration that is
    /// already gone is not an error.
    pub fn uninstall(&self) -> Result<Vec<PathBuf>, EditorFontError> {
        let mut removed = vec![];
        for font in &self.profile.fonts {
            let destination = self.destination(font);
            if destination.is_file() {
                log::info!("Deleting {}", destination.display());
                std::fs::remove_file(&destination)?;
                removed.push(destination);
            }
            if self.profile.register_fonts {
                let args = vec![
                    "delete".to_string(),
                    REGISTRY_FONTS_KEY.to_string(),
                    "/v".to_string(),
                    font.registry_name.clone(),
                    "/f".to_string(),
                ];
                let output = self.runner.run("reg", &args)?;
                if !output.success {
                    log::warn!(
                        "`{}` exited with {:?}",
                        command_line("reg", &args),
                        output.code
                    );
                }
            }
        }
        Ok(removed)
    }
}

/// Copy `source` over `destination`, deleting the old file first
///
/// A font that is in use cannot be deleted on Windows; the delete is retried
/// once after a short pause before giving up.
fn replace_file(source: &Path, destination: &Path) -> Result<(), EditorFontError> {
    if destination.exists() {
        if let Err(e) = std::fs::remove_file(destination) {
            log::debug!("Could not delete {}: {}, retrying", destination.display(), e);
            std::thread::sleep(RETRY_DELAY);
            std::fs::remove_file(destination).map_err(|_| EditorFontError::FileInUse {
                path: destination.to_path_buf(),
            })?;
        }
    }
    std::fs::copy(source, destination)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::runner::CommandOutput;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<Vec<String>>>,
        fail: bool,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, EditorFontError> {
            let mut call = vec![program.to_string()];
            call.extend(args.iter().cloned());
            self.calls.borrow_mut().push(call);
            Ok(CommandOutput {
                success: !self.fail,
                code: Some(if self.fail { 1 } else { 0 }),
                output: String::new(),
            })
        }
    }

    fn profile(register: bool) -> FontProfile {
        FontProfile {
            register_fonts: register,
            ..Default::default()
        }
    }

    fn write_sources(dir: &Path) {
        for font in FontProfile::default().fonts {
            let path = dir.join(&font.source);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, font.file_name.as_bytes()).unwrap();
        }
    }

    #[test]
    fn test_install_registers_each_font() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let fonts_dir = target.path().join("Fonts");
        write_sources(source.path());
        let runner = RecordingRunner::default();
        let profile = profile(true);
        let installer = FontInstaller::new(&runner, &profile, &fonts_dir, source.path());

        let outcome = installer.install(false).unwrap();
        let ttc = fonts_dir.join("Monocraft-nerd-fonts-patched.ttc");
        let ttf = fonts_dir.join("Monocraft.ttf");
        assert_eq!(
            outcome,
            InstallOutcome::Installed {
                fonts: vec![ttc.clone(), ttf.clone()]
            }
        );
        assert_eq!(std::fs::read_to_string(&ttf).unwrap(), "Monocraft.ttf");

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1],
            vec![
                "reg".to_string(),
                "add".to_string(),
                REGISTRY_FONTS_KEY.to_string(),
                "/v".to_string(),
                "Monocraft".to_string(),
                "/t".to_string(),
                "REG_SZ".to_string(),
                "/d".to_string(),
                ttf.display().to_string(),
                "/f".to_string(),
            ]
        );
    }

    #[test]
    fn test_already_installed() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        std::fs::write(target.path().join("Monocraft.ttf"), "old").unwrap();
        let runner = RecordingRunner::default();
        let profile = profile(true);
        let installer = FontInstaller::new(&runner, &profile, target.path(), source.path());

        assert_eq!(
            installer.install(false).unwrap(),
            InstallOutcome::AlreadyInstalled
        );
        assert!(runner.calls.borrow().is_empty());

        write_sources(source.path());
        assert!(matches!(
            installer.install(true).unwrap(),
            InstallOutcome::Installed { .. }
        ));
        assert_eq!(
            std::fs::read_to_string(target.path().join("Monocraft.ttf")).unwrap(),
            "Monocraft.ttf"
        );
    }

    #[test]
    fn test_missing_sources() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::default();
        let profile = profile(false);
        let installer = FontInstaller::new(&runner, &profile, target.path(), source.path());
        match installer.install(false) {
            Err(EditorFontError::FontsNotFound { searched }) => assert_eq!(searched.len(), 2),
            other => panic!("Expected FontsNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_registration() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        write_sources(source.path());
        let runner = RecordingRunner {
            fail: true,
            ..Default::default()
        };
        let profile = profile(true);
        let installer = FontInstaller::new(&runner, &profile, target.path(), source.path());
        assert!(matches!(
            installer.install(false),
            Err(EditorFontError::CommandFailed { code: Some(1), .. })
        ));
    }

    #[test]
    fn test_uninstall_tolerates_missing_registration() {
        let target = tempfile::tempdir().unwrap();
        std::fs::write(target.path().join("Monocraft.ttf"), "font").unwrap();
        let runner = RecordingRunner {
            fail: true,
            ..Default::default()
        };
        let profile = profile(true);
        let installer = FontInstaller::new(&runner, &profile, target.path(), "unused");

        let removed = installer.uninstall().unwrap();
        assert_eq!(removed, vec![target.path().join("Monocraft.ttf")]);
        assert!(!installer.is_installed());
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0][1], "delete");
        assert_eq!(calls[0][4], "Monocraft Nerd Font (TrueType)");
    }

    #[test]
    fn test_replace_file_in_use() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("font.ttf");
        std::fs::write(&source, "font").unwrap();
        // A directory cannot be removed with remove_file, like a locked font.
        let destination = dir.path().join("busy.ttf");
        std::fs::create_dir(&destination).unwrap();
        assert!(matches!(
            replace_file(&source, &destination),
            Err(EditorFontError::FileInUse { .. })
        ));
    }
}
