//! Hand-off of files to external programs.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

/// What to do with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchAction {
    Open,
    Edit,
    Print,
}

impl fmt::Display for LaunchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LaunchAction::Open => "open",
            LaunchAction::Edit => "edit",
            LaunchAction::Print => "print",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no program available to {0} files")]
    Unsupported(LaunchAction),

    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Opens, edits and prints files with whatever the platform provides.
pub trait Launcher {
    fn is_supported(&self, action: LaunchAction) -> bool;
    fn open(&self, path: &Path) -> Result<(), LaunchError>;
    fn edit(&self, path: &Path) -> Result<(), LaunchError>;
    fn print(&self, path: &Path) -> Result<(), LaunchError>;

    fn launch(&self, action: LaunchAction, path: &Path) -> Result<(), LaunchError> {
        match action {
            LaunchAction::Open => self.open(path),
            LaunchAction::Edit => self.edit(path),
            LaunchAction::Print => self.print(path),
        }
    }
}

/// A resolved program plus the leading arguments from its command line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Program {
    path: PathBuf,
    args: Vec<String>,
}

impl Program {
    /// Resolve a shell-style command line (`code --wait`) against `$PATH`.
    fn resolve(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let name = parts.next()?;
        match which::which(name) {
            Ok(path) => Some(Self {
                path,
                args: parts.map(str::to_string).collect(),
            }),
            Err(e) => {
                tracing::debug!("{} not found: {}", name, e);
                None
            }
        }
    }

    fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}

/// Default [`Launcher`].
///
/// Open goes to the desktop's default handler. Edit runs `$VISUAL` (or
/// `$EDITOR`) in the foreground with the terminal inherited, so the caller has
/// to give up the screen first. Print sends the file to `lp`.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    editor: Option<Program>,
    printer: Option<Program>,
}

impl SystemLauncher {
    pub fn from_env() -> Self {
        let editor = ["VISUAL", "EDITOR"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find_map(|cmd| Program::resolve(&cmd));
        let printer = Program::resolve("lp");
        tracing::debug!(
            "launcher: editor={:?} printer={:?}",
            editor.as_ref().map(|p| &p.path),
            printer.as_ref().map(|p| &p.path)
        );
        Self { editor, printer }
    }

    fn run(program: &Program, path: &Path, inherit_stdio: bool) -> Result<(), LaunchError> {
        let mut command = Command::new(&program.path);
        command.args(&program.args).arg(path);
        if !inherit_stdio {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }
        let status = command.status()?;
        if status.success() {
            Ok(())
        } else {
            Err(LaunchError::Failed {
                program: program.display_name(),
                status: status.to_string(),
            })
        }
    }
}

impl Launcher for SystemLauncher {
    fn is_supported(&self, action: LaunchAction) -> bool {
        match action {
            LaunchAction::Open => true,
            LaunchAction::Edit => self.editor.is_some(),
            LaunchAction::Print => self.printer.is_some(),
        }
    }

    fn open(&self, path: &Path) -> Result<(), LaunchError> {
        open::that_detached(path)?;
        Ok(())
    }

    fn edit(&self, path: &Path) -> Result<(), LaunchError> {
        let editor = self
            .editor
            .as_ref()
            .ok_or(LaunchError::Unsupported(LaunchAction::Edit))?;
        Self::run(editor, path, true)
    }

    fn print(&self, path: &Path) -> Result<(), LaunchError> {
        let printer = self
            .printer
            .as_ref()
            .ok_or(LaunchError::Unsupported(LaunchAction::Print))?;
        Self::run(printer, path, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names() {
        assert_eq!(LaunchAction::Open.to_string(), "open");
        assert_eq!(LaunchAction::Edit.to_string(), "edit");
        assert_eq!(LaunchAction::Print.to_string(), "print");
    }

    #[test]
    fn resolve_missing_program() {
        assert!(Program::resolve("definitely-not-a-real-program-xyz").is_none());
        assert!(Program::resolve("   ").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn resolve_keeps_arguments() {
        let program = Program::resolve("sh -c true").unwrap();
        assert_eq!(program.display_name(), "sh");
        assert_eq!(program.args, vec!["-c", "true"]);
    }

    #[test]
    fn unresolved_actions_are_unsupported() {
        let launcher = SystemLauncher {
            editor: None,
            printer: None,
        };
        assert!(launcher.is_supported(LaunchAction::Open));
        assert!(!launcher.is_supported(LaunchAction::Edit));
        assert!(!launcher.is_supported(LaunchAction::Print));
        assert!(matches!(
            launcher.edit(Path::new("/tmp/x")),
            Err(LaunchError::Unsupported(LaunchAction::Edit))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_reports_status() {
        let launcher = SystemLauncher {
            editor: None,
            printer: Program::resolve("false"),
        };
        let err = launcher.print(Path::new("/tmp/x")).unwrap_err();
        assert!(matches!(err, LaunchError::Failed { ref program, .. } if program == "false"));
    }

    #[cfg(unix)]
    #[test]
    fn succeeding_program_is_ok() {
        let launcher = SystemLauncher {
            editor: None,
            printer: Program::resolve("true"),
        };
        assert!(launcher.print(Path::new("/tmp/x")).is_ok());
    }
}
