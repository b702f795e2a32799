// UI layer: the interactive menu of the `drive-shell` binary, plus the
// console reporting shared by both binaries. Input is read with `dialoguer`,
// long operations show an `indicatif` spinner.

use crate::backup::{backup_home, BackupReport};
use crate::ops::{self, UnsafeShell};
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// One entry of the numbered menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Backup,
    RunCommand,
    ListDir,
    MakeDir,
    DeleteFile,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 6] = [
        MenuChoice::Backup,
        MenuChoice::RunCommand,
        MenuChoice::ListDir,
        MenuChoice::MakeDir,
        MenuChoice::DeleteFile,
        MenuChoice::Exit,
    ];

    /// Parse a line typed at the prompt. Only the menu numbers are accepted.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Backup),
            "2" => Some(MenuChoice::RunCommand),
            "3" => Some(MenuChoice::ListDir),
            "4" => Some(MenuChoice::MakeDir),
            "5" => Some(MenuChoice::DeleteFile),
            "6" => Some(MenuChoice::Exit),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::Backup => "Backup to cloud",
            MenuChoice::RunCommand => "Run shell command (unsafe)",
            MenuChoice::ListDir => "List directory",
            MenuChoice::MakeDir => "Create directory",
            MenuChoice::DeleteFile => "Delete file",
            MenuChoice::Exit => "Exit",
        }
    }
}

/// Render the menu text.
pub fn menu_text() -> String {
    let mut text = String::from("\n=== Drive Backup Shell ===\n");
    for (i, choice) in MenuChoice::ALL.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, choice.label()));
    }
    text
}

/// Main interactive loop. Blocks until the user picks "Exit". Errors from
/// an action are printed and the menu is shown again.
pub fn main_menu() -> Result<()> {
    loop {
        print!("{}", menu_text());
        let line: String = Input::new()
            .with_prompt("Enter your choice")
            .allow_empty(true)
            .interact_text()?;

        let choice = match MenuChoice::parse(&line) {
            Some(choice) => choice,
            None => {
                println!("{}", "Invalid choice. Please try again.".red());
                continue;
            }
        };
        if choice == MenuChoice::Exit {
            println!("Exiting...");
            break;
        }
        if let Err(e) = dispatch(choice) {
            println!("{} {:#}", "Error:".red(), e);
        }
    }
    Ok(())
}

fn dispatch(choice: MenuChoice) -> Result<()> {
    match choice {
        MenuChoice::Backup => run_backup_with_spinner(),
        MenuChoice::RunCommand => {
            let command = prompt("Command to execute")?;
            let out = UnsafeShell.run(&command).context("Failed to start command")?;
            if out.success {
                print!("{}", out.stdout);
            } else {
                println!("{}", "Command failed:".red());
                print!("{}", if out.stderr.is_empty() { &out.stdout } else { &out.stderr });
            }
            Ok(())
        }
        MenuChoice::ListDir => {
            let path = prompt_path("Directory to list")?;
            let entries = ops::list_dir(&path).with_context(|| format!("Cannot list {}", path.display()))?;
            println!("Contents of {}:", path.display());
            for name in entries {
                println!("  {}", name);
            }
            Ok(())
        }
        MenuChoice::MakeDir => {
            let path = prompt_path("Directory to create")?;
            ops::make_dir(&path).with_context(|| format!("Cannot create {}", path.display()))?;
            println!("{} {}", "Directory ready:".green(), path.display());
            Ok(())
        }
        MenuChoice::DeleteFile => {
            let path = prompt_path("File to delete")?;
            ops::delete_file(&path).with_context(|| format!("Cannot delete {}", path.display()))?;
            println!("{} {}", "Deleted:".green(), path.display());
            Ok(())
        }
        MenuChoice::Exit => Ok(()),
    }
}

fn prompt(label: &str) -> Result<String> {
    Ok(Input::new().with_prompt(label).interact_text()?)
}

fn prompt_path(label: &str) -> Result<PathBuf> {
    prompt(label).map(PathBuf::from)
}

/// Spinner shown while files are uploading.
pub fn upload_spinner() -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} [{pos} files] {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));
    Ok(spinner)
}

/// Run the production backup and print its summary.
pub fn run_backup_with_spinner() -> Result<()> {
    let spinner = upload_spinner()?;
    let result = backup_home(&spinner);
    spinner.finish_and_clear();
    let report = result.context("Error during backup")?;
    print_summary(&report);
    Ok(())
}

/// Summary text for a finished run.
pub fn summary_text(report: &BackupReport) -> String {
    let mut text = format!(
        "{} of {} files uploaded from {}",
        report.uploaded_count(),
        report.attempted(),
        report.root.display()
    );
    if report.failed_count() > 0 {
        text.push_str(&format!(", {} failed", report.failed_count()));
    }
    if !report.walk_errors.is_empty() {
        text.push_str(&format!(", {} entries unreadable", report.walk_errors.len()));
    }
    text
}

pub fn print_summary(report: &BackupReport) {
    for outcome in report.failed() {
        if let Err(e) = &outcome.result {
            println!("{} {}: {}", "Failed:".red(), outcome.path.display(), e);
        }
    }
    println!("{}", summary_text(report));
    println!("{}", "Backup completed successfully.".green());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::{RemoteFile, UploadOutcome};
    use crate::error::BackupError;

    #[test]
    fn test_parse_menu_numbers() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Backup));
        assert_eq!(MenuChoice::parse(" 2\n"), Some(MenuChoice::RunCommand));
        assert_eq!(MenuChoice::parse("6"), Some(MenuChoice::Exit));
    }

    #[test]
    fn test_parse_rejects_anything_else() {
        for input in ["", "0", "7", "exit", "1 2", "-1"] {
            assert_eq!(MenuChoice::parse(input), None, "{input:?}");
        }
    }

    #[test]
    fn test_menu_lists_every_choice_in_order() {
        let text = menu_text();
        for (i, choice) in MenuChoice::ALL.iter().enumerate() {
            let line = format!("{}. {}", i + 1, choice.label());
            assert!(text.contains(&line), "missing {line}");
            assert_eq!(MenuChoice::parse(&(i + 1).to_string()), Some(*choice));
        }
    }

    #[test]
    fn test_summary_counts_failures() {
        let report = BackupReport {
            root: PathBuf::from("/home"),
            outcomes: vec![
                UploadOutcome {
                    path: PathBuf::from("/home/a.txt"),
                    name: "a.txt".into(),
                    result: Ok(RemoteFile {
                        id: "1".into(),
                        name: "a.txt".into(),
                    }),
                },
                UploadOutcome {
                    path: PathBuf::from("/home/sub/b.txt"),
                    name: "b.txt".into(),
                    result: Err(BackupError::Http {
                        status: 500,
                        body: "boom".into(),
                    }),
                },
            ],
            walk_errors: vec![],
        };
        assert_eq!(summary_text(&report), "1 of 2 files uploaded from /home, 1 failed");
    }
}
