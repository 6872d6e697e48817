// ============================================================================
// Command Line Shell
// ============================================================================
// Flag parsing, banner/usage/list/status views, and the glue that runs one
// scan -> load -> rotate -> apply -> save pass.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use colored::*;

use crate::config::Config;
use crate::rotation::{self, RotationError, RotationOutcome};
use crate::scanner;
use crate::setter::WallpaperSetter;
use crate::state::{StateStore, WallpaperState};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BOX_WIDTH: usize = 40;

#[derive(Parser, Debug, Default, Clone, PartialEq)]
#[command(
    name = "wallcycle",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct Args {
    /// Change wallpaper now, even inside the 24h window
    #[arg(long)]
    pub force: bool,

    /// Pick a random wallpaper
    #[arg(long)]
    pub random: bool,

    /// Skip to the next wallpaper
    #[arg(long)]
    pub next: bool,

    /// List all available wallpapers
    #[arg(long)]
    pub list: bool,

    /// Show current status
    #[arg(long)]
    pub status: bool,

    /// Wallpaper folder to use instead of the default
    #[arg(long, value_name = "PATH", env = "WALLCYCLE_DIR")]
    pub dir: Option<PathBuf>,

    /// Show usage
    #[arg(short = 'h', long)]
    pub help: bool,
}

/// What a single run does, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    List,
    Status,
    Random,
    Next,
    Daily { force: bool },
}

impl From<&Args> for Mode {
    fn from(args: &Args) -> Self {
        if args.list {
            Mode::List
        } else if args.status {
            Mode::Status
        } else if args.random {
            Mode::Random
        } else if args.next {
            Mode::Next
        } else {
            Mode::Daily { force: args.force }
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Parsed {
    Run(Args),
    Help(Args),
    Invalid { message: String },
}

/// Parse command line arguments (first item is the program name)
pub fn parse<I, T>(args: I) -> Parsed
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(args) {
        Ok(args) if args.help => Parsed::Help(args),
        Ok(args) => Parsed::Run(args),
        Err(e) => Parsed::Invalid {
            message: describe_parse_error(&e),
        },
    }
}

fn describe_parse_error(e: &clap::Error) -> String {
    let arg = match e.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => arg.clone(),
        Some(other) => other.to_string(),
        None => return format!("Invalid arguments: {}", e.kind()),
    };

    match e.kind() {
        ErrorKind::UnknownArgument => format!("Unknown option: {}", arg),
        kind => format!("Invalid option {}: {}", arg, kind),
    }
}

/// Entry point used by `main`
pub fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    print_banner();

    match parse(args) {
        Parsed::Help(args) => {
            print_usage(&Config::resolve(args.dir));
            ExitCode::SUCCESS
        }
        Parsed::Invalid { message } => {
            eprintln!("{}", format!("[ ERROR ] {}", message).red());
            println!();
            print_usage(&Config::resolve(None));
            ExitCode::FAILURE
        }
        Parsed::Run(args) => {
            let mode = Mode::from(&args);
            let cli = WallpaperCli::new(Config::resolve(args.dir), crate::setter::detect());
            cli.execute(mode, chrono::Utc::now().timestamp())
        }
    }
}

// ============================================================================
// Main Application
// ============================================================================
pub struct WallpaperCli {
    config: Config,
    store: StateStore,
    setter: Box<dyn WallpaperSetter>,
}

impl WallpaperCli {
    pub fn new(config: Config, setter: Box<dyn WallpaperSetter>) -> Self {
        let store = StateStore::new(config.state_file.clone());
        WallpaperCli {
            config,
            store,
            setter,
        }
    }

    /// One full pass. Returns the process exit code.
    pub fn execute(&self, mode: Mode, now: i64) -> ExitCode {
        log::debug!("Mode {:?}, config {:?}", mode, self.config);

        let dir = &self.config.wallpaper_dir;
        if !dir.exists() {
            self.create_missing_dir(dir);
            return ExitCode::FAILURE;
        }

        let wallpapers = self.collect_wallpapers();
        if wallpapers.is_empty() {
            eprintln!("{}", format!("✗ No wallpapers found in {}", dir.display()).red());
            eprintln!("{}", "  Add some images (.jpg, .png, .bmp) and try again.".cyan());
            return ExitCode::FAILURE;
        }

        let mut state = self.store.load();
        if self.store.path().exists() {
            println!(
                "{}",
                format!("✓ State loaded: Index {}/{}", state.wallpaper_index, state.total_wallpapers).green()
            );
        }

        match mode {
            Mode::List => {
                self.show_list(&wallpapers, &state);
                return ExitCode::SUCCESS;
            }
            Mode::Status => {
                self.show_status(wallpapers.len(), &state, now);
                return ExitCode::SUCCESS;
            }
            Mode::Random => {
                println!("\n{}", "🎲 Random Mode".cyan().bold());
                let mut rng = rand::rng();
                let result = rotation::pick_random(&wallpapers, &mut state, now, &mut rng, self.setter.as_ref(), &self.store);
                self.report(result, "🎲 Random");
            }
            Mode::Next => {
                println!("\n{}", "⏭️  Next Wallpaper".cyan().bold());
                let result = rotation::rotate(&wallpapers, &mut state, true, now, self.setter.as_ref(), &self.store);
                self.report(result, "📊 Progress");
            }
            Mode::Daily { force } => {
                println!("\n{}", "🔄 Daily Rotation".cyan().bold());
                let result = rotation::rotate(&wallpapers, &mut state, force, now, self.setter.as_ref(), &self.store);
                self.report(result, "📊 Progress");
            }
        }

        println!("\n{}", "✓ Done!".green().bold());
        ExitCode::SUCCESS
    }

    fn create_missing_dir(&self, dir: &Path) {
        eprintln!("{}", format!("✗ Wallpaper directory not found: {}", dir.display()).red());
        eprintln!("{}", "  Creating directory...".cyan());

        match fs::create_dir_all(dir) {
            Ok(()) => eprintln!("{}", "✓ Directory created. Add wallpapers and run again.".green()),
            Err(e) => eprintln!("{}", format!("✗ Could not create directory: {}", e).red()),
        }
    }

    fn collect_wallpapers(&self) -> Vec<PathBuf> {
        println!("{}", format!("📁 Scanning: {}", self.config.wallpaper_dir.display()).cyan());

        match scanner::scan(&self.config.wallpaper_dir) {
            Ok(wallpapers) => {
                println!("{}", format!("✓ Found {} wallpapers", wallpapers.len()).green());
                wallpapers
            }
            Err(e) => {
                eprintln!("{}", format!("✗ Error: {}", e).red());
                Vec::new()
            }
        }
    }

    fn report(&self, result: Result<RotationOutcome, RotationError>, progress_label: &str) {
        match result {
            Err(e) => eprintln!("{}", format!("✗ {}", e).red()),
            Ok(RotationOutcome::NotDue { hours_remaining, current }) => {
                println!("{}", format!("⏰ Next change in ~{} hours", hours_remaining).cyan());
                println!("{}", format!("📍 Current: {}", current).cyan());
            }
            Ok(RotationOutcome::Changed { index, total, path, applied, saved }) => {
                println!("{}", format!("🖼️  Setting wallpaper ({})...", self.setter.name()).cyan());
                match applied {
                    Ok(()) => println!("{}", "✓ Wallpaper set successfully!".green()),
                    Err(e) => eprintln!("{}", format!("✗ Failed to set wallpaper: {}", e).red()),
                }
                println!("{}", format!("📍 Current: {}", path.display()).cyan());

                if let Err(e) = saved {
                    eprintln!("{}", format!("⚠ Warning: {}", e).yellow());
                }

                println!("{}", format!("{}: {}/{}", progress_label, index + 1, total).bright_cyan());
            }
        }
    }

    fn show_list(&self, wallpapers: &[PathBuf], state: &WallpaperState) {
        println!();
        println!("{}", "📋 Available Wallpapers:".cyan().bold());
        println!("{}", rule().cyan());
        for line in list_lines(wallpapers, state) {
            if line.ends_with(CURRENT_MARKER) {
                println!("{}", line.green().bold());
            } else {
                println!("{}", line);
            }
        }
        println!("{}", rule().cyan());
    }

    fn show_status(&self, count: usize, state: &WallpaperState, now: i64) {
        println!();
        println!("{}", "📊 Current Status:".cyan().bold());
        println!("{}", rule().cyan());
        for line in status_lines(count, state, now) {
            println!("{}", line.cyan());
        }
        println!("{}", rule().cyan());
    }
}

// ============================================================================
// Views
// ============================================================================
const CURRENT_MARKER: &str = " [CURRENT]";

fn rule() -> String {
    "─".repeat(BOX_WIDTH)
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

/// `  1. name` lines, with the stored index marked
pub fn list_lines(wallpapers: &[PathBuf], state: &WallpaperState) -> Vec<String> {
    wallpapers
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_else(|| path.to_string_lossy());
            let marker = if i == state.wallpaper_index { CURRENT_MARKER } else { "" };
            format!("{:3}. {}{}", i + 1, name, marker)
        })
        .collect()
}

pub fn status_lines(count: usize, state: &WallpaperState, now: i64) -> Vec<String> {
    let mut lines = vec![
        format!("Total wallpapers: {}", count),
        format!("Current index: {}/{}", state.wallpaper_index.saturating_add(1), count),
    ];

    if state.last_change_time > 0 {
        let hours_until = rotation::hours_until_next_change(state, now).max(0);
        lines.push(format!("Last changed: {} hours ago", rotation::hours_since_last_change(state, now)));
        lines.push(format!("Next change: in ~{} hours", hours_until));
        lines.push(format!("Current: {}", file_name(&state.last_wallpaper)));
    } else {
        lines.push("Status: Never changed".to_string());
    }

    lines
}

// Helper function to center text in box headers
fn center_text(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len >= width {
        return text.to_string();
    }
    let padding = width - text_len;
    let left_pad = padding / 2;
    let right_pad = padding - left_pad;
    format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
}

fn print_banner() {
    let border = format!("+{}+", "-".repeat(BOX_WIDTH + 2));
    println!();
    println!("{}", border.cyan());
    println!("{}", format!("| {} |", center_text(&format!("Daily Wallpaper Changer v{}", VERSION), BOX_WIDTH)).cyan().bold());
    println!("{}", format!("| {} |", center_text("Cross-Platform Wallpaper Manager", BOX_WIDTH)).cyan());
    println!("{}", border.cyan());
    println!();
}

pub fn print_usage(config: &Config) {
    println!("{}", "Usage: wallcycle [options]".green().bold());
    println!();
    println!("{}", "Options:".green());
    println!("{}", "  (no args)     Change wallpaper if 24h elapsed (default)".cyan());
    println!("{}", "  --force       Force change wallpaper now".cyan());
    println!("{}", "  --random      Set random wallpaper".cyan());
    println!("{}", "  --next        Skip to next wallpaper".cyan());
    println!("{}", "  --list        List all available wallpapers".cyan());
    println!("{}", "  --status      Show current status".cyan());
    println!("{}", "  --dir <PATH>  Use another wallpaper folder (or WALLCYCLE_DIR)".cyan());
    println!("{}", "  --help, -h    Show this help message".cyan());
    println!();
    println!("{}", "Examples:".green());
    println!("{}", "  wallcycle                 # Daily auto-rotation".cyan());
    println!("{}", "  wallcycle --force         # Change now".cyan());
    println!("{}", "  wallcycle --random        # Pick random wallpaper".cyan());
    println!();
    println!("{}", "Setup:".green());
    println!("{}", format!("  1. Create folder: {}", config.wallpaper_dir.display()).cyan());
    println!("{}", "  2. Add wallpapers (jpg, png, bmp, etc.)".cyan());
    println!("{}", "  3. Run this program daily (cron/Task Scheduler)".cyan());
    if let Some(path) = crate::config::config_file_path() {
        println!("{}", format!("  Folder can also be set in {}", path.display()).white().dimmed());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setter::{ApplyError, Unsupported};
    use tempfile::TempDir;

    const NOW: i64 = 1_750_000_000;

    struct OkSetter;

    impl WallpaperSetter for OkSetter {
        fn name(&self) -> &str {
            "ok"
        }

        fn apply(&self, _image_path: &Path) -> Result<(), ApplyError> {
            Ok(())
        }
    }

    fn cli_for(dir: &Path, setter: Box<dyn WallpaperSetter>) -> WallpaperCli {
        WallpaperCli::new(Config::from_sources(None, Some(dir.to_path_buf())), setter)
    }

    fn fill(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"img").unwrap();
        }
    }

    #[test]
    fn test_parse_flags() {
        let Parsed::Run(args) = parse(["wallcycle", "--force", "--status"]) else {
            panic!("expected Run");
        };
        assert!(args.force);
        assert!(args.status);
        assert!(!args.random);
    }

    #[test]
    fn test_parse_help() {
        assert!(matches!(parse(["wallcycle", "--help"]), Parsed::Help(_)));
        assert!(matches!(parse(["wallcycle", "-h"]), Parsed::Help(_)));
    }

    #[test]
    fn test_parse_unknown_flag() {
        match parse(["wallcycle", "--bogus"]) {
            Parsed::Invalid { message } => assert!(message.contains("--bogus"), "{}", message),
            other => panic!("expected Invalid, got {:?}", other),
        }
        assert!(matches!(parse(["wallcycle", "stray"]), Parsed::Invalid { .. }));
    }

    #[test]
    fn test_repeated_flags_are_accepted() {
        let Parsed::Run(args) = parse(["wallcycle", "--force", "--force", "--list", "--list"]) else {
            panic!("expected Run");
        };
        assert!(args.force);
        assert!(args.list);
    }

    #[test]
    fn test_run_exit_codes_for_help_and_bad_flags() {
        assert_eq!(run(["wallcycle", "-h"]), ExitCode::SUCCESS);
        assert_eq!(run(["wallcycle", "--help"]), ExitCode::SUCCESS);
        assert_eq!(run(["wallcycle", "--bogus"]), ExitCode::FAILURE);
        assert_eq!(run(["wallcycle", "stray"]), ExitCode::FAILURE);
    }

    #[test]
    fn test_mode_precedence() {
        let all = Args {
            force: true,
            random: true,
            next: true,
            list: true,
            status: true,
            ..Args::default()
        };
        assert_eq!(Mode::from(&all), Mode::List);
        assert_eq!(Mode::from(&Args { list: false, ..all.clone() }), Mode::Status);
        assert_eq!(Mode::from(&Args { random: true, ..Args::default() }), Mode::Random);
        assert_eq!(Mode::from(&Args { next: true, force: true, ..Args::default() }), Mode::Next);
        assert_eq!(Mode::from(&Args { force: true, ..Args::default() }), Mode::Daily { force: true });
        assert_eq!(Mode::from(&Args::default()), Mode::Daily { force: false });
    }

    #[test]
    fn test_list_lines_mark_current() {
        let walls = vec![PathBuf::from("/w/a.jpg"), PathBuf::from("/w/b.png")];
        let state = WallpaperState { wallpaper_index: 1, ..WallpaperState::default() };

        assert_eq!(list_lines(&walls, &state), vec!["  1. a.jpg".to_string(), "  2. b.png [CURRENT]".to_string()]);
    }

    #[test]
    fn test_status_lines_never_changed() {
        let lines = status_lines(4, &WallpaperState::default(), NOW);
        assert_eq!(lines, vec!["Total wallpapers: 4", "Current index: 1/4", "Status: Never changed"]);
    }

    #[test]
    fn test_status_lines_with_huge_index() {
        let state = WallpaperState {
            last_change_time: NOW - 3600,
            wallpaper_index: usize::MAX,
            total_wallpapers: 3,
            last_wallpaper: "/w/a.jpg".to_string(),
        };

        let lines = status_lines(3, &state, NOW);
        assert_eq!(lines[1], format!("Current index: {}/3", usize::MAX));

        let future = WallpaperState { last_change_time: i64::MAX, ..state };
        assert_eq!(status_lines(3, &future, i64::MIN).len(), 5);
    }

    #[test]
    fn test_status_lines_clamp_overdue() {
        let state = WallpaperState {
            last_change_time: NOW - 30 * 3600,
            wallpaper_index: 2,
            total_wallpapers: 3,
            last_wallpaper: "/w/c.jpg".to_string(),
        };

        let lines = status_lines(3, &state, NOW);
        assert_eq!(lines[1], "Current index: 3/3");
        assert_eq!(lines[2], "Last changed: 30 hours ago");
        assert_eq!(lines[3], "Next change: in ~0 hours");
        assert_eq!(lines[4], "Current: c.jpg");
    }

    #[test]
    fn test_missing_dir_is_created_and_fails() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("Wallpapers");
        let cli = cli_for(&dir, Box::new(OkSetter));

        assert_eq!(cli.execute(Mode::Daily { force: false }, NOW), ExitCode::FAILURE);
        assert!(dir.is_dir());
    }

    #[test]
    fn test_empty_dir_fails_before_list() {
        let tmp = TempDir::new().unwrap();
        fill(tmp.path(), &["notes.txt"]);
        let cli = cli_for(tmp.path(), Box::new(OkSetter));

        assert_eq!(cli.execute(Mode::List, NOW), ExitCode::FAILURE);
        assert!(!tmp.path().join(".wallpaper_state").exists());
    }

    #[test]
    fn test_daily_run_persists_state() {
        let tmp = TempDir::new().unwrap();
        fill(tmp.path(), &["a.jpg", "b.jpg", "c.jpg"]);
        let cli = cli_for(tmp.path(), Box::new(OkSetter));

        assert_eq!(cli.execute(Mode::Daily { force: false }, NOW), ExitCode::SUCCESS);

        let state = StateStore::new(tmp.path().join(".wallpaper_state")).load();
        assert_eq!(state.wallpaper_index, 1);
        assert_eq!(state.total_wallpapers, 3);
        assert_eq!(state.last_change_time, NOW);
    }

    #[test]
    fn test_unsupported_setter_still_succeeds_and_saves() {
        let tmp = TempDir::new().unwrap();
        fill(tmp.path(), &["a.jpg", "b.jpg"]);
        let cli = cli_for(tmp.path(), Box::new(Unsupported::new("headless")));

        assert_eq!(cli.execute(Mode::Next, NOW), ExitCode::SUCCESS);
        assert_eq!(StateStore::new(tmp.path().join(".wallpaper_state")).load().last_change_time, NOW);
    }

    #[test]
    fn test_status_and_list_do_not_write_state() {
        let tmp = TempDir::new().unwrap();
        fill(tmp.path(), &["a.jpg"]);
        let cli = cli_for(tmp.path(), Box::new(OkSetter));

        assert_eq!(cli.execute(Mode::Status, NOW), ExitCode::SUCCESS);
        assert_eq!(cli.execute(Mode::List, NOW), ExitCode::SUCCESS);
        assert!(!tmp.path().join(".wallpaper_state").exists());
    }

    #[test]
    fn test_center_text() {
        assert_eq!(center_text("ab", 6), "  ab  ");
        assert_eq!(center_text("abc", 6), " abc  ");
        assert_eq!(center_text("toolong", 3), "toolong");
    }
}
