use std::process::ExitCode;

mod cli;
mod config;
mod rotation;
mod scanner;
mod setter;
mod state;

// ============================================================================
// Windows Terminal ANSI Fix (Works in Admin Mode)
// ============================================================================
#[cfg(target_os = "windows")]
fn enable_ansi_support() {
    use windows::Win32::System::Console::*;

    unsafe {
        if let Ok(handle) = GetStdHandle(STD_OUTPUT_HANDLE) {
            let mut mode: CONSOLE_MODE = CONSOLE_MODE(0);
            if GetConsoleMode(handle, &mut mode).is_ok() {
                let new_mode = mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING;
                SetConsoleMode(handle, new_mode).ok();
            }
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn enable_ansi_support() {}

// ============================================================================
// Main Entry Point
// ============================================================================
fn main() -> ExitCode {
    enable_ansi_support();

    // Diagnostics only; user-facing output goes straight to the terminal
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    cli::run(std::env::args_os())
}
