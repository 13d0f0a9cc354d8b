//! Desktop editor entrypoint.

use std::path::PathBuf;

fn print_help() {
    println!("vtedit - virtual text editor for very large files");
    println!();
    println!("Usage: vtedit [FILE]");
    println!();
    println!("Shortcuts:");
    println!("  Ctrl+S          Save to the opened file");
    println!("  Ctrl+W          Toggle word wrap");
    println!("  Ctrl+Shift+T    Load the synthetic test document");
    println!("  Ctrl+Shift+D    Toggle dark theme");
    println!();
    println!("Environment:");
    println!("  RUST_LOG                  Log filter (default vtedit=warn,vtedit_core=info,vtedit_gui=info)");
    println!("  VTEDIT_TAB_WIDTH          Spaces per indent step (default 4)");
    println!("  VTEDIT_INDENT_WITH_TABS   Indent with a tab character");
    println!("  VTEDIT_WORD_WRAP          Start with word wrap enabled");
    println!("  VTEDIT_UNDO_MAX_OPS       Undo history length");
    println!("  VTEDIT_UNDO_MAX_BYTES     Undo history size budget");
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return;
    }
    let path = args.get(1).map(PathBuf::from);
    let exit_code = run_and_report(|| vtedit_gui::run(path));
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run_and_report<F, E>(runner: F) -> i32
where
    F: FnOnce() -> Result<(), E>,
    E: std::fmt::Display,
{
    match runner() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("vtedit error: {}", err);
            1
        }
    }
}
