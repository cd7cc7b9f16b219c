//! # browser-wipe CLI
//!
//! Clears the cache and the private data of a browser profile, keeping
//! bookmarks, extensions and settings.
//!
//! ## Quick Start
//!
//! ```bash
//! # Which browsers and profiles are there?
//! browser-wipe --scan
//!
//! # See what would be removed from a Chromium profile
//! browser-wipe -b chromium -n 'Profile 1' --dry
//!
//! # Clear only the cache of the default Firefox profile
//! browser-wipe -b firefox -n default-esr -c
//! ```
//!
//! ## Environment Variables
//!
//! Every option can also be set through a `BROWSER_WIPE_*` variable, e.g.
//! `BROWSER_WIPE_BROWSER`, `BROWSER_WIPE_NAME` or `BROWSER_WIPE_DRY`.
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 1    | profile name missing |
//! | 2    | unsupported browser |
//! | 3    | cleaner could not be set up |
//! | 4    | invalid size mode |
//! | 40   | empty profile name |
//! | 50   | cache clearing failed |
//! | 60   | profile erasure failed |
//! | 70   | extension cleanup failed |
//! | 9    | any other failure |

use std::io::IsTerminal;
use std::process::ExitCode;

use browser_wipe::cli::Cli;

fn main() -> ExitCode {
    // Install miette's fancy panic and error report handler
    miette::set_panic_hook();

    // Plain output when stderr is not a terminal (CI, logs, pipes)
    let hook = if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))
    } else {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))
    };
    if let Err(e) = hook {
        eprintln!("Warning: could not install the error report handler: {e}");
    }

    let cli = Cli::parse_args();

    match browser_wipe::commands::execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            eprintln!("Exit code {code}");
            ExitCode::from(code)
        }
    }
}
