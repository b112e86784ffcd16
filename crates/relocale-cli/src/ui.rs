// Macros for console output. Progress lines honour `--quiet`; errors and
// requested data are always printed.

use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

#[macro_export]
macro_rules! ui_ok {
    ($($arg:tt)*) => {{
        if !$crate::ui::is_quiet() {
            println!("✔ {}", format!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! ui_info {
    ($($arg:tt)*) => {{
        if !$crate::ui::is_quiet() {
            eprintln!("ℹ {}", format!($($arg)*));
        }
    }};
}

#[macro_export]
macro_rules! ui_warn {
    ($($arg:tt)*) => {{
        use std::io::IsTerminal;
        if !$crate::ui::is_quiet() {
            let show_icon =
                std::io::stderr().is_terminal() && std::env::var_os("NO_ICONS").is_none();
            if show_icon {
                eprintln!("⚠ {}", format!($($arg)*));
            } else {
                eprintln!("{}", format!($($arg)*));
            }
        }
    }};
}

#[macro_export]
macro_rules! ui_err {
    ($($arg:tt)*) => {{
        eprintln!("✖ {}", format!($($arg)*));
    }};
}

#[macro_export]
macro_rules! ui_out {
    ($($arg:tt)*) => {{
        println!("{}", format!($($arg)*));
    }};
}
