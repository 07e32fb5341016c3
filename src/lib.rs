/// Tagged status line on stderr, silenced when stderr is piped.
///
/// Usage:
/// ```ignore
/// log_status!("push", "Uploading {} to {}", display_name, host);
/// log_status!("gerber", "Layer {} failed, continuing", layer);
/// ```
#[macro_export]
macro_rules! log_status {
    ($tag:expr, $($arg:tt)*) => {{
        use ::std::io::IsTerminal;
        if ::std::io::stderr().is_terminal() {
            eprintln!("[{}] {}", $tag, format_args!($($arg)*));
        }
    }};
}

pub mod core;
pub mod error;
pub mod utils;

pub use core::*;
pub use error::{Error, ErrorCode, Result};
