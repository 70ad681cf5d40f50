use std::io::{self, Write};

/// Logs `$result` at error level if it is an `Err`, prefixed by the formatted message.
macro_rules! log_if_err {
    ($result:expr, $fmt:expr) => {{
        if let Err(ref e) = $result {
            error!(concat!($fmt, ": {}"), e);
        }
    }};
    ($result:expr, $fmt:expr, $($arg:tt)+) => {{
        if let Err(ref e) = $result {
            error!(concat!($fmt, ": {}"), $($arg)+, e);
        }
    }};
}

/// Flushes stdout, logging instead of failing; nothing useful can be done if the terminal is gone.
pub fn flush_stdout() {
    let temp_result = io::stdout().flush();
    log_if_err!(temp_result, "failed to flush stdout");
}
