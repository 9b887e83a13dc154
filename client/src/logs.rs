//! Colored console output for scripts and debug logging.

use colored::{
    Color,
    Colorize,
};
use solana_sdk::native_token::LAMPORTS_PER_SOL;

/// Format a key/value pair with optional color overrides.
///
/// Requires the `colored::Colorize` trait to be in scope.
///
/// - fmt_kv!(key, value)
/// - fmt_kv!(key, value, key_color)
/// - fmt_kv!(key, value, key_color, value_color)
#[macro_export]
macro_rules! fmt_kv {
    ($key:expr, $value:expr $(,)?) => {
        $crate::fmt_kv!(
            $key,
            $value,
            $crate::LogColor::Highlight,
            $crate::LogColor::FadedGray
        )
    };
    ($key:expr, $value:expr, $key_color:expr $(,)?) => {
        $crate::fmt_kv!($key, $value, $key_color, $crate::LogColor::FadedGray)
    };
    ($key:expr, $value:expr, $key_color:expr, $value_color:expr $(,)?) => {{
        let __k = ::std::string::ToString::to_string(&$key);
        let __v = ::std::string::ToString::to_string(&$value);
        ::std::format!("{}: {}", __k.color($key_color), __v.color($value_color))
    }};
}

/// Prints a key/value pair with optional color overrides. Same forms as [`fmt_kv!`].
///
/// Requires the `colored::Colorize` trait to be in scope.
#[macro_export]
macro_rules! print_kv {
    ($key:expr, $value:expr $(,)?) => {
        ::std::println!("{}", $crate::fmt_kv!($key, $value))
    };
    ($key:expr, $value:expr, $key_color:expr $(,)?) => {
        ::std::println!("{}", $crate::fmt_kv!($key, $value, $key_color))
    };
    ($key:expr, $value:expr, $key_color:expr, $value_color:expr $(,)?) => {
        ::std::println!(
            "{}",
            $crate::fmt_kv!($key, $value, $key_color, $value_color)
        )
    };
}

#[derive(Clone, Copy, Debug)]
pub enum LogColor {
    Highlight,
    Error,
    Warning,
    Header,
    Info,
    FadedGray,
}

#[rustfmt::skip]
impl From<LogColor> for Color {
    fn from(value: LogColor) -> Color {
        match value {
            LogColor::Highlight  => Color::TrueColor { r: 255, g: 215, b: 87  },
            LogColor::Error      => Color::TrueColor { r: 255, g: 0,   b: 45  },
            LogColor::Warning    => Color::TrueColor { r: 180, g: 105, b: 0   },
            LogColor::Header     => Color::TrueColor { r: 0,   g: 255, b: 0   },
            LogColor::Info       => Color::TrueColor { r: 0,   g: 95,  b: 255 },
            LogColor::FadedGray  => Color::TrueColor { r: 95,  g: 95,  b: 95  },
        }
    }
}

pub fn fmt_divider() -> String {
    "-".repeat(80)
}

/// Prints `title` as a section header followed by a divider.
pub fn log_header(title: &str) {
    println!("{}", title.color(LogColor::Header).bold());
    println!("{}", fmt_divider().color(LogColor::FadedGray));
}

/// Renders a lamport amount in SOL, e.g. `1.5 SOL`.
pub fn fmt_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let fraction = lamports % LAMPORTS_PER_SOL;
    if fraction == 0 {
        return format!("{whole} SOL");
    }
    let fraction = format!("{fraction:09}");
    format!("{whole}.{} SOL", fraction.trim_end_matches('0'))
}
