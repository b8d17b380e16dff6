//! Style roles for console output, mapping logical names to `colored::Color`.
//!
//! Colouring is applied only when the `enabled` flag passed to `paint()` is
//! true, so rendering stays free of global state and easy to test.
//!
//! ```
//! use salonbook::core::styles::StyleRole;
//! assert_eq!(StyleRole::Header.paint("Services", false), "Services");
//! assert!(StyleRole::Header.paint("Services", true).starts_with("\x1b["));
//! ```

use clap::builder::styling::AnsiColor;
use colored::Color;

use crate::booking::api::AppointmentStatus;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }

            pub fn ansi_code(self) -> Option<String> {
                map_color_code(self.color()?)
            }

            pub fn paint(self, text: &str, enabled: bool) -> String {
                if !enabled { return text.to_string(); }
                if let Some(code) = self.ansi_code() { return format!("\x1b[{}m{}\x1b[0m", code, text); }
                text.to_string()
            }
        }
    }
}

style! {
    Header    => Some(Color::Yellow),
    Accent    => Some(Color::Cyan),
    Key       => Some(Color::BrightGreen),
    Confirmed => Some(Color::Green),
    Proposed  => Some(Color::Magenta),
    Cancelled => Some(Color::BrightBlack),
    Error     => Some(Color::BrightRed),
    Notice    => Some(Color::Blue),
    Value     => None,
}

impl StyleRole {
    /// Role used to render an appointment status
    pub fn for_status(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Proposed => StyleRole::Proposed,
            AppointmentStatus::Confirmed => StyleRole::Confirmed,
            AppointmentStatus::Cancelled => StyleRole::Cancelled,
        }
    }
}

fn map_color_code(c: Color) -> Option<String> {
    use Color::*;
    let code = match c {
        Black => "30",
        Red => "31",
        Green => "32",
        Yellow => "33",
        Blue => "34",
        Magenta => "35",
        Cyan => "36",
        White => "37",
        BrightBlack => "90",
        BrightRed => "91",
        BrightGreen => "92",
        BrightYellow => "93",
        BrightBlue => "94",
        BrightMagenta => "95",
        BrightCyan => "96",
        BrightWhite => "97",
        TrueColor { r, g, b } => return Some(format!("38;2;{};{};{}", r, g, b)),
    };
    Some(code.to_string())
}

fn color_to_ansi(c: Color) -> Option<AnsiColor> {
    use AnsiColor as A;
    use Color::*;
    Some(match c {
        Red => A::Red,
        Green => A::Green,
        Yellow => A::Yellow,
        Blue => A::Blue,
        Magenta => A::Magenta,
        Cyan => A::Cyan,
        BrightBlack => A::BrightBlack,
        BrightRed => A::BrightRed,
        BrightGreen => A::BrightGreen,
        _ => return None,
    })
}

/// Build clap Styles for `--help` output from the same roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.color().and_then(color_to_ansi) {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .literal(style(StyleRole::Accent, false))
        .placeholder(style(StyleRole::Key, false))
        .valid(style(StyleRole::Confirmed, false))
        .invalid(style(StyleRole::Error, false))
        .error(style(StyleRole::Error, true))
}
