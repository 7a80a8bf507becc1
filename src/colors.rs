//! Global colors.

use nu_ansi_term::Color;

/// The attention color.
pub(crate) const ATTENTION_COLOR: Color = Color::Red;

/// The color for hints the user has to act upon.
pub(crate) const HINT_COLOR: Color = Color::Blue;

/// The information color.
pub(crate) const INFO_COLOR: Color = Color::Cyan;

/// The color used to colorise the path.
pub(crate) const PATH_COLOR: Color = Color::LightBlue;

/// The color used to report success.
pub(crate) const SUCCESS_COLOR: Color = Color::Green;

/// The color used to report work in progress.
pub(crate) const PROGRESS_COLOR: Color = Color::Yellow;
