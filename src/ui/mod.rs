//! Terminal UI layer for interactive chat sessions.
//!
//! The core reports everything it wants shown through [`ChatView`]; this
//! layer decides how it looks. Key submodules:
//! - [`chat_loop`]: the main interaction loop that feeds keystrokes into
//!   [`crate::core::app::App`] and delivers worker results back to it.
//! - [`transcript`]: the [`ChatView`] implementation backing the screen.
//! - [`renderer`], [`picker`] and [`theme`]: frame composition and colours.

pub mod chat_loop;
pub mod picker;
pub mod renderer;
pub mod theme;
pub mod transcript;

/// Which speaker a transcript row belongs to; the renderer maps it to a
/// colour from the configured theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    User,
    Assistant,
    System,
}

/// Everything the core tells the front end.
pub trait ChatView {
    fn append_user(&mut self, sender: &str, text: &str, color: ColorTag);

    fn append_assistant(&mut self, sender: &str, text: &str, color: ColorTag);

    /// Informational line that never becomes part of the model's context.
    fn append_system(&mut self, sender: &str, text: &str, color: ColorTag);

    fn set_input_enabled(&mut self, enabled: bool);

    fn clear(&mut self);
}
