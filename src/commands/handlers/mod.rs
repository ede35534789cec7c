pub(super) mod core;
pub(super) mod git;
pub(super) mod io;
pub(super) mod wiki;

pub use git::{HIDDEN_END, HIDDEN_START};

/// Wraps `content` in a fenced code block. The fence grows past any run of
/// backticks inside the content so embedded fences cannot close it early.
pub(super) fn fenced(content: &str, info: &str) -> String {
    let longest_run = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);
    let mut block = format!("{fence}{info}\n{content}");
    if !content.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(&fence);
    block
}
