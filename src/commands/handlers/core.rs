use crate::commands::all_commands;

pub(crate) fn help() -> String {
    let mut help_md = String::from("These commands are handled locally:\n");
    for command in all_commands() {
        help_md.push_str(&format!("- `{}` — {}\n", command.usage, command.help));
    }
    help_md.push_str("\nAnything else is sent to the model.");
    help_md
}
