// File: ./src/cli.rs
//! Shared command-line interface logic: usage text and list rendering.
use crate::model::Event;
use crate::model::parser::{
    ADD_USAGE, DELETE_USAGE, EDIT_USAGE, FIND_USAGE, NEXT_USAGE, RECUR_USAGE,
};

pub fn print_usage(binary_name: &str) {
    println!(
        "Schedly v{} - A small scheduler for timed events",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>]", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("Type 'help' at the prompt for the command reference.");
}

pub fn print_help() {
    println!("COMMANDS:");
    println!("    {}", ADD_USAGE);
    println!("    {}", EDIT_USAGE);
    println!("    {}", DELETE_USAGE);
    println!("    {}", RECUR_USAGE);
    println!("    {}", FIND_USAGE);
    println!("    {}", NEXT_USAGE);
    println!("    list                 Show every event, sorted by date and time");
    println!("    clear                Remove all events (cannot be undone)");
    println!("    undo                 Revert the last add, edit, delete or recur");
    println!("    help                 Show this reference");
    println!("    exit                 Save and quit");
    println!();
    println!("NOTES:");
    println!("    INDEX refers to the number shown in the current list, starting at 1.");
    println!("    Dates are YYYY-MM-DD, times are HH:MM (24h).");
    println!("    Events on the same date may not overlap; touching ranges are fine.");
}

/// Renders the displayed list, numbered from 1 to match command indexes.
pub fn format_list<'a, I>(events: I) -> String
where
    I: IntoIterator<Item = &'a Event>,
{
    let lines: Vec<String> = events
        .into_iter()
        .enumerate()
        .map(|(i, e)| format!("{:>3}. {}", i + 1, e))
        .collect();

    if lines.is_empty() {
        "    (no events)".to_string()
    } else {
        lines.join("\n")
    }
}
