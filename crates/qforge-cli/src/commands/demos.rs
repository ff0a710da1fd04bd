//! Demos command implementation.

use console::style;

use crate::demos::DEMOS;

/// Execute the demos command.
pub fn execute() {
    println!("{}", style("Demonstration modules:").bold());
    for demo in DEMOS {
        println!("  {:<16} {}", style(demo.name).green(), demo.description);
    }
    println!();
    println!("Run {} to lower one.", style("qforge lower <name>").cyan());
}
