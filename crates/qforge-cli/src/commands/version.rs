//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - lowering for quantum/classical hybrid programs",
        style("qforge").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qforge-ir       Symbolic sizes, qubit accessors, operation expressions");
    println!("  qforge-compile  Decomposition, multiplexed control, code generation");
    println!("  qforge-cli      Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
