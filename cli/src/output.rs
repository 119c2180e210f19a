use colored::Colorize;

pub fn header(title: &str) {
    println!("{}", title.bold().underline());
}

/// One aligned `name: value` row.
pub fn field(name: &str, value: &str) {
    println!("  {:<14} {}", format!("{name}:"), value);
}

pub fn info(msg: &str) {
    eprintln!("{} {}", "info:".blue().bold(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn failure(msg: &str) {
    println!("{} {}", "✗".red().bold(), msg);
}
