//! Visual odds and ends for the CLI.

pub fn print_header() {
    let version = env!("CARGO_PKG_VERSION");
    // keep the box intact for long version strings
    let spaces = " ".repeat(17usize.saturating_sub(version.len()));
    eprintln!(
        r#"
    ╭───────────────────────────────╮
    │                               │
    │     DEMASK  DEOBFUSCATOR      │
    │                               │
    │     Structural name           │
    │     recovery for AS3          │
    │     Version: {version}{spaces}│
    │                               │
    ╰───────────────────────────────╯
"#
    );
}
