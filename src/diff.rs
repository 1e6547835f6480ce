use similar::{Algorithm, ChangeTag, TextDiff};

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Renders a line-level diff as markup: deleted lines wrapped in `<del>`,
/// inserted lines in `<ins>`, unchanged lines bare, one `<br>` per line.
/// Pure text-to-text; knows nothing about where the texts came from.
pub fn render(original: &str, modified: &str) -> String {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(original, modified);

    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let line = change.value().trim_end_matches(['\r', '\n']);
        match change.tag() {
            ChangeTag::Delete => {
                out.push_str("<del>");
                out.push_str(line);
                out.push_str("</del>");
            }
            ChangeTag::Insert => {
                out.push_str("<ins>");
                out.push_str(line);
                out.push_str("</ins>");
            }
            ChangeTag::Equal => out.push_str(line),
        }
        out.push_str("<br>");
    }
    out
}

/// Terminal view of the same edit script, grouped with `context` unchanged
/// lines around each change.
pub fn print_diff(original: &str, modified: &str, context: usize, colorize: bool) {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(original, modified);

    for (idx, group) in diff.grouped_ops(context).iter().enumerate() {
        if idx > 0 {
            println!("...");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, color) = match change.tag() {
                    ChangeTag::Delete => ("-", RED),
                    ChangeTag::Insert => ("+", GREEN),
                    ChangeTag::Equal => (" ", ""),
                };
                if colorize && !color.is_empty() {
                    print!("{color}{sign} {change}{RESET}");
                } else {
                    print!("{sign} {change}");
                }
                if change.missing_newline() {
                    println!();
                }
            }
        }
    }
}
