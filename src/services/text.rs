/// Tab stop width applied to every rendered report block.
pub const TAB_WIDTH: usize = 2;

/// Expand tabs to `width`-column stops. The column count resets on every
/// newline, so nested tab indentation stays visually distinct regardless of
/// terminal tab width. Expanding already-expanded text is a no-op.
pub fn expand_tabs(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = if width == 0 { 0 } else { width - column % width };
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}

/// Prefix every line that contains non-whitespace with `prefix`.
/// Whitespace-only lines pass through unchanged.
pub fn indent(text: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (at, line) in text.split('\n').enumerate() {
        if at > 0 {
            out.push('\n');
        }
        if !line.trim().is_empty() {
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    out
}
