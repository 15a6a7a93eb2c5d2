//! Source Document Sanitizer — repairs the structural defects LLM-authored
//! LaTeX reliably ships with, before the document ever reaches the compiler.
//!
//! Three repairs, all pure string transformations and all idempotent:
//! 1. Escape bare `&` in the document body. Generated prose ("B&B", "R&D")
//!    leaks unescaped alignment characters; the preamble is left alone, where
//!    `&` has structural meaning in table and column definitions.
//! 2. Ensure `\RequirePackage{latexrelease}` precedes `\documentclass`, so an
//!    older installed kernel is rolled forward to current behavior.
//! 3. Inject the `\ifcompacttables` toggle definition after `\begin{document}`.
//!    Resume-class tables branch on the toggle, and generated documents
//!    routinely omit the definition that newer class revisions stopped
//!    providing themselves.

/// Marks the start of the body region; everything before it is preamble.
const BODY_MARKER: &str = "\\begin{document}";

/// First token of the declaration the release directive must precede.
const DOCUMENT_CLASS_TOKEN: &str = "\\documentclass";

/// Rolls an older installed LaTeX kernel forward; a no-op on current kernels.
const RELEASE_DIRECTIVE: &str = "\\RequirePackage{latexrelease}";

/// Presence probe for the directive (matches any option/spacing variant).
const RELEASE_NEEDLE: &str = "latexrelease";

/// Toggle name the resume class expects documents to define.
const TABLE_TOGGLE_NEEDLE: &str = "compacttables";

/// Default definition injected when the document never mentions the toggle.
const TABLE_SHIM_BLOCK: &str =
    "\\makeatletter\n\\newif\\ifcompacttables\n\\compacttablestrue\n\\makeatother";

/// Normalizes a raw LaTeX source string into a compilable one.
///
/// Pure and deterministic: no I/O, and `sanitize(sanitize(x)) == sanitize(x)`
/// for every input. Degraded mode: when `\begin{document}` is absent, the
/// whole input is treated as body for escaping and the table shim is not
/// injected (it is only meaningful inside a document body).
pub fn sanitize(raw: &str) -> String {
    let escaped = escape_body_ampersands(raw);
    let with_directive = ensure_release_directive(&escaped);
    inject_table_shim(&with_directive)
}

/// Escapes every `&` in the body region that is not already preceded by a
/// backslash. The preamble (everything up to and including the body marker)
/// passes through untouched.
fn escape_body_ampersands(doc: &str) -> String {
    match doc.find(BODY_MARKER) {
        Some(idx) => {
            let boundary = idx + BODY_MARKER.len();
            let mut out = String::with_capacity(doc.len());
            out.push_str(&doc[..boundary]);
            out.push_str(&escape_unescaped_ampersands(&doc[boundary..]));
            out
        }
        // Degraded mode: no body marker, treat the whole input as body.
        None => escape_unescaped_ampersands(doc),
    }
}

fn escape_unescaped_ampersands(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_was_backslash = false;
    for ch in text.chars() {
        if ch == '&' && !prev_was_backslash {
            out.push('\\');
        }
        out.push(ch);
        prev_was_backslash = ch == '\\';
    }
    out
}

/// Ensures the kernel-release directive appears exactly once, on the line
/// immediately preceding the first line that starts with `\documentclass`.
/// Documents with no document-class line are returned unchanged.
fn ensure_release_directive(doc: &str) -> String {
    if doc.contains(RELEASE_NEEDLE) {
        return doc.to_string();
    }

    let Some(class_line) = doc
        .lines()
        .position(|line| line.trim_start().starts_with(DOCUMENT_CLASS_TOKEN))
    else {
        return doc.to_string();
    };

    let mut lines: Vec<&str> = doc.lines().collect();
    lines.insert(class_line, RELEASE_DIRECTIVE);
    let mut out = lines.join("\n");
    if doc.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Injects the table-toggle shim immediately after the body marker, unless
/// the document already mentions the toggle or has no body marker at all.
fn inject_table_shim(doc: &str) -> String {
    if doc.contains(TABLE_TOGGLE_NEEDLE) {
        return doc.to_string();
    }

    let Some(idx) = doc.find(BODY_MARKER) else {
        return doc.to_string();
    };

    let boundary = idx + BODY_MARKER.len();
    let mut out = String::with_capacity(doc.len() + TABLE_SHIM_BLOCK.len() + 1);
    out.push_str(&doc[..boundary]);
    out.push('\n');
    out.push_str(TABLE_SHIM_BLOCK);
    out.push_str(&doc[boundary..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_DOC: &str = "\\documentclass{article}\n\\begin{document}\nHello\n\\end{document}\n";

    // ── ampersand escaping ──────────────────────────────────────────────────

    #[test]
    fn test_escapes_bare_ampersand_in_body() {
        let doc = "\\documentclass{article}\n\\begin{document}\nR&D work\n\\end{document}\n";
        let out = sanitize(doc);
        assert!(out.contains("R\\&D work"), "got: {out}");
    }

    #[test]
    fn test_preserves_already_escaped_ampersand() {
        let doc = "\\documentclass{article}\n\\begin{document}\nR\\&D work\n\\end{document}\n";
        let out = sanitize(doc);
        assert!(out.contains("R\\&D work"));
        assert!(!out.contains("\\\\&"), "must not double-escape: {out}");
    }

    #[test]
    fn test_mixed_escaped_and_bare_ampersands() {
        let doc = "\\begin{document}\nA\\&B and C&D\n\\end{document}";
        let out = sanitize(doc);
        assert!(out.contains("A\\&B and C\\&D"));
    }

    #[test]
    fn test_preamble_ampersands_untouched() {
        let doc = "\\documentclass{article}\n\\newcolumntype{Y}{>{\\centering}X&}\n\\begin{document}\nA&B\n\\end{document}\n";
        let out = sanitize(doc);
        assert!(
            out.contains(">{\\centering}X&}"),
            "preamble & must stay structural: {out}"
        );
        assert!(out.contains("A\\&B"));
    }

    #[test]
    fn test_degraded_mode_escapes_whole_input_without_body_marker() {
        let out = sanitize("Salt & pepper");
        assert_eq!(out, "Salt \\& pepper");
    }

    // ── release directive ───────────────────────────────────────────────────

    #[test]
    fn test_directive_inserted_immediately_before_documentclass() {
        let out = sanitize(MINIMAL_DOC);
        let lines: Vec<&str> = out.lines().collect();
        let class_line = lines
            .iter()
            .position(|l| l.starts_with("\\documentclass"))
            .unwrap();
        assert!(class_line >= 1, "directive must precede the class line");
        assert_eq!(lines[class_line - 1], RELEASE_DIRECTIVE);
    }

    #[test]
    fn test_directive_inserted_when_class_is_not_first_line() {
        let doc = "% tailored resume\n% generated output\n\\documentclass{article}\n\\begin{document}\nHi\n\\end{document}\n";
        let out = sanitize(doc);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "% tailored resume");
        assert_eq!(lines[2], RELEASE_DIRECTIVE);
        assert!(lines[3].starts_with("\\documentclass"));
    }

    #[test]
    fn test_directive_appears_exactly_once() {
        let out = sanitize(MINIMAL_DOC);
        assert_eq!(out.matches(RELEASE_DIRECTIVE).count(), 1);
        let again = sanitize(&out);
        assert_eq!(again.matches(RELEASE_DIRECTIVE).count(), 1);
    }

    #[test]
    fn test_existing_directive_not_duplicated() {
        let doc = "\\RequirePackage{latexrelease}\n\\documentclass{article}\n\\begin{document}\nHi\n\\end{document}\n";
        let out = sanitize(doc);
        assert_eq!(out.matches(RELEASE_NEEDLE).count(), 1);
    }

    #[test]
    fn test_no_directive_without_documentclass() {
        let out = sanitize("just some text, no preamble");
        assert!(!out.contains(RELEASE_NEEDLE));
    }

    // ── table shim ──────────────────────────────────────────────────────────

    #[test]
    fn test_shim_injected_after_body_marker() {
        let out = sanitize(MINIMAL_DOC);
        let body_at = out.find(BODY_MARKER).unwrap();
        let shim_at = out.find("\\newif\\ifcompacttables").unwrap();
        assert!(shim_at > body_at);
        // Immediately after: only the marker's newline separates them.
        let between = &out[body_at + BODY_MARKER.len()..shim_at];
        assert_eq!(between.trim_matches('\n'), "\\makeatletter");
    }

    #[test]
    fn test_shim_not_duplicated_when_toggle_mentioned() {
        let doc = "\\documentclass{article}\n\\begin{document}\n\\compacttablesfalse\nHi\n\\end{document}\n";
        let out = sanitize(doc);
        assert!(!out.contains("\\newif\\ifcompacttables"));
    }

    #[test]
    fn test_shim_skipped_without_body_marker() {
        let out = sanitize("\\documentclass{article}\nno body here");
        assert!(!out.contains(TABLE_TOGGLE_NEEDLE));
    }

    // ── idempotence ─────────────────────────────────────────────────────────

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            MINIMAL_DOC.to_string(),
            "R&D and A\\&B".to_string(),
            "".to_string(),
            "% comment\n\\documentclass{resume}\n\\begin{document}\nFish & chips & more\n\\end{document}\n".to_string(),
            "\\begin{document}\nbody only & no preamble\n\\end{document}".to_string(),
        ];
        for input in inputs {
            let once = sanitize(&input);
            let twice = sanitize(&once);
            assert_eq!(once, twice, "not idempotent for input: {input:?}");
        }
    }

    #[test]
    fn test_empty_input_stays_empty() {
        assert_eq!(sanitize(""), "");
    }
}
