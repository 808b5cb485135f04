pub trait StripCodeBlock {
    fn strip_code_block(&self) -> &str;
}

impl StripCodeBlock for str {
    fn strip_code_block(&self) -> &str {
        let trimmed = self.trim();
        let Some(rest) = trimmed.strip_prefix("```") else {
            return trimmed;
        };
        let inner = match rest.find('\n') {
            Some(pos) => &rest[pos + 1..],
            // single-line fence: drop the language tag up to the body
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-'),
        };
        // Models sometimes forget the closing fence.
        inner.trim_end().strip_suffix("```").unwrap_or(inner).trim()
    }
}

/// Removes `// line` and `/* block */` comments that sit outside JSON string
/// literals.
pub trait StripJsonComments {
    fn strip_json_comments(&self) -> String;
}

impl StripJsonComments for str {
    fn strip_json_comments(&self) -> String {
        let mut out = String::with_capacity(self.len());
        let mut chars = self.chars().peekable();
        let mut in_string = false;
        let mut escaped = false;

        while let Some(c) = chars.next() {
            if in_string {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }

            match (c, chars.peek()) {
                ('"', _) => {
                    in_string = true;
                    out.push(c);
                }
                ('/', Some('/')) => {
                    // keep the newline so line structure survives
                    for next in chars.by_ref() {
                        if next == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                }
                ('/', Some('*')) => {
                    chars.next();
                    let mut prev = '\0';
                    for next in chars.by_ref() {
                        if prev == '*' && next == '/' {
                            break;
                        }
                        prev = next;
                    }
                    out.push(' ');
                }
                _ => out.push(c),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fence_with_language_tag() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(raw.strip_code_block(), "{\"a\": 1}");
    }

    #[test]
    fn strips_fence_without_closing_marker() {
        let raw = "```\n{\"a\": 1}\n";
        assert_eq!(raw.strip_code_block(), "{\"a\": 1}");
    }

    #[test]
    fn strips_fence_on_a_single_line() {
        assert_eq!("```json {\"a\": 1} ```".strip_code_block(), "{\"a\": 1}");
        assert_eq!("```{\"a\": 1}```".strip_code_block(), "{\"a\": 1}");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!("  {\"a\": 1} ".strip_code_block(), "{\"a\": 1}");
    }

    #[test]
    fn removes_line_and_block_comments() {
        let raw = "{\n  \"a\": 1, // first\n  /* note */ \"b\": 2\n}";
        let cleaned = raw.strip_json_comments();
        let value: serde_json::Value = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(value["b"], 2);
        assert!(!cleaned.contains("first"));
        assert!(!cleaned.contains("note"));
    }

    #[test]
    fn keeps_comment_markers_inside_strings() {
        let raw = r#"{"url": "https://example.com/a", "glob": "/* x */", "q": "say \"//hi\""}"#;
        let cleaned = raw.strip_json_comments();
        assert_eq!(cleaned, raw);
    }

    #[test]
    fn unterminated_block_comment_eats_the_rest() {
        let raw = "{\"a\": 1} /* dangling";
        assert_eq!(raw.strip_json_comments().trim(), "{\"a\": 1}");
    }
}
