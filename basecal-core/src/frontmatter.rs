//! YAML frontmatter parsing and rendering.

use serde_yaml::{Mapping, Value as YamlValue};

use crate::error::{BaseCalError, BaseCalResult};

const DELIMITER: &str = "---";

/// Split a leading `---` block from the note body.
/// Returns `(yaml, body)`, or `None` when the note has no frontmatter block.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let first_line_end = content.find('\n')?;
    if content[..first_line_end].trim_end() != DELIMITER {
        return None;
    }

    let rest = &content[first_line_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }

    None
}

/// Parse a note into its frontmatter mapping and body.
/// Notes without frontmatter yield an empty mapping and the whole text as body.
pub fn parse_note(path: &str, content: &str) -> BaseCalResult<(Mapping, String)> {
    let Some((yaml, body)) = split_frontmatter(content) else {
        return Ok((Mapping::new(), content.to_string()));
    };

    Ok((parse_mapping(path, yaml)?, body.to_string()))
}

fn parse_mapping(path: &str, yaml: &str) -> BaseCalResult<Mapping> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }

    match serde_yaml::from_str::<YamlValue>(yaml) {
        Ok(YamlValue::Mapping(map)) => Ok(map),
        Ok(YamlValue::Null) => Ok(Mapping::new()),
        Ok(_) => Err(BaseCalError::Frontmatter {
            path: path.to_string(),
            message: "frontmatter is not a key/value mapping".to_string(),
        }),
        Err(e) => Err(BaseCalError::Frontmatter {
            path: path.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Render a frontmatter mapping followed by the body.
pub fn render_note(frontmatter: &Mapping, body: &str) -> BaseCalResult<String> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    let yaml = if frontmatter.is_empty() { String::new() } else { yaml };
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
}

/// Look up a string key in a mapping.
pub fn get<'a>(frontmatter: &'a Mapping, key: &str) -> Option<&'a YamlValue> {
    frontmatter.get(YamlValue::String(key.to_string()))
}

/// Insert or replace a string key, keeping the key's position if present.
pub fn set(frontmatter: &mut Mapping, key: &str, value: YamlValue) {
    frontmatter.insert(YamlValue::String(key.to_string()), value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_returns_yaml_and_body() {
        let (yaml, body) = split_frontmatter("---\ntitle: x\n---\nHello\n").unwrap();
        assert_eq!(yaml, "title: x\n");
        assert_eq!(body, "Hello\n");
    }

    #[test]
    fn split_requires_leading_delimiter() {
        assert!(split_frontmatter("Hello\n---\na: 1\n---\n").is_none());
        assert!(split_frontmatter("---\nunterminated: true\n").is_none());
    }

    #[test]
    fn split_tolerates_crlf_and_bom() {
        let (yaml, body) = split_frontmatter("\u{feff}---\r\na: 1\r\n---\r\nbody").unwrap();
        assert_eq!(yaml, "a: 1\r\n");
        assert_eq!(body, "body");
    }

    #[test]
    fn parse_without_frontmatter_keeps_body() {
        let (fm, body) = parse_note("a.md", "# Title\n").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "# Title\n");
    }

    #[test]
    fn parse_rejects_non_mapping_frontmatter() {
        let err = parse_note("a.md", "---\n- a\n- b\n---\n").unwrap_err();
        assert!(err.to_string().contains("a.md"));
    }

    #[test]
    fn render_keeps_key_order_and_body() {
        let (mut fm, body) = parse_note("a.md", "---\nb: 1\na: 2\n---\ntext\n").unwrap();
        set(&mut fm, "b", YamlValue::from(3));
        set(&mut fm, "c", YamlValue::from("new"));

        let out = render_note(&fm, &body).unwrap();
        assert_eq!(out, "---\nb: 3\na: 2\nc: new\n---\ntext\n");
    }
}
