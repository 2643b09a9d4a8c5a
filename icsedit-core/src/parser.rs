//! 结构化ICS解析器
//!
//! 依次完成：折行展开、内容行切分、转义解码、BEGIN/END嵌套构建。
//! 嵌套错误会让整个解析失败，由调用方决定是否转入备用解析器。

use crate::{
    document::{CalendarDocument, Component, PropertyValue},
    error::ParseError,
    escape::{decode_text, is_text_property},
};

/// 一条内容行：`NAME[;PARAMS]:VALUE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLine<'a> {
    pub name: &'a str,
    pub params: &'a str,
    pub value: &'a str,
}

/// 展开折行，返回（起始物理行号, 逻辑行）
pub fn unfold(text: &str) -> Vec<(usize, String)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (index, physical) in text.split('\n').enumerate() {
        let physical = physical.strip_suffix('\r').unwrap_or(physical);
        let continuation = physical
            .strip_prefix(' ')
            .or_else(|| physical.strip_prefix('\t'));

        match (continuation, lines.last_mut()) {
            (Some(rest), Some((_, previous))) => previous.push_str(rest),
            (Some(rest), None) => lines.push((index + 1, rest.to_string())),
            (None, _) => lines.push((index + 1, physical.to_string())),
        }
    }

    lines
}

/// 按第一个未转义、不在引号内的冒号切分内容行
pub fn split_content_line(line: &str) -> Option<ContentLine<'_>> {
    let mut params_start = None;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if !in_quotes => escaped = true,
            '"' if params_start.is_some() => in_quotes = !in_quotes,
            ';' if params_start.is_none() => params_start = Some(i),
            ':' if !in_quotes => {
                let head = &line[..i];
                let value = &line[i + 1..];
                let (name, params) = match params_start {
                    Some(p) => (&line[..p], &line[p + 1..i]),
                    None => (head, ""),
                };
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                return Some(ContentLine {
                    name,
                    params,
                    value,
                });
            }
            _ => {}
        }
    }

    None
}

/// 解析完整的ICS文本
pub fn parse(text: &str) -> Result<CalendarDocument, ParseError> {
    let mut stack: Vec<(usize, Component)> = Vec::new();
    let mut root: Option<Component> = None;
    // 多余的顶层组件被整体跳过
    let mut skip_depth = 0usize;

    for (line_no, line) in unfold(text) {
        if line.trim().is_empty() {
            continue;
        }
        let Some(content) = split_content_line(&line) else {
            tracing::warn!("第{}行不是合法的内容行，已跳过: {}", line_no, line);
            continue;
        };

        if skip_depth > 0 {
            if content.name.eq_ignore_ascii_case("BEGIN") {
                skip_depth += 1;
            } else if content.name.eq_ignore_ascii_case("END") {
                skip_depth -= 1;
            }
            continue;
        }

        if content.name.eq_ignore_ascii_case("BEGIN") {
            let kind = content.value.trim();
            if stack.is_empty() {
                if root.is_some() {
                    tracing::warn!("第{}行出现多余的顶层组件 {}，已忽略", line_no, kind);
                    skip_depth = 1;
                    continue;
                }
                if !kind.eq_ignore_ascii_case("VCALENDAR") {
                    return Err(ParseError::NotACalendar(kind.to_ascii_uppercase()));
                }
            }
            stack.push((line_no, Component::new(kind)));
        } else if content.name.eq_ignore_ascii_case("END") {
            let found = content.value.trim();
            let Some((_, component)) = stack.pop() else {
                return Err(ParseError::UnexpectedEnd {
                    line: line_no,
                    found: found.to_ascii_uppercase(),
                });
            };
            if !component.is(found) {
                return Err(ParseError::MismatchedEnd {
                    line: line_no,
                    expected: component.kind().to_ascii_uppercase(),
                    found: found.to_ascii_uppercase(),
                });
            }
            match stack.last_mut() {
                Some((_, parent)) => {
                    parent.push_child(component);
                }
                None => root = Some(component),
            }
        } else {
            let Some((_, current)) = stack.last_mut() else {
                tracing::warn!("第{}行的属性 {} 不在任何组件内，已跳过", line_no, content.name);
                continue;
            };
            let value = if is_text_property(content.name) {
                decode_text(content.value)
            } else {
                content.value.to_string()
            };
            current.append_property(
                content.name,
                PropertyValue::with_params(content.params, value),
            );
        }
    }

    if let Some((line, component)) = stack.pop() {
        return Err(ParseError::Unterminated {
            line,
            kind: component.kind().to_ascii_uppercase(),
        });
    }

    root.map(CalendarDocument::from_root)
        .ok_or(ParseError::Empty)
}

#[cfg(test)]
mod tests;
