use crate::{
    document::{CalendarDocument, Component},
    escape::{encode_text, is_text_property},
};

/// ICS文本生成器
pub struct Serializer {
    /// 超过该字节数的行会被折行
    fold_width: usize,
}

impl Serializer {
    pub fn new(fold_width: usize) -> Self {
        Self { fold_width }
    }

    /// 生成整个日历的ICS文本
    pub fn serialize(&self, document: &CalendarDocument) -> String {
        let mut ics_content = String::new();
        self.write_component(&mut ics_content, document.root());
        ics_content
    }

    /// 先序输出组件：BEGIN、属性、子组件、END
    fn write_component(&self, ics_content: &mut String, component: &Component) {
        let kind = component.kind().to_ascii_uppercase();
        ics_content.push_str(&format!("BEGIN:{}\r\n", kind));

        for property in component.properties() {
            for value in &property.values {
                let mut line = property.name.clone();
                if !value.params.is_empty() {
                    line.push(';');
                    line.push_str(&value.params);
                }
                line.push(':');
                if is_text_property(&property.name) {
                    line.push_str(&encode_text(&value.value));
                } else {
                    line.push_str(&value.value);
                }
                ics_content.push_str(&fold_line(&line, self.fold_width));
                ics_content.push_str("\r\n");
            }
        }

        for child in component.children() {
            self.write_component(ics_content, child);
        }

        ics_content.push_str(&format!("END:{}\r\n", kind));
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new(75)
    }
}

/// 使用默认折行宽度生成ICS文本
pub fn serialize(document: &CalendarDocument) -> String {
    Serializer::default().serialize(document)
}

/// 按字节折行，续行以 CRLF + 空格开头，不会拆开多字节字符。
/// `width` 为0时不折行
pub fn fold_line(line: &str, width: usize) -> String {
    if width == 0 || line.len() <= width {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + line.len() / width * 3);
    let mut rest = line;
    // 续行的空格也计入宽度
    let mut limit = width;

    while rest.len() > limit {
        let mut cut = limit;
        while cut > 0 && !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        folded.push_str(&rest[..cut]);
        folded.push_str("\r\n ");
        rest = &rest[cut..];
        limit = width.saturating_sub(1).max(1);
    }
    folded.push_str(rest);

    folded
}
