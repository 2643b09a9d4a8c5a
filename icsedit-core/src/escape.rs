/// 取值本身以 `;` `,` 为分隔符的属性，原样保存、原样输出
const STRUCTURED_PROPERTIES: &[&str] = &[
    "RRULE",
    "EXRULE",
    "RDATE",
    "EXDATE",
    "GEO",
    "CATEGORIES",
    "RESOURCES",
    "FREEBUSY",
    "REQUEST-STATUS",
];

/// 该属性的取值是否需要做文本转义
pub fn is_text_property(name: &str) -> bool {
    !STRUCTURED_PROPERTIES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(name))
}

/// 转义ICS文本内容
pub fn encode_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

/// 反转义ICS文本内容，未知的转义序列保留原样
pub fn decode_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped @ ('\\' | ';' | ',')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
