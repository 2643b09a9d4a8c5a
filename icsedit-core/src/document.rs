//! 日历文档模型
//!
//! 通用的组件/属性树，不包含任何ICS语义。未知的组件和属性原样保留，
//! 以便导出时还原。

/// 属性的一个取值：原始参数文本 + 解码后的值
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyValue {
    /// 参数原文，不含开头的分号，例如 `VALUE=DATE;TZID=Asia/Shanghai`
    pub params: String,
    pub value: String,
}

impl PropertyValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            params: String::new(),
            value: value.into(),
        }
    }

    pub fn with_params(params: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            params: params.into(),
            value: value.into(),
        }
    }

    /// 逐个返回参数（按不在引号内的分号切分）
    pub fn params(&self) -> impl Iterator<Item = &str> {
        split_unquoted(&self.params, ';').filter(|p| !p.is_empty())
    }

    /// 按名称查找参数值（名称不区分大小写）
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params().find_map(|p| {
            let (key, value) = p.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim_matches('"'))
        })
    }
}

/// 按分隔符切分，忽略双引号内的分隔符
fn split_unquoted(text: &str, sep: char) -> impl Iterator<Item = &str> {
    let mut in_quotes = false;
    let mut start = 0;
    let mut pieces = Vec::new();
    for (i, c) in text.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            pieces.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    pieces.push(&text[start..]);
    pieces.into_iter()
}

/// 同名属性的所有取值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub values: Vec<PropertyValue>,
}

/// 组件（vcalendar、vevent、valarm……）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    kind: String,
    properties: Vec<Property>,
    children: Vec<Component>,
}

impl Component {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_ascii_lowercase(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind.eq_ignore_ascii_case(kind)
    }

    /// 属性，按名称首次出现的顺序
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn children(&self) -> &[Component] {
        &self.children
    }

    /// 某属性的全部取值，不存在时为空
    pub fn property_values(&self, name: &str) -> &[PropertyValue] {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn first(&self, name: &str) -> Option<&PropertyValue> {
        self.property_values(name).first()
    }

    /// 第一个取值的文本，不存在时为空字符串
    pub fn value(&self, name: &str) -> &str {
        self.first(name).map(|v| v.value.as_str()).unwrap_or("")
    }

    pub fn has_property(&self, name: &str) -> bool {
        !self.property_values(name).is_empty()
    }

    /// 追加一个取值；同名属性不会被覆盖
    pub fn append_property(&mut self, name: &str, value: PropertyValue) {
        match self
            .properties
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
        {
            Some(property) => property.values.push(value),
            None => self.properties.push(Property {
                name: name.to_ascii_uppercase(),
                values: vec![value],
            }),
        }
    }

    /// 用单个取值替换同名属性，保留原来的位置
    pub fn set_property(&mut self, name: &str, value: PropertyValue) {
        match self
            .properties
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
        {
            Some(property) => property.values = vec![value],
            None => self.properties.push(Property {
                name: name.to_ascii_uppercase(),
                values: vec![value],
            }),
        }
    }

    /// 追加一个新的子组件并返回它
    pub fn add_child(&mut self, kind: &str) -> &mut Component {
        self.push_child(Component::new(kind))
    }

    pub fn push_child(&mut self, child: Component) -> &mut Component {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// 移除第一个满足条件的直接子组件，没有则什么都不做
    pub fn remove_child<P>(&mut self, predicate: P) -> Option<Component>
    where
        P: FnMut(&Component) -> bool,
    {
        let index = self.children.iter().position(predicate)?;
        Some(self.children.remove(index))
    }

    /// 深度优先（先序）移除第一个满足条件的后代组件
    pub fn remove_descendant<P>(&mut self, predicate: &mut P) -> Option<Component>
    where
        P: FnMut(&Component) -> bool,
    {
        let mut i = 0;
        while i < self.children.len() {
            if predicate(&self.children[i]) {
                return Some(self.children.remove(i));
            }
            if let Some(found) = self.children[i].remove_descendant(predicate) {
                return Some(found);
            }
            i += 1;
        }
        None
    }

    /// 深度优先（先序）查找第一个满足条件的组件，包括自身
    pub fn find_mut<P>(&mut self, predicate: &mut P) -> Option<&mut Component>
    where
        P: FnMut(&Component) -> bool,
    {
        if predicate(self) {
            return Some(self);
        }
        for child in &mut self.children {
            if let Some(found) = child.find_mut(predicate) {
                return Some(found);
            }
        }
        None
    }

    /// 深度优先（先序）访问所有组件，包括自身
    pub fn visit_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Component),
    {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    /// 所有指定类型的组件，深度优先、先序，包括自身
    pub fn find_all(&self, kind: &str) -> FindAll<'_> {
        FindAll {
            kind: kind.to_ascii_lowercase(),
            stack: vec![self],
        }
    }
}

/// [`Component::find_all`] 返回的惰性迭代器
#[derive(Debug, Clone)]
pub struct FindAll<'a> {
    kind: String,
    stack: Vec<&'a Component>,
}

impl<'a> Iterator for FindAll<'a> {
    type Item = &'a Component;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(component) = self.stack.pop() {
            self.stack.extend(component.children.iter().rev());
            if component.kind == self.kind {
                return Some(component);
            }
        }
        None
    }
}

/// 日历文档：根组件一定是vcalendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDocument {
    root: Component,
}

impl CalendarDocument {
    /// 创建只有PRODID和VERSION的空日历
    pub fn create_empty(product_id: &str, version: &str) -> Self {
        let mut root = Component::new("vcalendar");
        root.set_property("PRODID", PropertyValue::new(product_id));
        root.set_property("VERSION", PropertyValue::new(version));
        Self { root }
    }

    pub(crate) fn from_root(root: Component) -> Self {
        debug_assert!(root.is("vcalendar"));
        Self { root }
    }

    pub fn root(&self) -> &Component {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Component {
        &mut self.root
    }

    pub fn find_all(&self, kind: &str) -> FindAll<'_> {
        self.root.find_all(kind)
    }

    pub fn events(&self) -> FindAll<'_> {
        self.find_all("vevent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Component {
        let mut root = Component::new("VCALENDAR");
        let first = root.add_child("vevent");
        first.append_property("UID", PropertyValue::new("a"));
        first.add_child("valarm");
        let tz = root.add_child("vtimezone");
        tz.add_child("standard");
        root.add_child("vevent")
            .append_property("UID", PropertyValue::new("b"));
        root
    }

    #[test]
    fn find_all_is_preorder_and_restartable() {
        let root = sample();
        let kinds: Vec<_> = root.find_all("vevent").map(|c| c.value("UID")).collect();
        assert_eq!(kinds, vec!["a", "b"]);

        let iter = root.find_all("valarm");
        assert_eq!(iter.clone().count(), 1);
        assert_eq!(iter.count(), 1);
        assert_eq!(root.find_all("vcalendar").count(), 1);
        assert_eq!(root.find_all("vjournal").count(), 0);
    }

    #[test]
    fn repeated_properties_append() {
        let mut c = Component::new("vevent");
        c.append_property("categories", PropertyValue::new("work"));
        c.append_property("CATEGORIES", PropertyValue::new("home"));
        assert_eq!(c.properties().len(), 1);
        assert_eq!(c.property_values("Categories").len(), 2);

        c.set_property("CATEGORIES", PropertyValue::new("only"));
        assert_eq!(c.property_values("CATEGORIES").len(), 1);
        assert_eq!(c.value("CATEGORIES"), "only");
    }

    #[test]
    fn absent_properties_are_empty() {
        let c = Component::new("vevent");
        assert_eq!(c.value("SUMMARY"), "");
        assert!(c.property_values("SUMMARY").is_empty());
        assert!(c.first("SUMMARY").is_none());
    }

    #[test]
    fn remove_child_detaches_first_match_only() {
        let mut root = sample();
        let removed = root.remove_child(|c| c.is("vevent"));
        assert_eq!(removed.map(|c| c.value("UID").to_string()), Some("a".into()));
        assert_eq!(root.children().len(), 2);

        assert!(root.remove_child(|c| c.is("vtodo")).is_none());
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn remove_descendant_reaches_nested_components() {
        let mut root = sample();
        let removed = root.remove_descendant(&mut |c: &Component| c.is("standard"));
        assert!(removed.is_some());
        assert_eq!(root.find_all("standard").count(), 0);
        assert_eq!(root.find_all("vtimezone").count(), 1);
    }

    #[test]
    fn params_respect_quotes() {
        let v = PropertyValue::with_params(r#"VALUE=DATE;X-NOTE="a;b""#, "20240101");
        assert_eq!(v.param("value"), Some("DATE"));
        assert_eq!(v.param("X-NOTE"), Some("a;b"));
        assert_eq!(v.params().count(), 2);
    }

    #[test]
    fn empty_document_has_prodid_and_version() {
        let doc = CalendarDocument::create_empty("-//Test//EN", "2.0");
        assert_eq!(doc.root().kind(), "vcalendar");
        assert_eq!(doc.root().value("PRODID"), "-//Test//EN");
        assert_eq!(doc.root().value("VERSION"), "2.0");
        assert_eq!(doc.events().count(), 0);
    }
}
