//! CSS-selector extraction runner, built on `scraper`.

use crate::schema::{ExtractionSchema, FieldSchema, FieldType};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

pub fn extract(html: &str, schema: &ExtractionSchema) -> Vec<Value> {
    let document = Html::parse_document(html);
    let Ok(base_selector) = Selector::parse(&schema.base_selector) else {
        return Vec::new();
    };

    document
        .select(&base_selector)
        .map(|base_el| extract_record(base_el, &schema.fields))
        .collect()
}

fn extract_record(base_el: ElementRef, fields: &[FieldSchema]) -> Value {
    let mut record = serde_json::Map::new();
    let mut computed: Vec<&FieldSchema> = Vec::new();

    for field in fields {
        if matches!(field.field_type, FieldType::Computed { .. }) {
            computed.push(field);
            continue;
        }
        let value = extract_field(base_el, field);
        record.insert(field.name.clone(), value);
    }

    for field in computed {
        let value = resolve_computed(field, &record);
        record.insert(field.name.clone(), value);
    }

    Value::Object(record)
}

fn extract_field(base_el: ElementRef, field: &FieldSchema) -> Value {
    match &field.field_type {
        FieldType::Text => select_one(base_el, &field.selector)
            .map(|el| apply_transform(field, collect_text(el)))
            .map(Value::String)
            .unwrap_or(Value::Null),
        FieldType::Attribute { name } => select_one(base_el, &field.selector)
            .and_then(|el| el.value().attr(name))
            .map(|v| apply_transform(field, v.to_string()))
            .map(Value::String)
            .unwrap_or(Value::Null),
        FieldType::Html => select_one(base_el, &field.selector)
            .map(|el| apply_transform(field, el.html()))
            .map(Value::String)
            .unwrap_or(Value::Null),
        FieldType::Regex { pattern, group } => {
            let Ok(re) = Regex::new(pattern) else {
                return Value::Null;
            };
            select_one(base_el, &field.selector)
                .map(|el| collect_text(el))
                .and_then(|text| re.captures(&text).and_then(|c| c.get(*group)).map(|m| m.as_str().to_string()))
                .map(|v| apply_transform(field, v))
                .map(Value::String)
                .unwrap_or(Value::Null)
        }
        FieldType::List => {
            let items: Vec<Value> = select_many(base_el, &field.selector)
                .map(|el| Value::String(apply_transform(field, collect_text(el))))
                .collect();
            Value::Array(items)
        }
        FieldType::Nested { fields } => select_one(base_el, &field.selector)
            .map(|el| extract_record(el, fields))
            .unwrap_or(Value::Null),
        FieldType::NestedList { fields } => {
            let items: Vec<Value> = select_many(base_el, &field.selector)
                .map(|el| extract_record(el, fields))
                .collect();
            Value::Array(items)
        }
        FieldType::Computed { .. } => Value::Null,
    }
}

/// Resolves a `computed` field using prior sibling values already
/// placed in `record`, evaluating the expression as a reference to
/// another field name (the simplest useful form of "computed").
fn resolve_computed(field: &FieldSchema, record: &serde_json::Map<String, Value>) -> Value {
    let FieldType::Computed { expression } = &field.field_type else {
        return Value::Null;
    };
    record.get(expression.trim()).cloned().unwrap_or(Value::Null)
}

fn apply_transform(field: &FieldSchema, value: String) -> String {
    match field.transform {
        Some(t) => t.apply(&value),
        None => value,
    }
}

fn select_one<'a>(base_el: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    Selector::parse(selector)
        .ok()
        .and_then(|sel| base_el.select(&sel).next())
}

fn select_many<'a>(
    base_el: ElementRef<'a>,
    selector: &str,
) -> Box<dyn Iterator<Item = ElementRef<'a>> + 'a> {
    match Selector::parse(selector) {
        Ok(sel) => Box::new(base_el.select(&sel).collect::<Vec<_>>().into_iter()),
        Err(_) => Box::new(std::iter::empty()),
    }
}

fn collect_text(el: ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SelectorKind;

    #[test]
    fn extracts_text_fields_for_each_base_element() {
        let html = r#"
            <html><body>
                <div class="item"><h2 class="title">First</h2></div>
                <div class="item"><h2 class="title">Second</h2></div>
            </body></html>
        "#;
        let schema = ExtractionSchema::new("items", ".item", SelectorKind::Css)
            .with_field(FieldSchema::new("title", ".title", FieldType::Text));
        let records = extract(html, &schema);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["title"], "First");
        assert_eq!(records[1]["title"], "Second");
    }

    #[test]
    fn computed_field_resolves_after_siblings() {
        let html = r#"<html><body><div class="item"><span class="name">Alice</span></div></body></html>"#;
        let schema = ExtractionSchema::new("items", ".item", SelectorKind::Css)
            .with_field(FieldSchema::new("name", ".name", FieldType::Text))
            .with_field(FieldSchema::new(
                "name_again",
                "",
                FieldType::Computed {
                    expression: "name".to_string(),
                },
            ));
        let records = extract(html, &schema);
        assert_eq!(records[0]["name_again"], "Alice");
    }

    #[test]
    fn transform_is_applied_to_extracted_text() {
        let html = r#"<html><body><div class="item"><span class="name"> Alice </span></div></body></html>"#;
        let schema = ExtractionSchema::new("items", ".item", SelectorKind::Css).with_field(
            FieldSchema::new("name", ".name", FieldType::Text)
                .with_transform(crate::schema::Transform::Uppercase),
        );
        let records = extract(html, &schema);
        assert_eq!(records[0]["name"], "ALICE");
    }
}
