//! XPath extraction runner, built on `libxml`. No crate in the
//! reference workspace supports XPath; `libxml` is the smallest real
//! addition that covers it (see DESIGN.md).

use crate::schema::{ExtractionSchema, FieldSchema, FieldType};
use libxml::parser::Parser;
use libxml::tree::Node;
use libxml::xpath::Context;
use regex::Regex;
use serde_json::Value;

pub fn extract(html: &str, schema: &ExtractionSchema) -> Vec<Value> {
    let parser = Parser::default_html();
    let Ok(document) = parser.parse_string(html) else {
        return Vec::new();
    };
    let Ok(context) = Context::new(&document) else {
        return Vec::new();
    };
    let Ok(base_nodes) = context.findnodes(&schema.base_selector, None) else {
        return Vec::new();
    };

    base_nodes
        .into_iter()
        .map(|base_node| extract_record(&context, &base_node, &schema.fields))
        .collect()
}

fn extract_record(context: &Context, base_node: &Node, fields: &[FieldSchema]) -> Value {
    let mut record = serde_json::Map::new();
    let mut computed: Vec<&FieldSchema> = Vec::new();

    for field in fields {
        if matches!(field.field_type, FieldType::Computed { .. }) {
            computed.push(field);
            continue;
        }
        let value = extract_field(context, base_node, field);
        record.insert(field.name.clone(), value);
    }

    for field in computed {
        let FieldType::Computed { expression } = &field.field_type else {
            continue;
        };
        let value = record.get(expression.trim()).cloned().unwrap_or(Value::Null);
        record.insert(field.name.clone(), value);
    }

    Value::Object(record)
}

fn extract_field(context: &Context, base_node: &Node, field: &FieldSchema) -> Value {
    match &field.field_type {
        FieldType::Text => relative_nodes(context, base_node, &field.selector)
            .into_iter()
            .next()
            .map(|n| apply_transform(field, n.get_content()))
            .map(Value::String)
            .unwrap_or(Value::Null),
        FieldType::Attribute { name } => relative_nodes(context, base_node, &field.selector)
            .into_iter()
            .next()
            .and_then(|n| n.get_attribute(name))
            .map(|v| apply_transform(field, v))
            .map(Value::String)
            .unwrap_or(Value::Null),
        FieldType::Html => relative_nodes(context, base_node, &field.selector)
            .into_iter()
            .next()
            .map(|n| apply_transform(field, n.to_string()))
            .map(Value::String)
            .unwrap_or(Value::Null),
        FieldType::Regex { pattern, group } => {
            let Ok(re) = Regex::new(pattern) else {
                return Value::Null;
            };
            relative_nodes(context, base_node, &field.selector)
                .into_iter()
                .next()
                .map(|n| n.get_content())
                .and_then(|text| re.captures(&text).and_then(|c| c.get(*group)).map(|m| m.as_str().to_string()))
                .map(|v| apply_transform(field, v))
                .map(Value::String)
                .unwrap_or(Value::Null)
        }
        FieldType::List => {
            let items: Vec<Value> = relative_nodes(context, base_node, &field.selector)
                .into_iter()
                .map(|n| Value::String(apply_transform(field, n.get_content())))
                .collect();
            Value::Array(items)
        }
        FieldType::Nested { fields } => relative_nodes(context, base_node, &field.selector)
            .into_iter()
            .next()
            .map(|n| extract_record(context, &n, fields))
            .unwrap_or(Value::Null),
        FieldType::NestedList { fields } => {
            let items: Vec<Value> = relative_nodes(context, base_node, &field.selector)
                .into_iter()
                .map(|n| extract_record(context, &n, fields))
                .collect();
            Value::Array(items)
        }
        FieldType::Computed { .. } => Value::Null,
    }
}

/// `libxml`'s `Context::findnodes` evaluates relative to the document
/// by default; prefixing with `.` makes the query relative to
/// `base_node` when the context supports a node argument.
fn relative_nodes(context: &Context, base_node: &Node, selector: &str) -> Vec<Node> {
    context
        .findnodes(selector, Some(base_node))
        .unwrap_or_default()
}

fn apply_transform(field: &FieldSchema, value: String) -> String {
    match field.transform {
        Some(t) => t.apply(&value),
        None => value,
    }
}
