//! Integration tests for Templatize core
//!
//! Renders realistic templates through the public API: options loaded from
//! files, serde data, functions, partials and error reporting.

use serde::Serialize;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use templatize_core::{
    render, ErrorCategory, FormatError, NumberFormatter, OptionsLoader, RenderOptions, Template,
    TemplateError, TemplateResult, UnifiedError, Value,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("templatize_core=debug")
        .try_init();
}

#[derive(Serialize)]
struct Customer {
    name: String,
}

#[derive(Serialize)]
struct Line {
    item: String,
    qty: u32,
    price: f64,
}

#[derive(Serialize)]
struct Invoice {
    number: String,
    customer: Customer,
    lines: Vec<Line>,
    total: f64,
    paid: bool,
}

const INVOICE: &str = "Invoice {{number}} for {{customer.name::capitalize}}\n\
{{#lines}}- {{.item}} x{{.qty}} @ {{.price::$,.2f}}\n{{/lines}}\
Total: {{total::$,.2f}}\n\
{{^paid}}UNPAID{{/paid}}";

fn invoice() -> Invoice {
    Invoice {
        number: "A-17".to_string(),
        customer: Customer {
            name: "ada lovelace".to_string(),
        },
        lines: vec![
            Line {
                item: "Widget".to_string(),
                qty: 2,
                price: 1250.5,
            },
            Line {
                item: "Gizmo".to_string(),
                qty: 1,
                price: 3.0,
            },
        ],
        total: 2504.0,
        paid: false,
    }
}

#[test]
fn test_render_serialized_data() -> TemplateResult<()> {
    init_tracing();
    let data = Value::from_serialize(&invoice()).expect("invoice serializes");
    let out = render(INVOICE, &data, &RenderOptions::default())?;
    assert_eq!(
        out,
        "Invoice A-17 for Ada Lovelace\n\
         - Widget x2 @ $1,250.50\n\
         - Gizmo x1 @ $3.00\n\
         Total: $2,504.00\n\
         UNPAID"
    );
    Ok(())
}

#[test]
fn test_compiled_template_is_reusable() -> TemplateResult<()> {
    init_tracing();
    let options = RenderOptions::default();
    let template = Template::compile("{{#people}}{{.name}};{{/people}}", &options)?;
    let first = template.render(&Value::from(json!({"people": [{"name": "a"}]})), &options)?;
    let second = template.render(
        &Value::from(json!({"people": [{"name": "b"}, {"name": "c"}]})),
        &options,
    )?;
    assert_eq!(first, "a;");
    assert_eq!(second, "b;c;");
    Ok(())
}

#[test]
fn test_options_from_file() -> TemplateResult<()> {
    init_tracing();
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("templatize.toml");
    fs::write(
        &path,
        "escape_all = true\ndelimiters = [\"<%\", \"%>\"]\n",
    )
    .expect("write options");

    let options = OptionsLoader::new().with_file(&path).load()?;
    let data = Value::from(json!({"html": "<i>"}));
    assert_eq!(render("<%html%> {{html}}", &data, &options)?, "&lt;i&gt; {{html}}");
    Ok(())
}

#[test]
fn test_functions_and_partials_together() -> TemplateResult<()> {
    init_tracing();
    let options = RenderOptions::default()
        .with_partial("item", "<li>{{.label::upper}}</li>")
        .with_partial("list", "<ul>{{#rows -> reverse}}{{>.item}}{{/rows}}</ul>");
    let reverse = Value::function(|v, _| {
        let mut items = v.as_array().unwrap_or_default().to_vec();
        items.reverse();
        Ok(Value::Array(items))
    });
    let data = Value::from(json!({
        "rows": [{"label": "one"}, {"label": "two"}]
    }))
    .with("reverse", reverse);

    let out = render("{{>list}}", &data, &options)?;
    assert_eq!(out, "<ul><li>TWO</li><li>ONE</li></ul>");
    Ok(())
}

struct Percent;

impl NumberFormatter for Percent {
    fn format(&self, spec: &str, value: f64) -> Result<String, FormatError> {
        match spec {
            "pct" => Ok(format!("{}%", (value * 100.0).round())),
            _ => Err(FormatError::Unsupported(spec.to_string())),
        }
    }
}

#[test]
fn test_custom_number_formatter() -> TemplateResult<()> {
    let options = RenderOptions::default().with_formatter(Percent);
    let data = Value::from(json!({"ratio": 0.25}));
    assert_eq!(render("{{ratio::pct}}", &data, &options)?, "25%");
    // unsupported specifiers leave the value as is
    assert_eq!(render("{{ratio::,.2f}}", &data, &options)?, "0.25");
    Ok(())
}

#[test]
fn test_parse_errors_name_the_tag() {
    let err = Template::parse("{{#items}}{{/other}}").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
    assert_eq!(err.error_code(), "TEMPLATE_INVALID_SECTION");
    assert_eq!(err.raw_tag(), Some("{{/other}}"));
    assert!(err.to_string().contains("{{#items}}"));

    let err = Template::parse("{{#items}}").unwrap_err();
    assert!(err.to_string().contains("hanging open section"));
}

#[test]
fn test_missing_binding_is_reported() {
    let options = RenderOptions {
        error_on_missing_tags: true,
        ..Default::default()
    };
    let err = render("Hi {{user.name}}", &Value::object(), &options).unwrap_err();
    assert!(matches!(err, TemplateError::MissingBinding { .. }));
    assert_eq!(err.category(), ErrorCategory::Binding);
    assert_eq!(err.raw_tag(), Some("{{user.name}}"));
}
