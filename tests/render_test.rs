//! End-to-end tests through the `templatize` facade

use serde_json::json;
use std::fs;
use tempfile::TempDir;
use templatize::{
    compile, load_options_from_file, render, ErrorCategory, RenderOptions, TemplateResult,
    UnifiedError, Value,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("templatize=debug,templatize_core=debug")
        .try_init();
}

#[test]
fn test_newsletter() -> TemplateResult<()> {
    init_tracing();
    let source = "\
Hi {{reader.name::capitalize}},
{{#stories}}* {{.title}} [{{&.tags}}]{{^.tags}} untagged{{/.tags}}
{{/stories}}{{^stories}}Nothing new this week.
{{/stories}}{{#->footer}}sent to {{reader.email;}}{{/footer}}";

    let data = Value::from(json!({
        "reader": {"name": "grace hopper", "email": "<grace@example.com>"},
        "stories": [
            {"title": "Compilers", "tags": ["history", "cobol"]},
            {"title": "Nanoseconds", "tags": []}
        ]
    }))
    .with(
        "footer",
        Value::function(|text, _| Ok(Value::from(format!("-- {} --", text.to_plain_string())))),
    );

    let out = render(source, &data, &RenderOptions::default())?;
    assert_eq!(
        out,
        "Hi Grace Hopper,\n\
         * Compilers [history and cobol]\n\
         * Nanoseconds [] untagged\n\
         -- sent to &lt;grace@example.com&gt; --"
    );
    Ok(())
}

#[test]
fn test_empty_newsletter() -> TemplateResult<()> {
    let source = "{{#stories}}*{{/stories}}{{^stories}}Nothing new.{{/stories}}";
    let out = render(source, &Value::from(json!({"stories": []})), &RenderOptions::default())?;
    assert_eq!(out, "Nothing new.");
    Ok(())
}

#[test]
fn test_function_errors_inside_lambdas() -> TemplateResult<()> {
    let data = Value::from(json!({"when": "not a date"})).with(
        "year",
        Value::function(|v, _| {
            let text = v.to_plain_string();
            let year: i64 = text.get(..4).unwrap_or_default().parse()?;
            Ok(Value::from(year))
        }),
    );
    let out = render("[{{when -> year}}]", &data, &RenderOptions::default())?;
    assert_eq!(out, "[]");

    let options = RenderOptions {
        error_on_func_failure: true,
        ..Default::default()
    };
    let err = render("[{{when -> year}}]", &data, &options).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Function);
    assert_eq!(err.raw_tag(), Some("{{when -> year}}"));
    Ok(())
}

#[test]
fn test_options_file_and_precompiled_template() -> TemplateResult<()> {
    init_tracing();
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("options.yaml");
    fs::write(&path, "errorOnMissingTags: true\nevalZeroAsTrue: true\n").expect("write options");

    let options = load_options_from_file(&path)?;
    assert!(options.error_on_missing_tags);

    let template = compile("{{#count}}count={{count}}{{/count}}", &options)?;
    assert_eq!(template.render(&Value::from(json!({"count": 0})), &options)?, "count=0");

    let err = template.render(&Value::object(), &options).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Binding);
    Ok(())
}

#[test]
fn test_bad_options_file_is_a_config_error() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("options.json");
    fs::write(&path, "{ not json").expect("write options");

    let err = load_options_from_file(&path).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Config);
    assert!(err.context().is_some_and(|c| c.contains("options.json")));
}
