//! Form generator - renders a WTForms form class from table columns

use serde_json::Value;
use tracing::debug;

use crate::config::EffectiveConfig;
use crate::schema::ColumnDescriptor;
use crate::translate::LabelTranslator;

use super::naming::{escape_attribute_name, escape_double_quoted, escape_single_quoted, to_label};
use super::type_mapper::{TypeFamily, TypeMapper};
use super::INDENT;

/// Render the form block: imports, `__all__`, fields, submit and `Meta`
pub fn generate_form(
    columns: &[ColumnDescriptor],
    config: &EffectiveConfig,
    class_name: &str,
    translator: &LabelTranslator,
) -> String {
    let mapper = TypeMapper::new(config);
    debug!(
        "Generating form {} for table {}",
        class_name, config.arguments.table_name
    );

    let mut code = String::new();
    code.push_str(&config.form.imports.join("\n"));
    code.push_str("\n\n");
    code.push_str(&format!("__all__ = ['{}']\n\n\n", class_name));
    code.push_str(&format!(
        "class {}({}):\n",
        class_name, config.form.base_class
    ));

    for col in columns {
        if col.primary_key || config.model.exclude_columns.contains(&col.name) {
            continue;
        }

        let field_type = mapper.field_type(&col.type_keyword);
        let label = escape_single_quoted(&translator.translate(&to_label(&col.name)));
        let validators = generate_validators(col, config);
        let attribute = escape_attribute_name(&col.name);

        if validators.is_empty() {
            code.push_str(&format!(
                "{}{} = {}('{}')\n",
                INDENT, attribute, field_type, label
            ));
        } else {
            code.push_str(&format!(
                "{}{} = {}('{}', validators=[{}])\n",
                INDENT,
                attribute,
                field_type,
                label,
                validators.join(", ")
            ));
        }
    }

    if let Some(submit) = &config.arguments.submit {
        code.push_str(&format!(
            "{}submit = SubmitField(\"{}\")\n",
            INDENT,
            escape_double_quoted(submit)
        ));
    }

    if !config.form.meta.is_empty() {
        code.push('\n');
        code.push_str(&format!("{}class Meta:\n", INDENT));
        for (key, value) in &config.form.meta {
            code.push_str(&format!(
                "{}{}{} = {}\n",
                INDENT,
                INDENT,
                key,
                meta_value(value)
            ));
        }
    }

    code
}

/// Validators in fixed order: required, length, email
fn generate_validators(col: &ColumnDescriptor, config: &EffectiveConfig) -> Vec<String> {
    let mut validators = Vec::new();

    if !col.nullable && !col.primary_key {
        validators.push(config.form.validator("required").to_string());
    }

    if let Some(length) = col.length {
        if col.family() == TypeFamily::String {
            validators.push(format!("Length(max={})", length));
        }
    }

    if col.name.to_lowercase().contains("email") {
        validators.push(config.form.validator("email").to_string());
    }

    validators
}

/// Top-level strings are written verbatim so they can carry Python expressions
fn meta_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => python_literal(other),
    }
}

fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", escape_single_quoted(s)),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("'{}': {}", escape_single_quoted(k), python_literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArgumentOverrides, ConfigResolver, EnvironmentDefaults};
    use crate::translate::{Translate, TranslateError};
    use serde_json::json;

    fn config(overrides: ArgumentOverrides) -> EffectiveConfig {
        ConfigResolver::new(EnvironmentDefaults::default())
            .resolve(&ArgumentOverrides {
                database_url: Some("app.db".into()),
                table_name: Some("users".into()),
                ..overrides
            })
            .unwrap()
    }

    fn column(name: &str, keyword: &str, nullable: bool, length: Option<u32>) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            type_keyword: keyword.to_string(),
            nullable,
            default_value: None,
            primary_key: false,
            length,
        }
    }

    fn users() -> Vec<ColumnDescriptor> {
        let mut id = column("id", "integer", false, None);
        id.primary_key = true;
        vec![
            id,
            column("name", "varchar", false, Some(100)),
            column("email", "varchar", true, Some(255)),
        ]
    }

    #[test]
    fn test_users_form() {
        let config = config(ArgumentOverrides::default());
        let code = generate_form(&users(), &config, "UsersForm", &LabelTranslator::disabled());

        assert!(code.starts_with("from flask_wtf import FlaskForm\n"));
        assert!(code.contains("__all__ = ['UsersForm']\n\n\nclass UsersForm(FlaskForm):\n"));
        assert!(!code.contains("    id = "));
        assert!(code.contains(
            "    name = StringField('Name', validators=[DataRequired(), Length(max=100)])\n"
        ));
        assert!(code.contains(
            "    email = StringField('Email', validators=[Length(max=255), Email()])\n"
        ));
        assert!(!code.contains("SubmitField(\""));
        assert!(!code.contains("class Meta"));
    }

    #[test]
    fn test_validator_order() {
        let config = config(ArgumentOverrides::default());
        let col = column("email_address", "varchar", false, Some(255));
        assert_eq!(
            generate_validators(&col, &config),
            vec!["DataRequired()", "Length(max=255)", "Email()"]
        );
    }

    #[test]
    fn test_length_only_for_strings() {
        let config = config(ArgumentOverrides::default());
        let code = generate_form(
            &[column("bio", "text", true, Some(1000))],
            &config,
            "UsersForm",
            &LabelTranslator::disabled(),
        );
        assert!(code.contains("    bio = TextAreaField('Bio')\n"));
    }

    #[test]
    fn test_excluded_columns_skipped() {
        let config = config(ArgumentOverrides::default());
        let code = generate_form(
            &[column("updated_at", "datetime", false, None)],
            &config,
            "UsersForm",
            &LabelTranslator::disabled(),
        );
        assert!(!code.contains("updated_at"));
    }

    #[test]
    fn test_submit_and_meta() {
        let mut config = config(ArgumentOverrides {
            submit: Some("Save".into()),
            ..Default::default()
        });
        config.form.meta.insert("csrf".into(), json!(false));
        config.form.meta.insert("locales".into(), json!(["ru", "en"]));
        config.form.meta.insert("csrf_class".into(), json!("MyCSRF"));
        config.form.meta.insert("ttl".into(), json!(null));

        let code = generate_form(&users(), &config, "UsersForm", &LabelTranslator::disabled());
        assert!(code.contains("    submit = SubmitField(\"Save\")\n"));
        assert!(code.ends_with(
            "\n    class Meta:\n        csrf = False\n        locales = ['ru', 'en']\n        csrf_class = MyCSRF\n        ttl = None\n"
        ));
    }

    struct Quoting;

    impl Translate for Quoting {
        fn translate(&self, _text: &str) -> Result<String, TranslateError> {
            Ok("L'adresse".to_string())
        }
    }

    #[test]
    fn test_translated_label_is_escaped() {
        let config = config(ArgumentOverrides::default());
        let translator = LabelTranslator::new(Box::new(Quoting));
        let code = generate_form(
            &[column("address", "varchar", true, None)],
            &config,
            "UsersForm",
            &translator,
        );
        assert!(code.contains("    address = StringField('L\\'adresse')\n"));
    }
}
