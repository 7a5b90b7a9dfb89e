//! Model generator - renders a SQLAlchemy model class from table columns

use tracing::debug;

use crate::config::EffectiveConfig;
use crate::schema::ColumnDescriptor;

use super::naming::{escape_attribute_name, escape_single_quoted};
use super::type_mapper::TypeMapper;
use super::INDENT;

/// Render the model block: imports, `__all__` and the class body
pub fn generate_model(
    columns: &[ColumnDescriptor],
    config: &EffectiveConfig,
    class_name: &str,
) -> String {
    let mapper = TypeMapper::new(config);
    let table_name = &config.arguments.table_name;
    debug!("Generating model {} for table {}", class_name, table_name);

    let mut code = String::new();
    code.push_str(&config.model.imports.join("\n"));
    code.push_str("\n\n");

    if config.flavor.declares_db_handle() {
        code.push_str("db = SQLAlchemy()\n\n");
    }

    code.push_str(&format!("__all__ = ['{}']\n\n\n", class_name));
    code.push_str(&format!(
        "class {}({}):\n",
        class_name, config.model.base_class
    ));
    code.push_str(&format!(
        "{}__tablename__ = '{}'\n",
        INDENT,
        escape_single_quoted(table_name)
    ));

    for col in columns {
        if config.model.exclude_columns.contains(&col.name) {
            continue;
        }
        code.push_str(&generate_column_line(col, config, &mapper));
    }

    code.push('\n');
    code.push_str(&format!("{}def __repr__(self):\n", INDENT));
    code.push_str(&format!(
        "{}{}return f'<{} {{self.{}}}>'\n",
        INDENT,
        INDENT,
        class_name,
        repr_attribute(columns)
    ));

    code
}

fn generate_column_line(
    col: &ColumnDescriptor,
    config: &EffectiveConfig,
    mapper: &TypeMapper,
) -> String {
    let attribute = escape_attribute_name(&col.name);
    let mut args = Vec::new();

    // A renamed attribute keeps its real column name as the first argument
    if attribute != col.name {
        args.push(format!("'{}'", escape_single_quoted(&col.name)));
    }
    args.push(mapper.storage_type(&col.type_keyword, col.length));

    if col.primary_key {
        args.push("primary_key=True".to_string());
    }
    if !col.nullable {
        args.push("nullable=False".to_string());
    }
    if let Some(default) = &col.default_value {
        args.push(format!("default={}", default));
    }

    format!(
        "{}{} = {}({})\n",
        INDENT,
        attribute,
        config.flavor.column_constructor(),
        args.join(", ")
    )
}

/// Attribute shown by `__repr__`: the first primary key, else `id`
fn repr_attribute(columns: &[ColumnDescriptor]) -> String {
    columns
        .iter()
        .find(|col| col.primary_key)
        .map(|col| escape_attribute_name(&col.name))
        .unwrap_or_else(|| "id".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArgumentOverrides, ConfigResolver, EnvironmentDefaults};

    fn config(classic: bool) -> EffectiveConfig {
        ConfigResolver::new(EnvironmentDefaults::default())
            .resolve(&ArgumentOverrides {
                database_url: Some("app.db".into()),
                table_name: Some("users".into()),
                classic_sqlalchemy: Some(classic),
                ..Default::default()
            })
            .unwrap()
    }

    fn column(name: &str, keyword: &str, nullable: bool, pk: bool) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            type_keyword: keyword.to_string(),
            nullable,
            default_value: None,
            primary_key: pk,
            length: None,
        }
    }

    fn users() -> Vec<ColumnDescriptor> {
        let mut name = column("name", "varchar", false, false);
        name.length = Some(100);
        let mut email = column("email", "varchar", true, false);
        email.length = Some(255);
        vec![
            column("id", "integer", false, true),
            name,
            email,
            column("created_at", "datetime", true, false),
        ]
    }

    #[test]
    fn test_flask_model() {
        let config = config(false);
        let code = generate_model(&users(), &config, "Users");

        assert!(code.starts_with("from flask_sqlalchemy import SQLAlchemy\n"));
        assert!(code.contains("db = SQLAlchemy()\n\n__all__ = ['Users']\n\n\nclass Users(db.Model):\n"));
        assert!(code.contains("    __tablename__ = 'users'\n"));
        assert!(code.contains("    id = db.Column(db.Integer, primary_key=True, nullable=False)\n"));
        assert!(code.contains("    name = db.Column(db.String(100), nullable=False)\n"));
        assert!(code.contains("    email = db.Column(db.String(255))\n"));
        assert!(!code.contains("created_at"));
        assert!(code.ends_with("\n    def __repr__(self):\n        return f'<Users {self.id}>'\n"));
    }

    #[test]
    fn test_classic_model() {
        let config = config(true);
        let code = generate_model(&users(), &config, "Users");

        assert!(!code.contains("db = SQLAlchemy()"));
        assert!(code.contains("Base = declarative_base()\n"));
        assert!(code.contains("class Users(Base):\n"));
        // id is excluded by the classic defaults
        assert!(!code.contains("    id = "));
        assert!(code.contains("    name = Column(String(100), nullable=False)\n"));
    }

    #[test]
    fn test_param_order_with_default() {
        let config = config(false);
        let mut status = column("status", "varchar", false, true);
        status.length = Some(20);
        status.default_value = Some("'active'".to_string());
        let code = generate_model(&[status], &config, "Users");
        assert!(code.contains(
            "    status = db.Column(db.String(20), primary_key=True, nullable=False, default='active')\n"
        ));
        assert!(code.contains("return f'<Users {self.status}>'"));
    }

    #[test]
    fn test_keyword_column_keeps_real_name() {
        let config = config(false);
        let code = generate_model(&[column("class", "varchar", true, false)], &config, "Users");
        assert!(code.contains("    class_ = db.Column('class', db.String)\n"));
    }
}
