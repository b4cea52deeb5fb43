//! Rust rendering back-end
//!
//! Renders the synthesized row-value and query shapes into one generated
//! source unit per database. The output is deterministic: the same model and
//! configuration produce byte-identical text.

use crate::config::GeneratorConfig;
use crate::queryspec::QuerySpec;
use crate::resolve::ResolvedType;
use crate::rowspec::{FieldSpec, RowSpec};
use heck::{ToPascalCase, ToSnakeCase};
use rowforge_core::{BindingMode, Column, Constraints, Database, Table, Value};

/// Render the complete generated unit for one database.
pub fn render_database(db: &Database, cfg: &GeneratorConfig) -> String {
    let mut code = String::new();
    let db_struct = format!("{}Db", db.name().to_pascal_case());

    // Header and version guard
    code.push_str(&format!(
        "//! Auto-generated data access for database `{}` - DO NOT EDIT!\n",
        db.name()
    ));
    code.push_str("//!\n");
    code.push_str(&format!(
        "//! Generated by rowforge {}\n",
        rowforge_core::VERSION
    ));
    code.push_str("#![allow(unused_imports, clippy::too_many_arguments)]\n\n");

    code.push_str("use rowforge_core::{\n");
    code.push_str("    Backend, BindingMode, Column, Constraints, CoreError, Credential, FieldValue,\n");
    code.push_str("    FilterExpr, KeyAllocator, Result, RowAccess, RowData, Table, TableQuery,\n");
    code.push_str("    TableRegistry, Temporal, Value, ValueCodec,\n");
    code.push_str("};\n");
    code.push_str("use std::sync::Arc;\n\n");

    code.push_str(&format!(
        "pub const GENERATED_WITH: &str = \"{}\";\n",
        rowforge_core::VERSION
    ));
    code.push_str(&format!(
        "pub const CHARSET: &str = {:?};\n",
        db.charset()
    ));
    let mode = match db.binding() {
        BindingMode::Chrono => "Chrono",
        BindingMode::Std => "Std",
    };
    code.push_str(&format!(
        "pub const BINDING_MODE: BindingMode = BindingMode::{mode};\n\n"
    ));

    render_db_struct(&mut code, db, &db_struct);

    for table in db.tables() {
        let row = RowSpec::synthesize(db, table, cfg.width);
        let query = QuerySpec::synthesize(table);
        render_row_struct(&mut code, &db_struct, table, &row);
        render_query_struct(&mut code, &row, &query);
    }

    code
}

fn tbl_field(table: &str) -> String {
    format!("tbl_{}", table.to_snake_case())
}

fn pk_field(table: &str) -> String {
    format!("pk_{}", table.to_snake_case())
}

fn render_db_struct(code: &mut String, db: &Database, db_struct: &str) {
    code.push_str(&format!("pub struct {db_struct} {{\n"));
    code.push_str("    backend: Box<dyn Backend>,\n");
    code.push_str("    codec: Box<dyn ValueCodec>,\n");
    code.push_str("    registry: TableRegistry,\n");
    for table in db.tables() {
        code.push_str(&format!("    {}: Arc<Table>,\n", tbl_field(table.name())));
        if table.primary_key().is_some() {
            code.push_str(&format!("    {}: KeyAllocator,\n", pk_field(table.name())));
        }
    }
    code.push_str("}\n\n");

    code.push_str(&format!("impl {db_struct} {{\n"));
    code.push_str("    pub fn new(backend: Box<dyn Backend>, codec: Box<dyn ValueCodec>) -> Result<Self> {\n");
    code.push_str("        if !rowforge_core::version_compatible(GENERATED_WITH) {\n");
    code.push_str("            return Err(CoreError::Backend(format!(\n");
    code.push_str("                \"artifact generated with rowforge {GENERATED_WITH} does not match runtime {}\",\n");
    code.push_str("                rowforge_core::VERSION\n");
    code.push_str("            )));\n");
    code.push_str("        }\n");
    code.push_str("        let mut registry = TableRegistry::new();\n");
    for table in db.tables() {
        code.push_str(&format!(
            "        let mut table = Table::new({:?});\n",
            table.name()
        ));
        for column in table.columns() {
            code.push_str(&format!(
                "        table.add_column({});\n",
                column_expr(column)
            ));
        }
        code.push_str(&format!(
            "        let {} = registry.register(table);\n",
            tbl_field(table.name())
        ));
    }
    code.push_str("        Ok(Self {\n");
    code.push_str("            backend,\n");
    code.push_str("            codec,\n");
    code.push_str("            registry,\n");
    for table in db.tables() {
        code.push_str(&format!("            {},\n", tbl_field(table.name())));
        if table.primary_key().is_some() {
            code.push_str(&format!(
                "            {}: KeyAllocator::new(),\n",
                pk_field(table.name())
            ));
        }
    }
    code.push_str("        })\n");
    code.push_str("    }\n\n");

    // Seed the key allocators from existing storage state.
    code.push_str("    pub fn connect(&self) -> Result<()> {\n");
    for table in db.tables() {
        if table.primary_key().is_some() {
            code.push_str(&format!(
                "        self.{}.seed(self.backend.as_ref(), &self.{})?;\n",
                pk_field(table.name()),
                tbl_field(table.name())
            ));
        }
    }
    code.push_str("        Ok(())\n");
    code.push_str("    }\n");

    for table in db.tables() {
        let query_struct = format!("{}Query", table.name().to_pascal_case());
        let allocator = if table.primary_key().is_some() {
            format!("Some(&self.{})", pk_field(table.name()))
        } else {
            "None".to_string()
        };
        code.push_str(&format!(
            "\n    pub fn {}(&self) -> {query_struct}<'_> {{\n",
            table.name().to_snake_case()
        ));
        code.push_str(&format!("        {query_struct} {{\n"));
        code.push_str("            inner: TableQuery::new(\n");
        code.push_str("                self.backend.as_ref(),\n");
        code.push_str("                self.codec.as_ref(),\n");
        code.push_str("                &self.registry,\n");
        code.push_str(&format!(
            "                self.{}.clone(),\n",
            tbl_field(table.name())
        ));
        code.push_str(&format!("                {allocator},\n"));
        code.push_str("                BINDING_MODE,\n");
        code.push_str("            ),\n");
        code.push_str("        }\n");
        code.push_str("    }\n");
    }
    code.push_str("}\n\n");
}

fn render_row_struct(code: &mut String, db_struct: &str, table: &Table, row: &RowSpec) {
    code.push_str(&format!("pub struct {} {{\n", row.struct_name));
    code.push_str("    inner: RowData,\n");
    code.push_str("}\n\n");

    code.push_str(&format!("impl {} {{\n", row.struct_name));

    // Literal constructor
    code.push_str(&format!(
        "    pub fn new(db: &{db_struct}{}) -> Result<Self> {{\n",
        param_list(row.literal_params())
    ));
    code.push_str("        Ok(Self {\n");
    code.push_str("            inner: RowData::literal(\n");
    code.push_str(&format!(
        "                db.{}.clone(),\n",
        tbl_field(table.name())
    ));
    code.push_str("                BINDING_MODE,\n");
    code.push_str("                db.codec.as_ref(),\n");
    code.push_str(&format!(
        "                vec![{}],\n",
        row.literal_params().map(arg_expr).collect::<Vec<_>>().join(", ")
    ));
    code.push_str("            )?,\n");
    code.push_str("        })\n");
    code.push_str("    }\n\n");

    // Insert constructor: primary key omitted until allocation
    code.push_str(&format!(
        "    pub fn for_insert(db: &{db_struct}{}) -> Result<Self> {{\n",
        param_list(row.insert_params())
    ));
    code.push_str("        Ok(Self {\n");
    code.push_str("            inner: RowData::for_insert(\n");
    code.push_str(&format!(
        "                db.{}.clone(),\n",
        tbl_field(table.name())
    ));
    code.push_str("                BINDING_MODE,\n");
    code.push_str("                db.codec.as_ref(),\n");
    code.push_str(&format!(
        "                vec![{}],\n",
        row.insert_params().map(arg_expr).collect::<Vec<_>>().join(", ")
    ));
    code.push_str("            )?,\n");
    code.push_str("        })\n");
    code.push_str("    }\n\n");

    // Hydration constructor for one (possibly join-aliased) result row
    code.push_str(&format!(
        "    pub fn from_result(db: &{db_struct}, row: &dyn RowAccess, prefix: &str) -> Result<Self> {{\n"
    ));
    code.push_str("        Ok(Self {\n");
    code.push_str("            inner: RowData::hydrate(\n");
    code.push_str(&format!(
        "                db.{}.clone(),\n",
        tbl_field(table.name())
    ));
    code.push_str("                &db.registry,\n");
    code.push_str("                BINDING_MODE,\n");
    code.push_str("                db.codec.as_ref(),\n");
    code.push_str("                row,\n");
    code.push_str("                prefix,\n");
    code.push_str("            )?,\n");
    code.push_str("        })\n");
    code.push_str("    }\n\n");

    code.push_str("    fn scalar(&self, column: &str) -> Value {\n");
    code.push_str("        match self.inner.get(column) {\n");
    code.push_str("            Some(FieldValue::Plain(v)) => v.clone(),\n");
    code.push_str("            _ => Value::Null,\n");
    code.push_str("        }\n");
    code.push_str("    }\n");

    // Accessors
    for field in &row.fields {
        code.push('\n');
        render_accessor(code, field);
    }

    // Setters, keyed tables only
    for field in row.setters() {
        code.push('\n');
        code.push_str(&format!(
            "    pub fn set_{}(&mut self, db: &{db_struct}, {}: {}) -> bool {{\n",
            field.ident,
            field.ident,
            field.resolved.arg_type()
        ));
        code.push_str("        self.inner\n");
        code.push_str(&format!(
            "            .set_field(db.backend.as_ref(), db.codec.as_ref(), {:?}, {})\n",
            field.column.name(),
            arg_expr(field)
        ));
        code.push_str("            .is_ok()\n");
        code.push_str("    }\n");
    }

    // Serialization: storage column order excluding the primary key
    code.push('\n');
    code.push_str(&format!(
        "    pub fn to_values(&self, db: &{db_struct}) -> Result<Vec<Value>> {{\n"
    ));
    code.push_str("        self.inner.to_values(db.codec.as_ref())\n");
    code.push_str("    }\n");
    code.push_str("}\n\n");
}

fn render_accessor(code: &mut String, field: &FieldSpec) {
    let name = field.column.name();
    let ident = &field.ident;
    match &field.resolved {
        ResolvedType::I32 => {
            code.push_str(&format!("    pub fn {ident}(&self) -> i32 {{\n"));
            code.push_str(&format!("        self.scalar({name:?}).as_int() as i32\n"));
            code.push_str("    }\n");
        }
        ResolvedType::I64 => {
            code.push_str(&format!("    pub fn {ident}(&self) -> i64 {{\n"));
            code.push_str(&format!("        self.scalar({name:?}).as_int()\n"));
            code.push_str("    }\n");
        }
        ResolvedType::U32 => {
            code.push_str(&format!("    pub fn {ident}(&self) -> u32 {{\n"));
            code.push_str(&format!("        self.scalar({name:?}).as_uint() as u32\n"));
            code.push_str("    }\n");
        }
        ResolvedType::U64 => {
            code.push_str(&format!("    pub fn {ident}(&self) -> u64 {{\n"));
            code.push_str(&format!("        self.scalar({name:?}).as_uint()\n"));
            code.push_str("    }\n");
        }
        ResolvedType::F32 => {
            code.push_str(&format!("    pub fn {ident}(&self) -> f32 {{\n"));
            code.push_str(&format!("        self.scalar({name:?}).as_float() as f32\n"));
            code.push_str("    }\n");
        }
        ResolvedType::F64 => {
            code.push_str(&format!("    pub fn {ident}(&self) -> f64 {{\n"));
            code.push_str(&format!("        self.scalar({name:?}).as_float()\n"));
            code.push_str("    }\n");
        }
        ResolvedType::Bool => {
            code.push_str(&format!("    pub fn {ident}(&self) -> bool {{\n"));
            code.push_str(&format!("        self.scalar({name:?}).as_bool()\n"));
            code.push_str("    }\n");
        }
        ResolvedType::Text => {
            code.push_str(&format!("    pub fn {ident}(&self) -> String {{\n"));
            code.push_str(&format!("        self.scalar({name:?}).as_text()\n"));
            code.push_str("    }\n");
        }
        ResolvedType::CText => {
            code.push_str(&format!("    pub fn {ident}(&self) -> std::ffi::CString {{\n"));
            code.push_str(&format!(
                "        std::ffi::CString::new(self.scalar({name:?}).as_bytes()).unwrap_or_default()\n"
            ));
            code.push_str("    }\n");
        }
        ResolvedType::Bytes => {
            code.push_str(&format!("    pub fn {ident}(&self) -> Vec<u8> {{\n"));
            code.push_str(&format!("        self.scalar({name:?}).as_bytes()\n"));
            code.push_str("    }\n");
        }
        ResolvedType::Credential => {
            code.push_str(&format!("    pub fn {ident}(&self) -> Credential {{\n"));
            code.push_str(&format!("        match self.inner.get({name:?}) {{\n"));
            code.push_str("            Some(FieldValue::Credential(c)) => c.clone(),\n");
            code.push_str("            _ => Credential::from_stored(Vec::new()),\n");
            code.push_str("        }\n");
            code.push_str("    }\n");
        }
        ResolvedType::NaiveDate | ResolvedType::NaiveTime | ResolvedType::NaiveDateTime => {
            let (variant, ty) = match field.resolved {
                ResolvedType::NaiveDate => ("Date", "chrono::NaiveDate"),
                ResolvedType::NaiveTime => ("Time", "chrono::NaiveTime"),
                _ => ("DateTime", "chrono::NaiveDateTime"),
            };
            code.push_str(&format!("    pub fn {ident}(&self) -> {ty} {{\n"));
            code.push_str(&format!("        match self.inner.get({name:?}) {{\n"));
            code.push_str(&format!(
                "            Some(FieldValue::Temporal(Temporal::{variant}(v))) => *v,\n"
            ));
            code.push_str(&format!("            _ => {ty}::default(),\n"));
            code.push_str("        }\n");
            code.push_str("    }\n");
        }
        ResolvedType::SystemTime => {
            code.push_str(&format!(
                "    pub fn {ident}(&self) -> std::time::SystemTime {{\n"
            ));
            code.push_str(&format!("        match self.inner.get({name:?}) {{\n"));
            code.push_str("            Some(FieldValue::Temporal(Temporal::Stamp(v))) => *v,\n");
            code.push_str("            _ => std::time::UNIX_EPOCH,\n");
            code.push_str("        }\n");
            code.push_str("    }\n");
        }
        ResolvedType::Row(struct_name) => {
            code.push_str(&format!(
                "    pub fn {ident}(&self) -> Option<{struct_name}> {{\n"
            ));
            code.push_str(&format!("        match self.inner.get({name:?}) {{\n"));
            code.push_str(&format!(
                "            Some(FieldValue::Nested(row)) => Some({struct_name} {{ inner: (**row).clone() }}),\n"
            ));
            code.push_str("            _ => None,\n");
            code.push_str("        }\n");
            code.push_str("    }\n");
        }
    }
}

fn render_query_struct(code: &mut String, row: &RowSpec, query: &QuerySpec) {
    let query_struct = &query.struct_name;
    let row_struct = &row.struct_name;

    code.push_str(&format!("/// Query object for table `{}`.\n", query.table));
    if !query.joins.is_empty() {
        code.push_str("///\n");
        code.push_str("/// Reads denormalize across:\n");
        for join in &query.joins {
            code.push_str(&format!(
                "/// - `{}`: joins [`{}`] on `{}.{}`, columns aliased `{}*`\n",
                join.local_column,
                join.referenced_struct,
                join.referenced_table,
                join.referenced_field,
                join.alias_prefix
            ));
        }
    }
    if !query.keyed {
        code.push_str("///\n");
        code.push_str(
            "/// Keyless table: removal by row or filter reports a diagnostic and fails.\n",
        );
    }
    code.push_str(&format!("pub struct {query_struct}<'a> {{\n"));
    code.push_str("    inner: TableQuery<'a>,\n");
    code.push_str("}\n\n");

    code.push_str(&format!("impl<'a> {query_struct}<'a> {{\n"));
    code.push_str("    pub fn filter(mut self, terms: impl IntoIterator<Item = FilterExpr>) -> Self {\n");
    code.push_str("        self.inner = self.inner.filter(terms);\n");
    code.push_str("        self\n");
    code.push_str("    }\n\n");
    code.push_str("    pub fn limit(mut self, limit: u32) -> Self {\n");
    code.push_str("        self.inner = self.inner.limit(limit);\n");
    code.push_str("        self\n");
    code.push_str("    }\n\n");
    code.push_str("    pub fn asc(mut self) -> Self {\n");
    code.push_str("        self.inner = self.inner.asc();\n");
    code.push_str("        self\n");
    code.push_str("    }\n\n");
    code.push_str("    pub fn desc(mut self) -> Self {\n");
    code.push_str("        self.inner = self.inner.desc();\n");
    code.push_str("        self\n");
    code.push_str("    }\n\n");
    code.push_str(&format!("    pub fn fetch(&self) -> Vec<{row_struct}> {{\n"));
    code.push_str("        self.inner\n");
    code.push_str("            .fetch()\n");
    code.push_str("            .into_iter()\n");
    code.push_str(&format!(
        "            .map(|inner| {row_struct} {{ inner }})\n"
    ));
    code.push_str("            .collect()\n");
    code.push_str("    }\n\n");
    code.push_str(&format!(
        "    pub fn insert(&self, row: &mut {row_struct}) -> Result<()> {{\n"
    ));
    code.push_str("        self.inner.insert(&mut row.inner)\n");
    code.push_str("    }\n\n");
    code.push_str(&format!(
        "    pub fn insert_many(&self, rows: &mut [{row_struct}]) -> Result<()> {{\n"
    ));
    code.push_str("        let mut data: Vec<RowData> = rows.iter().map(|r| r.inner.clone()).collect();\n");
    code.push_str("        self.inner.insert_many(&mut data)?;\n");
    code.push_str("        for (row, inner) in rows.iter_mut().zip(data) {\n");
    code.push_str("            row.inner = inner;\n");
    code.push_str("        }\n");
    code.push_str("        Ok(())\n");
    code.push_str("    }\n\n");
    code.push_str(&format!(
        "    pub fn remove(&self, row: &{row_struct}) -> Result<()> {{\n"
    ));
    code.push_str("        self.inner.remove(&row.inner)\n");
    code.push_str("    }\n\n");
    code.push_str(&format!(
        "    pub fn remove_many(&self, rows: &[{row_struct}]) -> Result<()> {{\n"
    ));
    code.push_str("        let data: Vec<RowData> = rows.iter().map(|r| r.inner.clone()).collect();\n");
    code.push_str("        self.inner.remove_many(&data)\n");
    code.push_str("    }\n\n");
    code.push_str("    pub fn remove_matching(&self) -> Result<()> {\n");
    code.push_str("        self.inner.remove_matching()\n");
    code.push_str("    }\n");
    code.push_str("}\n\n");
}

/// Render the parameter list of a constructor, leading comma included.
fn param_list<'a>(fields: impl Iterator<Item = &'a FieldSpec>) -> String {
    let mut out = String::new();
    for field in fields {
        out.push_str(&format!(", {}: {}", field.ident, field.resolved.arg_type()));
    }
    out
}

/// The expression converting one constructor argument into its field value.
fn arg_expr(field: &FieldSpec) -> String {
    let ident = &field.ident;
    match &field.resolved {
        ResolvedType::I32 => format!("FieldValue::Plain(Value::Int(i64::from({ident})))"),
        ResolvedType::I64 => format!("FieldValue::Plain(Value::Int({ident}))"),
        ResolvedType::U32 => format!("FieldValue::Plain(Value::UInt(u64::from({ident})))"),
        ResolvedType::U64 => format!("FieldValue::Plain(Value::UInt({ident}))"),
        ResolvedType::F32 => format!("FieldValue::Plain(Value::Float(f64::from({ident})))"),
        ResolvedType::F64 => format!("FieldValue::Plain(Value::Float({ident}))"),
        ResolvedType::Bool => format!("FieldValue::Plain(Value::Bool({ident}))"),
        ResolvedType::Text => format!("FieldValue::Plain(Value::Text({ident}.to_string()))"),
        ResolvedType::CText => {
            format!("FieldValue::Plain(Value::Bytes({ident}.to_bytes().to_vec()))")
        }
        ResolvedType::Bytes | ResolvedType::Credential => {
            format!("FieldValue::Plain(Value::Bytes({ident}.to_vec()))")
        }
        ResolvedType::NaiveDate => format!("FieldValue::Temporal(Temporal::Date({ident}))"),
        ResolvedType::NaiveTime => format!("FieldValue::Temporal(Temporal::Time({ident}))"),
        ResolvedType::NaiveDateTime => {
            format!("FieldValue::Temporal(Temporal::DateTime({ident}))")
        }
        ResolvedType::SystemTime => format!("FieldValue::Temporal(Temporal::Stamp({ident}))"),
        ResolvedType::Row(_) => format!("FieldValue::Nested(Box::new({ident}.inner.clone()))"),
    }
}

/// The expression reconstructing one column's model definition.
fn column_expr(column: &Column) -> String {
    let mut expr = format!(
        "Column::parse({:?}, {:?})?",
        column.name(),
        column.ty().schema_string()
    );
    if let Some(minsize) = column.minsize() {
        expr.push_str(&format!(".with_minsize({minsize})"));
    }
    if let Some(constraints) = constraints_literal(column.constraints()) {
        expr.push_str(&format!(".with_constraints({constraints})"));
    }
    if let Some(default) = column.default() {
        expr.push_str(&format!(".with_default({})", value_literal(default)));
    }
    expr
}

fn constraints_literal(constraints: Constraints) -> Option<String> {
    let mut parts = Vec::new();
    if constraints.contains(Constraints::PRIMARY_KEY) {
        parts.push("Constraints::PRIMARY_KEY");
    }
    if constraints.contains(Constraints::NOT_NULL) {
        parts.push("Constraints::NOT_NULL");
    }
    if constraints.contains(Constraints::UNIQUE) {
        parts.push("Constraints::UNIQUE");
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

/// Render a canonical default value as a literal expression. Temporal kinds
/// are decomposed into their calendar/clock components; numeric kinds keep
/// signedness and 64-bit width; everything else is a text literal.
fn value_literal(value: &Value) -> String {
    match value {
        Value::Null => "Value::Null".to_string(),
        Value::Int(v) => format!("Value::Int({v}i64)"),
        Value::UInt(v) => format!("Value::UInt({v}u64)"),
        Value::Float(v) => format!("Value::Float({v}f64)"),
        Value::Bool(v) => format!("Value::Bool({v})"),
        Value::Text(s) => format!("Value::Text({s:?}.to_string())"),
        Value::Bytes(b) => format!("Value::Bytes(vec!{b:?})"),
        Value::Date(d) => format!(
            "Value::Date(rowforge_core::Date {{ year: {}, month: {}, day: {} }})",
            d.year, d.month, d.day
        ),
        Value::Time(t) => format!(
            "Value::Time(rowforge_core::Time {{ hour: {}, minute: {}, second: {} }})",
            t.hour, t.minute, t.second
        ),
        Value::DateTime(dt) => format!(
            "Value::DateTime(rowforge_core::DateTime {{ date: rowforge_core::Date {{ year: {}, month: {}, day: {} }}, time: rowforge_core::Time {{ hour: {}, minute: {}, second: {} }} }})",
            dt.date.year, dt.date.month, dt.date.day, dt.time.hour, dt.time.minute, dt.time.second
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowforge_core::Date;

    #[test]
    fn value_literals_decompose_by_kind() {
        assert_eq!(value_literal(&Value::Int(-7)), "Value::Int(-7i64)");
        assert_eq!(
            value_literal(&Value::Text("it's".into())),
            "Value::Text(\"it's\".to_string())"
        );
        assert_eq!(
            value_literal(&Value::Date(Date { year: 2024, month: 5, day: 17 })),
            "Value::Date(rowforge_core::Date { year: 2024, month: 5, day: 17 })"
        );
    }

    #[test]
    fn constraint_literals_or_combine() {
        assert_eq!(constraints_literal(Constraints::NONE), None);
        assert_eq!(
            constraints_literal(Constraints::PRIMARY_KEY | Constraints::UNIQUE).unwrap(),
            "Constraints::PRIMARY_KEY | Constraints::UNIQUE"
        );
    }
}
