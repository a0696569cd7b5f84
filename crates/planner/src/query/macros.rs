/// `table_ref!("accounthierarchy")` or `table_ref!(Some("ibcust"), "applicant_rtab")`.
/// The schema argument is an `Option<&str>`.
#[macro_export]
macro_rules! table_ref {
    ($name:expr) => {
        $crate::table_ref!(None::<&str>, $name)
    };
    ($schema:expr, $name:expr) => {{
        let schema: Option<&str> = $schema;
        $crate::query::ast::common::TableRef {
            schema: schema.map(str::to_string),
            name: $name.to_string(),
        }
    }};
}
