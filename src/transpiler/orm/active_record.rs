//! ActiveRecord chains for statements without joins.
//!
//! ```text
//! SELECT name FROM users WHERE age > 18 ORDER BY name LIMIT 5
//! => User.where("age > ?", 18).order(name: :asc).limit(5).select(:name)
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::*;
use crate::inflect::to_model_name;
use crate::parser::scan::mask_quotes;
use crate::transpiler::aggregate::{Aggregate, AggregateFunc};
use crate::transpiler::orm::ActiveRecordJoinGenerator;
use crate::transpiler::traits::*;
use crate::transpiler::{OrmGenerator, Target, dispatch};
use crate::values::{escape_double_quoted, is_iso_date, parse_value, quote};

static BARE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("valid date pattern"));

/// ActiveRecord generator; statements with joins go to
/// [`ActiveRecordJoinGenerator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveRecordGenerator;

impl OrmGenerator for ActiveRecordGenerator {
    fn target(&self) -> Target {
        Target::ActiveRecord
    }

    fn generate_query(&self, query: &ParsedQuery) -> String {
        if !query.joins.is_empty() {
            return ActiveRecordJoinGenerator.generate_query(query);
        }
        dispatch(self, query)
    }

    fn generate_select(&self, query: &ParsedQuery) -> String {
        let mut chain = to_model_name(&query.main_table);
        let where_chain = render_where(&ActiveRecordWhere::new(query), &query.where_clause);

        if let Some(mut aggregate) = Aggregate::scalar(query) {
            aggregate.column = unqualify(query, &aggregate.column);
            chain.push_str(&where_chain);
            chain.push_str(&order_chain(query));
            chain.push_str(&limit_chain(query));
            chain.push_str(&aggregate_call(&aggregate));
            return chain;
        }

        chain.push_str(&where_chain);
        if !query.group_by.is_empty() {
            let groups: Vec<String> = query
                .group_by
                .iter()
                .map(|g| match &g.table {
                    Some(t) if !query.is_main_reference(t) => quote(&g.qualified()),
                    _ => ruby_symbol(&g.name),
                })
                .collect();
            chain.push_str(&format!(".group({})", groups.join(", ")));
        }
        if let Some(having) = query.having.as_deref().filter(|_| query.has_having()) {
            chain.push_str(&format!(".having({})", quote(&dealias(query, having))));
        }
        chain.push_str(&order_chain(query));
        chain.push_str(&limit_chain(query));
        if !query.selects_all() {
            let columns: Vec<String> =
                query.columns.iter().map(|c| select_item(c, query)).collect();
            chain.push_str(&format!(".select({})", columns.join(", ")));
        }
        if query.distinct {
            chain.push_str(".distinct");
        }
        chain
    }

    fn generate_insert(&self, query: &ParsedQuery) -> String {
        let model = to_model_name(&query.main_table);
        let values = query.values.as_deref().unwrap_or_default();
        if query.columns.is_empty() || values.is_empty() {
            return format!("{}.create!()", model);
        }
        let pairs: Vec<String> = query
            .columns
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let value = values.get(idx).map_or(TypedValue::Null, |v| parse_value(v));
                format!("{} {}", ruby_key(&col.name), value.render(Target::ActiveRecord))
            })
            .collect();
        format!("{}.create!({})", model, pairs.join(", "))
    }

    fn generate_update(&self, query: &ParsedQuery) -> String {
        let mut chain = to_model_name(&query.main_table);
        chain.push_str(&render_where(&ActiveRecordWhere::new(query), &query.where_clause));
        chain.push_str(&format!(".update_all({})", assignments(query)));
        chain
    }

    fn generate_delete(&self, query: &ParsedQuery) -> String {
        let mut chain = to_model_name(&query.main_table);
        chain.push_str(&render_where(&ActiveRecordWhere::new(query), &query.where_clause));
        chain.push_str(".destroy_all");
        chain
    }
}

/// `name: value` pairs of an UPDATE.
pub(crate) fn assignments(query: &ParsedQuery) -> String {
    query
        .set
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|a| {
            format!(
                "{} {}",
                ruby_key(&a.name),
                parse_value(&a.value).render(Target::ActiveRecord)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Trailing call of the aggregate short-circuit, e.g. `.distinct.count(:id)`.
pub(crate) fn aggregate_call(aggregate: &Aggregate) -> String {
    if aggregate.is_count_all() {
        return ".count".to_string();
    }
    let method = match aggregate.func {
        AggregateFunc::Count => "count",
        AggregateFunc::Sum => "sum",
        AggregateFunc::Avg => "average",
        AggregateFunc::Min => "minimum",
        AggregateFunc::Max => "maximum",
    };
    let distinct = if aggregate.distinct { ".distinct" } else { "" };
    format!("{}.{}({})", distinct, method, ruby_symbol(&aggregate.column))
}

fn order_chain(query: &ParsedQuery) -> String {
    if query.order_by.is_empty() {
        return String::new();
    }
    let plain = query.order_by.iter().all(|o| {
        is_identifier(&o.name) && o.table.as_deref().is_none_or(|t| query.is_main_reference(t))
    });
    let terms: Vec<String> = if plain {
        query
            .order_by
            .iter()
            .map(|o| format!("{} :{}", ruby_key(&o.name), o.direction.as_str().to_lowercase()))
            .collect()
    } else {
        query
            .order_by
            .iter()
            .map(|o| {
                let name = unqualify(query, &o.qualified());
                quote(&format!("{} {}", name, o.direction.as_str()))
            })
            .collect()
    };
    format!(".order({})", terms.join(", "))
}

pub(crate) fn limit_chain(query: &ParsedQuery) -> String {
    let Some(limit) = query.limit else {
        return String::new();
    };
    match limit.effective_offset() {
        Some(offset) => format!(".limit({}).offset({})", limit.count, offset),
        None => format!(".limit({})", limit.count),
    }
}

fn select_item(column: &ColumnRef, query: &ParsedQuery) -> String {
    let with_alias = |expr: String| {
        let expr = dealias(query, &expr);
        match &column.alias {
            Some(alias) => quote(&format!("{} AS {}", expr, alias)),
            None => quote(&expr),
        }
    };
    if let Some(aggregate) = Aggregate::parse(&column.name) {
        return with_alias(aggregate.to_sql());
    }
    match &column.table {
        Some(t) if !query.is_main_reference(t) => with_alias(column.qualified()),
        Some(_) if column.name == "*" => with_alias(format!("{}.*", query.main_table)),
        _ if column.alias.is_some() || !is_identifier(&column.name) => {
            with_alias(column.name.clone())
        }
        _ => ruby_symbol(&column.name),
    }
}

/// Column name without a main-table or main-alias prefix.
fn unqualify(query: &ParsedQuery, field: &str) -> String {
    match field.split_once('.') {
        Some((table, column)) if query.is_main_reference(table) => column.to_string(),
        _ => field.to_string(),
    }
}

/// Rewrite `alias.` references outside quoted literals to the main table name.
fn dealias(query: &ParsedQuery, sql: &str) -> String {
    let Some(alias) = query.main_alias() else {
        return sql.to_string();
    };
    let Ok(pattern) = Regex::new(&format!(r"(?i)\b{}\.", regex::escape(alias))) else {
        return sql.to_string();
    };
    let masked = mask_quotes(sql);
    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    for m in pattern.find_iter(&masked) {
        out.push_str(&sql[last..m.start()]);
        out.push_str(&query.main_table);
        out.push('.');
        last = m.end();
    }
    out.push_str(&sql[last..]);
    out
}

/// Render a WHERE tree as SQL with `?` placeholders and the ordered
/// parameter list. `field` maps each column name before it is written.
pub(crate) fn parameterize(expr: &WhereExpr, field: &dyn Fn(&str) -> String) -> (String, Vec<String>) {
    let mut params = Vec::new();
    let sql = parameterize_into(expr, field, &mut params, false);
    (sql, params)
}

fn parameterize_into(
    expr: &WhereExpr,
    field: &dyn Fn(&str) -> String,
    params: &mut Vec<String>,
    inside_and: bool,
) -> String {
    match expr {
        WhereExpr::And(children) => children
            .iter()
            .map(|c| parameterize_into(c, field, params, true))
            .collect::<Vec<_>>()
            .join(" AND "),
        WhereExpr::Or(children) => {
            let sql = children
                .iter()
                .map(|c| parameterize_into(c, field, params, false))
                .collect::<Vec<_>>()
                .join(" OR ");
            if inside_and { format!("({})", sql) } else { sql }
        }
        WhereExpr::Not(inner) => {
            let sql = parameterize_into(inner, field, params, false);
            match inner.as_ref() {
                WhereExpr::Leaf(_) => format!("NOT {}", sql),
                _ => format!("NOT ({})", sql),
            }
        }
        WhereExpr::Leaf(predicate) => parameterize_predicate(predicate, field, params),
    }
}

fn render(raw: &str) -> String {
    parse_value(raw).render(Target::ActiveRecord)
}

fn not_kw(not: bool) -> &'static str {
    if not { "NOT " } else { "" }
}

fn parameterize_predicate(
    predicate: &Predicate,
    field: &dyn Fn(&str) -> String,
    params: &mut Vec<String>,
) -> String {
    match predicate {
        Predicate::Comparison { field: f, op, value } => {
            if is_column_ref(value) || value.contains('(') {
                return format!("{} {} {}", field(f), op, value);
            }
            params.push(render(value));
            format!("{} {} ?", field(f), op)
        }
        Predicate::Like {
            field: f,
            not,
            pattern,
            case_insensitive,
        } => {
            params.push(quote(pattern));
            let kw = if *case_insensitive { "ILIKE" } else { "LIKE" };
            format!("{} {}{} ?", field(f), not_kw(*not), kw)
        }
        Predicate::In { field: f, not, values } => {
            let list: Vec<String> = values.iter().map(|v| render(v)).collect();
            params.push(format!("[{}]", list.join(", ")));
            format!("{} {}IN (?)", field(f), not_kw(*not))
        }
        Predicate::Between {
            field: f,
            not,
            start,
            end,
        } => {
            params.push(render(start));
            params.push(render(end));
            format!("{} {}BETWEEN ? AND ?", field(f), not_kw(*not))
        }
        Predicate::IsNull { field: f, not } => format!("{} IS {}NULL", field(f), not_kw(*not)),
        Predicate::InSubquery { .. } | Predicate::Raw { .. } => predicate.to_string(),
    }
}

/// `.where("sql", params...)`.
pub(crate) fn where_call(sql: &str, params: &[String]) -> String {
    let mut args = vec![quote(sql)];
    args.extend(params.iter().cloned());
    format!(".where({})", args.join(", "))
}

/// Calls joined into one chain.
pub(crate) fn chain_calls(clauses: Vec<String>) -> String {
    if clauses.is_empty() {
        return String::new();
    }
    format!(".{}", clauses.join("."))
}

/// `.where` over subquery SQL kept whole; bare ISO dates outside quotes
/// become parameters.
pub(crate) fn date_literal(sql: &str) -> String {
    let masked = mask_quotes(sql);
    let mut text = String::new();
    let mut params = Vec::new();
    let mut last = 0;
    for m in BARE_DATE.find_iter(&masked) {
        if !is_iso_date(m.as_str()) {
            continue;
        }
        text.push_str(&sql[last..m.start()]);
        text.push('?');
        params.push(quote(m.as_str()));
        last = m.end();
    }
    text.push_str(&sql[last..]);
    where_call(&text, &params)
}

/// WHERE renderer for single-table chains.
pub struct ActiveRecordWhere<'q> {
    query: &'q ParsedQuery,
}

impl<'q> ActiveRecordWhere<'q> {
    pub fn new(query: &'q ParsedQuery) -> Self {
        Self { query }
    }

    fn field(&self, name: &str) -> String {
        unqualify(self.query, name)
    }

    fn not_prefix(not: bool) -> &'static str {
        if not { "where.not" } else { "where" }
    }
}

impl WhereDialect for ActiveRecordWhere<'_> {
    type Clause = String;

    fn render_equality(&self, c: &SimpleCondition) -> String {
        let value = c.value.render(Target::ActiveRecord);
        let field = self.field(&c.field);
        match c.operator {
            ComparisonOp::Eq => format!("where({} {})", ruby_key(&field), value),
            ComparisonOp::NotEq => format!("where.not({} {})", ruby_key(&field), value),
            op => format!("where(\"{} {} ?\", {})", escape_double_quoted(&field), op, value),
        }
    }

    fn render_like(&self, c: &LikeCondition) -> String {
        let kw = if c.case_insensitive { "ILIKE" } else { "LIKE" };
        format!(
            "{}(\"{} {} ?\", {})",
            Self::not_prefix(c.not),
            escape_double_quoted(&self.field(&c.field)),
            kw,
            quote(&c.pattern)
        )
    }

    fn render_in(&self, c: &InCondition) -> String {
        let values: Vec<String> = c.values.iter().map(|v| v.render(Target::ActiveRecord)).collect();
        format!(
            "{}({} [{}])",
            Self::not_prefix(c.not),
            ruby_key(&self.field(&c.field)),
            values.join(", ")
        )
    }

    fn render_between(&self, c: &BetweenCondition) -> String {
        format!(
            "{}({} {}..{})",
            Self::not_prefix(c.not),
            ruby_key(&self.field(&c.field)),
            c.start.render(Target::ActiveRecord),
            c.end.render(Target::ActiveRecord)
        )
    }

    fn render_null(&self, c: &NullCheck) -> String {
        format!("{}({} nil)", Self::not_prefix(c.not), ruby_key(&self.field(&c.field)))
    }

    fn assemble(&self, clauses: Vec<String>) -> String {
        chain_calls(clauses)
    }

    /// Equalities share hashes, but a field never repeats within one hash.
    /// Each inequality is its own `where.not`.
    fn render_consolidated(&self, conditions: &[SimpleCondition]) -> String {
        let mut hashes: Vec<Vec<(String, String)>> = Vec::new();
        for c in conditions.iter().filter(|c| c.operator == ComparisonOp::Eq) {
            let field = self.field(&c.field);
            let pair = format!("{} {}", ruby_key(&field), c.value.render(Target::ActiveRecord));
            match hashes.iter_mut().find(|h| h.iter().all(|(f, _)| *f != field)) {
                Some(hash) => hash.push((field, pair)),
                None => hashes.push(vec![(field, pair)]),
            }
        }
        let mut chain = String::new();
        for hash in hashes {
            let pairs: Vec<String> = hash.into_iter().map(|(_, pair)| pair).collect();
            chain.push_str(&format!(".where({})", pairs.join(", ")));
        }
        for c in conditions.iter().filter(|c| c.operator == ComparisonOp::NotEq) {
            chain.push_str(&format!(
                ".where.not({} {})",
                ruby_key(&self.field(&c.field)),
                c.value.render(Target::ActiveRecord)
            ));
        }
        let ranges: Vec<&SimpleCondition> = conditions
            .iter()
            .filter(|c| !matches!(c.operator, ComparisonOp::Eq | ComparisonOp::NotEq))
            .collect();
        if !ranges.is_empty() {
            let sql: Vec<String> = ranges
                .iter()
                .map(|c| format!("{} {} ?", self.field(&c.field), c.operator))
                .collect();
            let params: Vec<String> = ranges
                .iter()
                .map(|c| c.value.render(Target::ActiveRecord))
                .collect();
            chain.push_str(&where_call(&sql.join(" AND "), &params));
        }
        chain
    }

    fn render_literal(&self, sql: &str) -> String {
        date_literal(&dealias(self.query, sql))
    }

    fn render_raw(&self, expr: &WhereExpr) -> String {
        let (sql, params) = parameterize(expr, &|f: &str| self.field(f));
        where_call(&dealias(self.query, &sql), &params)
    }
}
