//! ActiveRecord chains for statements with joins.
//!
//! Conventional foreign-key joins become `.joins(:posts)`; anything else is
//! embedded as raw SQL. Field names in WHERE are qualified with the main
//! table (or its alias) since several tables are in scope.

use crate::ast::*;
use crate::inflect::to_model_name;
use crate::transpiler::aggregate::Aggregate;
use crate::transpiler::joins::classify;
use crate::transpiler::orm::active_record::{
    aggregate_call, assignments, chain_calls, date_literal, limit_chain, parameterize, where_call,
};
use crate::transpiler::traits::*;
use crate::transpiler::{OrmGenerator, Target};
use crate::values::quote;

#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveRecordJoinGenerator;

impl ActiveRecordJoinGenerator {
    fn base_chain(&self, query: &ParsedQuery) -> String {
        let mut chain = to_model_name(&query.main_table);
        if let Some(alias) = query.main_alias() {
            chain.push_str(&format!(
                ".from({})",
                quote(&format!("{} {}", query.main_table, alias))
            ));
        }
        chain.push_str(&join_chain(query));
        chain
    }

    fn where_chain(&self, query: &ParsedQuery) -> String {
        let qualifier = query.main_alias().unwrap_or(&query.main_table).to_string();
        render_where(&ActiveRecordJoinWhere { qualifier }, &query.where_clause)
    }
}

impl OrmGenerator for ActiveRecordJoinGenerator {
    fn target(&self) -> Target {
        Target::ActiveRecord
    }

    fn generate_select(&self, query: &ParsedQuery) -> String {
        let mut chain = self.base_chain(query);
        chain.push_str(&self.where_chain(query));

        if let Some(aggregate) = Aggregate::scalar(query) {
            chain.push_str(&order_chain(query));
            chain.push_str(&limit_chain(query));
            chain.push_str(&aggregate_call(&aggregate));
            return chain;
        }

        if !query.group_by.is_empty() {
            let groups: Vec<String> = query
                .group_by
                .iter()
                .map(|g| quote(&qualify(&g.qualified(), query)))
                .collect();
            chain.push_str(&format!(".group({})", groups.join(", ")));
        }
        if let Some(having) = query.having.as_deref().filter(|_| query.has_having()) {
            chain.push_str(&format!(".having({})", quote(having)));
        }
        chain.push_str(&order_chain(query));
        chain.push_str(&limit_chain(query));
        if !query.selects_all() {
            let columns: Vec<String> = query
                .columns
                .iter()
                .map(|c| {
                    let expr = match Aggregate::parse(&c.name) {
                        Some(aggregate) => aggregate.to_sql(),
                        None => c.qualified(),
                    };
                    match &c.alias {
                        Some(alias) => quote(&format!("{} AS {}", expr, alias)),
                        None => quote(&expr),
                    }
                })
                .collect();
            chain.push_str(&format!(".select({})", columns.join(", ")));
        }
        if query.distinct {
            chain.push_str(".distinct");
        }
        chain
    }

    fn generate_insert(&self, _query: &ParsedQuery) -> String {
        self.target().comment("INSERT with JOIN is not supported by ActiveRecord")
    }

    fn generate_update(&self, query: &ParsedQuery) -> String {
        let mut chain = self.base_chain(query);
        chain.push_str(&self.where_chain(query));
        chain.push_str(&format!(".update_all({})", assignments(query)));
        chain
    }

    fn generate_delete(&self, query: &ParsedQuery) -> String {
        let mut chain = self.base_chain(query);
        chain.push_str(&self.where_chain(query));
        chain.push_str(".destroy_all");
        chain
    }
}

/// `.joins(:posts)`, `.left_joins(:comments)` and raw `.joins("...")` calls.
fn join_chain(query: &ParsedQuery) -> String {
    let aliased_main = query.main_alias().is_some();
    let mut inner = Vec::new();
    let mut left = Vec::new();
    let mut raw = Vec::new();

    for join in &query.joins {
        let association = classify(join, query).filter(|_| !aliased_main && join.alias.is_none());
        match (association, join.kind) {
            (Some(a), JoinKind::Plain | JoinKind::Inner) => inner.push(ruby_symbol(a.name())),
            (Some(a), JoinKind::Left) => left.push(ruby_symbol(a.name())),
            _ => raw.push(format!(".joins({})", quote(&join.to_sql()))),
        }
    }

    let mut chain = String::new();
    if !inner.is_empty() {
        chain.push_str(&format!(".joins({})", inner.join(", ")));
    }
    if !left.is_empty() {
        chain.push_str(&format!(".left_joins({})", left.join(", ")));
    }
    for fragment in raw {
        chain.push_str(&fragment);
    }
    chain
}

/// Prefix a bare column with the main table reference.
fn qualify(name: &str, query: &ParsedQuery) -> String {
    if name.contains('.') || !is_identifier(name) {
        return name.to_string();
    }
    let qualifier = query.main_alias().unwrap_or(&query.main_table);
    format!("{}.{}", qualifier, name)
}

fn order_chain(query: &ParsedQuery) -> String {
    if query.order_by.is_empty() {
        return String::new();
    }
    let terms: Vec<String> = query
        .order_by
        .iter()
        .map(|o| quote(&format!("{} {}", o.qualified(), o.direction.as_str())))
        .collect();
    format!(".order({})", terms.join(", "))
}

/// WHERE renderer that qualifies bare field names.
pub struct ActiveRecordJoinWhere {
    qualifier: String,
}

impl ActiveRecordJoinWhere {
    fn field(&self, name: &str) -> String {
        if name.contains('.') || !is_identifier(name) {
            name.to_string()
        } else {
            format!("{}.{}", self.qualifier, name)
        }
    }

    fn call(not: bool, sql: String, params: &[String]) -> String {
        let mut args = vec![quote(&sql)];
        args.extend(params.iter().cloned());
        let method = if not { "where.not" } else { "where" };
        format!("{}({})", method, args.join(", "))
    }
}

impl WhereDialect for ActiveRecordJoinWhere {
    type Clause = String;

    fn render_equality(&self, c: &SimpleCondition) -> String {
        let value = c.value.render(Target::ActiveRecord);
        let field = self.field(&c.field);
        match c.operator {
            ComparisonOp::NotEq => Self::call(true, format!("{} = ?", field), &[value]),
            op => Self::call(false, format!("{} {} ?", field, op), &[value]),
        }
    }

    fn render_like(&self, c: &LikeCondition) -> String {
        let kw = if c.case_insensitive { "ILIKE" } else { "LIKE" };
        Self::call(
            c.not,
            format!("{} {} ?", self.field(&c.field), kw),
            &[quote(&c.pattern)],
        )
    }

    fn render_in(&self, c: &InCondition) -> String {
        let values: Vec<String> = c.values.iter().map(|v| v.render(Target::ActiveRecord)).collect();
        Self::call(
            c.not,
            format!("{} IN (?)", self.field(&c.field)),
            &[format!("[{}]", values.join(", "))],
        )
    }

    fn render_between(&self, c: &BetweenCondition) -> String {
        Self::call(
            c.not,
            format!("{} BETWEEN ? AND ?", self.field(&c.field)),
            &[
                c.start.render(Target::ActiveRecord),
                c.end.render(Target::ActiveRecord),
            ],
        )
    }

    fn render_null(&self, c: &NullCheck) -> String {
        let check = if c.not { "IS NOT NULL" } else { "IS NULL" };
        Self::call(false, format!("{} {}", self.field(&c.field), check), &[])
    }

    fn assemble(&self, clauses: Vec<String>) -> String {
        chain_calls(clauses)
    }

    fn render_consolidated(&self, conditions: &[SimpleCondition]) -> String {
        let sql: Vec<String> = conditions
            .iter()
            .map(|c| format!("{} {} ?", self.field(&c.field), c.operator))
            .collect();
        let params: Vec<String> = conditions
            .iter()
            .map(|c| c.value.render(Target::ActiveRecord))
            .collect();
        where_call(&sql.join(" AND "), &params)
    }

    fn render_literal(&self, sql: &str) -> String {
        date_literal(sql)
    }

    fn render_raw(&self, expr: &WhereExpr) -> String {
        let (sql, params) = parameterize(expr, &|f: &str| self.field(f));
        where_call(&sql, &params)
    }
}
