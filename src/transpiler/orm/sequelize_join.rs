//! Sequelize calls for statements with joins, expressed through `include`.

use crate::ast::*;
use crate::inflect::to_model_name;
use crate::parser::parse_where_expr;
use crate::transpiler::aggregate::Aggregate;
use crate::transpiler::joins::{classify, find_association, is_key_condition};
use crate::transpiler::orm::sequelize::{
    SequelizeWhere, aggregate_call, assignments, attribute, group_option, limit_options, literal,
    order_option, where_option,
};
use crate::transpiler::traits::*;
use crate::transpiler::{OrmGenerator, Target};
use crate::values::quote;

#[derive(Debug, Clone, Copy, Default)]
pub struct SequelizeJoinGenerator;

impl OrmGenerator for SequelizeJoinGenerator {
    fn target(&self) -> Target {
        Target::Sequelize
    }

    fn generate_select(&self, query: &ParsedQuery) -> String {
        let model = to_model_name(&query.main_table);
        let dialect = SequelizeWhere::wrapping_literals(query);
        let include = format!("include: [{}]", full_includes(query).join(", "));

        if let Some(aggregate) = Aggregate::scalar(query) {
            let mut options = vec![include];
            options.extend(where_option(&dialect, query));
            options.extend(order_option(query));
            options.extend(limit_options(query));
            return aggregate_call(&model, &aggregate, options);
        }

        let mut options = vec![include];
        let main_wildcard = query.columns.iter().any(|c| {
            c.name == "*" && c.table.as_deref().is_some_and(|t| query.is_main_reference(t))
        });
        if !query.selects_all() && !main_wildcard {
            let attributes: Vec<String> = query
                .columns
                .iter()
                .filter(|c| owning_join(c, query).is_none() && c.name != "*")
                .map(|c| attribute(c, query))
                .collect();
            options.push(format!("attributes: [{}]", attributes.join(", ")));
        }
        options.extend(where_option(&dialect, query));
        options.extend(group_option(query));
        if let Some(having) = query.having.as_deref().filter(|_| query.has_having()) {
            options.push(format!("having: {}", having_object(having, &dialect)));
        }
        options.extend(order_option(query));
        options.extend(limit_options(query));
        format!("{}.findAll({{{}}})", model, options.join(", "))
    }

    fn generate_insert(&self, _query: &ParsedQuery) -> String {
        self.target().comment("INSERT with JOIN is not supported by Sequelize")
    }

    fn generate_update(&self, query: &ParsedQuery) -> String {
        let where_clause =
            render_where(&SequelizeWhere::wrapping_literals(query), &query.where_clause);
        format!(
            "{}.update({}, {{ where: {}, include: [{}] }})",
            to_model_name(&query.main_table),
            assignments(query),
            where_clause,
            basic_includes(query).join(", ")
        )
    }

    fn generate_delete(&self, query: &ParsedQuery) -> String {
        let where_clause =
            render_where(&SequelizeWhere::wrapping_literals(query), &query.where_clause);
        format!(
            "{}.destroy({{ where: {}, include: [{}] }})",
            to_model_name(&query.main_table),
            where_clause,
            basic_includes(query).join(", ")
        )
    }
}

/// The join a selected column belongs to, if it is a plain joined column.
fn owning_join<'q>(column: &ColumnRef, query: &'q ParsedQuery) -> Option<&'q JoinClause> {
    if Aggregate::parse(&column.name).is_some() {
        return None;
    }
    let table = column.table.as_deref()?;
    if query.is_main_reference(table) {
        return None;
    }
    query.join_for(table)
}

fn is_optional(join: &JoinClause) -> bool {
    matches!(join.kind, JoinKind::Left | JoinKind::Right | JoinKind::Full)
}

/// Properties shared by every include: model, alias and `required`.
fn include_head(join: &JoinClause) -> Vec<String> {
    let mut props = vec![format!("model: {}", to_model_name(&join.table))];
    if let Some(alias) = &join.alias {
        props.push(format!("as: {}", quote(alias)));
    }
    props
}

fn raw_on(join: &JoinClause) -> String {
    format!("on: {{ [Op.and]: [{}] }}", literal(&join.on))
}

/// Includes for update and delete: no attributes or filters.
fn basic_includes(query: &ParsedQuery) -> Vec<String> {
    query
        .joins
        .iter()
        .map(|join| {
            let mut props = include_head(join);
            props.push(format!("required: {}", !is_optional(join)));
            if classify(join, query).is_none() {
                props.push(raw_on(join));
            }
            format!("{{ {} }}", props.join(", "))
        })
        .collect()
}

/// Includes for SELECT, carrying per-table attributes and ON filters.
fn full_includes(query: &ParsedQuery) -> Vec<String> {
    query
        .joins
        .iter()
        .map(|join| {
            let association = find_association(join, query);
            let mut props = include_head(join);

            if association.is_some() {
                if let Some(filter) = include_filter(join, query) {
                    props.push(format!("where: {}", filter));
                }
            }

            if !query.selects_all() {
                let wildcard = query.columns.iter().any(|c| {
                    c.name == "*" && c.table.as_deref().is_some_and(|t| joined_ref(join, t))
                });
                if !wildcard {
                    let attributes: Vec<String> = query
                        .columns
                        .iter()
                        .filter(|c| owning_join(c, query).is_some_and(|j| std::ptr::eq(j, join)))
                        .map(|c| match &c.alias {
                            Some(alias) => format!("[{}, {}]", quote(&c.name), quote(alias)),
                            None => quote(&c.name),
                        })
                        .collect();
                    props.push(format!("attributes: [{}]", attributes.join(", ")));
                }
            }

            props.push(format!("required: {}", !is_optional(join)));
            if join.kind == JoinKind::Right {
                props.push("right: true".to_string());
            }
            if association.is_none() {
                props.push(raw_on(join));
            }
            format!("{{ {} }}", props.join(", "))
        })
        .collect()
}

fn joined_ref(join: &JoinClause, name: &str) -> bool {
    name.eq_ignore_ascii_case(join.reference()) || name.eq_ignore_ascii_case(&join.table)
}

/// Extra ON conditions of an association join, as an include `where`.
///
/// The foreign-key equality is dropped; `joined.column op value` becomes a
/// where-object and anything else a literal.
fn include_filter(join: &JoinClause, query: &ParsedQuery) -> Option<String> {
    let tree = parse_where_expr(&join.on)?;
    if tree.has_or() {
        return None;
    }
    let dialect = SequelizeWhere::new(query);
    let mut parts = Vec::new();
    for conjunct in tree.conjuncts() {
        match conjunct {
            WhereExpr::Leaf(key) if is_key_condition(&key.to_string(), join, query) => continue,
            WhereExpr::Leaf(predicate) => match predicate.field().and_then(|f| f.split_once('.')) {
                Some((table, column)) if joined_ref(join, table) => {
                    let local = rename_field(predicate, column);
                    parts.push(dialect.render_tree(&WhereExpr::Leaf(local)));
                }
                _ => parts.push(literal(&predicate.to_string())),
            },
            other => parts.push(literal(&other.to_string())),
        }
    }
    match parts.len() {
        0 => None,
        1 => parts.pop(),
        _ => Some(format!("{{ [Op.and]: [{}] }}", parts.join(", "))),
    }
}

fn rename_field(predicate: &Predicate, name: &str) -> Predicate {
    let mut local = predicate.clone();
    match &mut local {
        Predicate::Comparison { field, .. }
        | Predicate::Like { field, .. }
        | Predicate::In { field, .. }
        | Predicate::InSubquery { field, .. }
        | Predicate::Between { field, .. }
        | Predicate::IsNull { field, .. } => *field = name.to_string(),
        Predicate::Raw { .. } => {}
    }
    local
}

/// A single `column op value` HAVING becomes an object; anything with a
/// qualified name or a function call stays literal.
fn having_object(having: &str, dialect: &SequelizeWhere<'_>) -> String {
    let text = having.trim();
    if !text.contains('.') && !text.contains('(') {
        if let Some(expr @ WhereExpr::Leaf(Predicate::Comparison { .. })) = parse_where_expr(text) {
            return dialect.render_tree(&expr);
        }
    }
    literal(text)
}
