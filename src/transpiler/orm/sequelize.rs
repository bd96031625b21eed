//! Sequelize calls for statements without joins.
//!
//! ```text
//! SELECT name FROM users WHERE age > 18 LIMIT 5
//! => User.findAll({attributes: ["name"], where: { age: { [Op.gt]: 18 } }, limit: 5})
//! ```

use indexmap::IndexMap;

use crate::ast::*;
use crate::inflect::to_model_name;
use crate::transpiler::aggregate::{Aggregate, AggregateFunc};
use crate::transpiler::orm::SequelizeJoinGenerator;
use crate::transpiler::traits::*;
use crate::transpiler::{OrmGenerator, Target, dispatch};
use crate::values::{parse_value, quote};

#[derive(Debug, Clone, Copy, Default)]
pub struct SequelizeGenerator;

impl OrmGenerator for SequelizeGenerator {
    fn target(&self) -> Target {
        Target::Sequelize
    }

    fn generate_query(&self, query: &ParsedQuery) -> String {
        if !query.joins.is_empty() {
            return SequelizeJoinGenerator.generate_query(query);
        }
        dispatch(self, query)
    }

    fn generate_select(&self, query: &ParsedQuery) -> String {
        let model = to_model_name(&query.main_table);
        let dialect = SequelizeWhere::new(query);
        let where_option = where_option(&dialect, query);

        if let Some(aggregate) = Aggregate::scalar(query) {
            let mut options: Vec<String> = where_option.into_iter().collect();
            options.extend(order_option(query));
            options.extend(limit_options(query));
            return aggregate_call(&model, &aggregate, options);
        }

        let mut options = Vec::new();
        if !query.selects_all() {
            let mut attributes: Vec<String> =
                query.columns.iter().map(|c| attribute(c, query)).collect();
            if query.distinct {
                if let Some(first) = query.columns.first().filter(|c| is_identifier(&c.name)) {
                    attributes[0] = format!(
                        "[Sequelize.fn(\"DISTINCT\", Sequelize.col({})), {}]",
                        quote(&first.qualified()),
                        quote(first.alias.as_deref().unwrap_or(&first.name))
                    );
                }
            }
            options.push(format!("attributes: [{}]", attributes.join(", ")));
        }
        options.extend(where_option);
        options.extend(group_option(query));
        if let Some(having) = query.having.as_deref().filter(|_| query.has_having()) {
            options.push(format!("having: {}", literal(having)));
        }
        options.extend(order_option(query));
        options.extend(limit_options(query));
        format!("{}.findAll({{{}}})", model, options.join(", "))
    }

    fn generate_insert(&self, query: &ParsedQuery) -> String {
        let model = to_model_name(&query.main_table);
        let values = query.values.as_deref().unwrap_or_default();
        if query.columns.is_empty() || values.is_empty() {
            return format!("{}.create({{}})", model);
        }
        let pairs: Vec<String> = query
            .columns
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let value = values.get(idx).map_or(TypedValue::Null, |v| parse_value(v));
                format!("{}: {}", js_key(&col.name), value.render(Target::Sequelize))
            })
            .collect();
        format!("{}.create({{ {} }})", model, pairs.join(", "))
    }

    fn generate_update(&self, query: &ParsedQuery) -> String {
        let where_clause = render_where(&SequelizeWhere::new(query), &query.where_clause);
        format!(
            "{}.update({}, {{ where: {} }})",
            to_model_name(&query.main_table),
            assignments(query),
            where_clause
        )
    }

    fn generate_delete(&self, query: &ParsedQuery) -> String {
        let where_clause = render_where(&SequelizeWhere::new(query), &query.where_clause);
        format!(
            "{}.destroy({{ where: {} }})",
            to_model_name(&query.main_table),
            where_clause
        )
    }
}

/// `Sequelize.literal("...")`.
pub(crate) fn literal(sql: &str) -> String {
    format!("Sequelize.literal({})", quote(sql))
}

/// `{ name: value }` object of an UPDATE.
pub(crate) fn assignments(query: &ParsedQuery) -> String {
    let pairs: Vec<String> = query
        .set
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|a| {
            format!(
                "{}: {}",
                js_key(&a.name),
                parse_value(&a.value).render(Target::Sequelize)
            )
        })
        .collect();
    if pairs.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", pairs.join(", "))
    }
}

pub(crate) fn where_option(dialect: &SequelizeWhere<'_>, query: &ParsedQuery) -> Option<String> {
    if !query.has_where() {
        return None;
    }
    Some(format!("where: {}", render_where(dialect, &query.where_clause)))
}

pub(crate) fn group_option(query: &ParsedQuery) -> Option<String> {
    if query.group_by.is_empty() {
        return None;
    }
    let groups: Vec<String> = query.group_by.iter().map(|g| quote(&g.qualified())).collect();
    Some(format!("group: [{}]", groups.join(", ")))
}

pub(crate) fn order_option(query: &ParsedQuery) -> Option<String> {
    if query.order_by.is_empty() {
        return None;
    }
    let terms: Vec<String> = query
        .order_by
        .iter()
        .map(|o| {
            let direction = quote(o.direction.as_str());
            match &o.table {
                Some(t) if !query.is_main_reference(t) => {
                    format!("[Sequelize.col({}), {}]", quote(&o.qualified()), direction)
                }
                _ if !is_identifier(&o.name) => format!("[{}, {}]", literal(&o.name), direction),
                _ => format!("[{}, {}]", quote(&o.name), direction),
            }
        })
        .collect();
    Some(format!("order: [{}]", terms.join(", ")))
}

pub(crate) fn limit_options(query: &ParsedQuery) -> Vec<String> {
    let Some(limit) = query.limit else {
        return Vec::new();
    };
    let mut options = vec![format!("limit: {}", limit.count)];
    if let Some(offset) = limit.effective_offset() {
        options.push(format!("offset: {}", offset));
    }
    options
}

/// `Sequelize.fn(...)` for an aggregate column.
pub(crate) fn aggregate_fn(aggregate: &Aggregate) -> String {
    let argument = if aggregate.is_count_all() {
        literal("*")
    } else if aggregate.distinct {
        literal(&aggregate.argument())
    } else {
        format!("Sequelize.col({})", quote(&aggregate.column))
    };
    format!("Sequelize.fn({}, {})", quote(aggregate.func.as_str()), argument)
}

/// One entry of `attributes`.
pub(crate) fn attribute(column: &ColumnRef, query: &ParsedQuery) -> String {
    let expr = if let Some(aggregate) = Aggregate::parse(&column.name) {
        aggregate_fn(&aggregate)
    } else {
        match &column.table {
            Some(t) if !query.is_main_reference(t) => {
                format!("Sequelize.col({})", quote(&column.qualified()))
            }
            _ if !is_identifier(&column.name) => literal(&column.name),
            _ => quote(&column.name),
        }
    };
    match &column.alias {
        Some(alias) => format!("[{}, {}]", expr, quote(alias)),
        None => expr,
    }
}

/// Scalar call for the aggregate short-circuit, e.g. `User.count({ where: ... })`.
pub(crate) fn aggregate_call(model: &str, aggregate: &Aggregate, mut options: Vec<String>) -> String {
    let object = |options: &[String]| format!("{{ {} }}", options.join(", "));
    let trailing = |options: &[String]| {
        if options.is_empty() {
            String::new()
        } else {
            format!(", {}", object(options))
        }
    };
    let column = quote(&aggregate.column);

    if aggregate.func == AggregateFunc::Count {
        if aggregate.is_count_all() {
            if options.is_empty() {
                return format!("{}.count()", model);
            }
            return format!("{}.count({})", model, object(&options));
        }
        options.push(format!("col: {}", column));
        if aggregate.distinct {
            options.push("distinct: true".to_string());
        }
        return format!("{}.count({})", model, object(&options));
    }

    if aggregate.distinct {
        options.push("distinct: true".to_string());
        let func = aggregate.func.as_str().to_lowercase();
        return format!("{}.aggregate({}, {}{})", model, column, quote(&func), trailing(&options));
    }
    match aggregate.func {
        AggregateFunc::Avg => format!(
            "{}.aggregate({}, \"avg\"{})",
            model,
            column,
            trailing(&options)
        ),
        func => format!(
            "{}.{}({}{})",
            model,
            func.as_str().to_lowercase(),
            column,
            trailing(&options)
        ),
    }
}

/// One rendered WHERE condition: a property, optionally under an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct SequelizeClause {
    key: String,
    op: Option<&'static str>,
    value: String,
}

fn comparison_op(op: ComparisonOp) -> Option<&'static str> {
    match op {
        ComparisonOp::Eq => None,
        ComparisonOp::NotEq => Some("Op.ne"),
        ComparisonOp::Gte => Some("Op.gte"),
        ComparisonOp::Lte => Some("Op.lte"),
        ComparisonOp::Gt => Some("Op.gt"),
        ComparisonOp::Lt => Some("Op.lt"),
    }
}

fn like_op(not: bool, case_insensitive: bool) -> &'static str {
    match (not, case_insensitive) {
        (false, false) => "Op.like",
        (true, false) => "Op.notLike",
        (false, true) => "Op.iLike",
        (true, true) => "Op.notILike",
    }
}

fn list(values: impl Iterator<Item = String>) -> String {
    format!("[{}]", values.collect::<Vec<_>>().join(", "))
}

fn has_repeated_op(ops: &[(Option<&'static str>, String)]) -> bool {
    let mut seen = Vec::new();
    ops.iter().any(|(op, _)| {
        let op = op.unwrap_or("Op.eq");
        if seen.contains(&op) {
            return true;
        }
        seen.push(op);
        false
    })
}

/// `key: value`, or `key: { [Op.x]: value, ... }`.
fn property(key: &str, ops: &[(Option<&'static str>, String)]) -> String {
    match ops {
        [(None, value)] => format!("{}: {}", key, value),
        _ => {
            let inner: Vec<String> = ops
                .iter()
                .map(|(op, value)| format!("[{}]: {}", op.unwrap_or("Op.eq"), value))
                .collect();
            format!("{}: {{ {} }}", key, inner.join(", "))
        }
    }
}

/// WHERE renderer producing Sequelize where-objects.
pub struct SequelizeWhere<'q> {
    query: &'q ParsedQuery,
    wrap_literal: bool,
}

impl<'q> SequelizeWhere<'q> {
    pub fn new(query: &'q ParsedQuery) -> Self {
        Self {
            query,
            wrap_literal: false,
        }
    }

    /// Literal clauses are nested under `[Op.and]`, as joined finders expect.
    pub fn wrapping_literals(query: &'q ParsedQuery) -> Self {
        Self {
            query,
            wrap_literal: true,
        }
    }

    /// Property key for `field`: main-table prefixes are dropped, other
    /// tables use Sequelize's `$table.column$` syntax.
    pub fn key(&self, field: &str) -> String {
        match field.split_once('.') {
            Some((table, column)) if self.query.is_main_reference(table) => js_key(column),
            Some(_) => quote(&format!("${}$", field)),
            None => js_key(field),
        }
    }

    fn clause(&self, field: &str, op: Option<&'static str>, value: String) -> SequelizeClause {
        SequelizeClause {
            key: self.key(field),
            op,
            value,
        }
    }

    fn operand(raw: &str) -> String {
        if is_column_ref(raw) {
            format!("Sequelize.col({})", quote(raw.trim()))
        } else if raw.contains('(') {
            literal(raw.trim())
        } else {
            parse_value(raw).render(Target::Sequelize)
        }
    }

    /// A tree leaf as a where-object, or a literal for unclassified text.
    fn leaf(&self, predicate: &Predicate) -> String {
        let render = |raw: &String| parse_value(raw).render(Target::Sequelize);
        let clause = match predicate {
            Predicate::Comparison { field, op, value } => {
                self.clause(field, comparison_op(*op), Self::operand(value))
            }
            Predicate::Like {
                field,
                not,
                pattern,
                case_insensitive,
            } => self.clause(field, Some(like_op(*not, *case_insensitive)), quote(pattern)),
            Predicate::In { field, not, values } => self.clause(
                field,
                Some(if *not { "Op.notIn" } else { "Op.in" }),
                list(values.iter().map(render)),
            ),
            Predicate::Between {
                field,
                not,
                start,
                end,
            } => self.clause(
                field,
                Some(if *not { "Op.notBetween" } else { "Op.between" }),
                list([render(start), render(end)].into_iter()),
            ),
            Predicate::IsNull { field, not } => self.null_clause(field, *not),
            Predicate::InSubquery { .. } | Predicate::Raw { .. } => {
                return literal(&predicate.to_string());
            }
        };
        self.assemble(vec![clause])
    }

    fn null_clause(&self, field: &str, not: bool) -> SequelizeClause {
        let op = if not { "Op.ne" } else { "Op.is" };
        self.clause(field, Some(op), "null".to_string())
    }

    pub fn render_tree(&self, expr: &WhereExpr) -> String {
        let group = |op: &str, children: &[WhereExpr]| {
            let items: Vec<String> = children.iter().map(|c| self.render_tree(c)).collect();
            format!("{{ [{}]: [{}] }}", op, items.join(", "))
        };
        match expr {
            WhereExpr::And(children) => group("Op.and", children),
            WhereExpr::Or(children) => group("Op.or", children),
            WhereExpr::Not(inner) => format!("{{ [Op.not]: {} }}", self.render_tree(inner)),
            WhereExpr::Leaf(predicate) => self.leaf(predicate),
        }
    }
}

impl WhereDialect for SequelizeWhere<'_> {
    type Clause = SequelizeClause;

    fn render_equality(&self, c: &SimpleCondition) -> SequelizeClause {
        self.clause(
            &c.field,
            comparison_op(c.operator),
            c.value.render(Target::Sequelize),
        )
    }

    fn render_like(&self, c: &LikeCondition) -> SequelizeClause {
        self.clause(&c.field, Some(like_op(c.not, c.case_insensitive)), quote(&c.pattern))
    }

    fn render_in(&self, c: &InCondition) -> SequelizeClause {
        let op = if c.not { "Op.notIn" } else { "Op.in" };
        self.clause(
            &c.field,
            Some(op),
            list(c.values.iter().map(|v| v.render(Target::Sequelize))),
        )
    }

    fn render_between(&self, c: &BetweenCondition) -> SequelizeClause {
        let op = if c.not { "Op.notBetween" } else { "Op.between" };
        self.clause(
            &c.field,
            Some(op),
            list([c.start.render(Target::Sequelize), c.end.render(Target::Sequelize)].into_iter()),
        )
    }

    fn render_null(&self, c: &NullCheck) -> SequelizeClause {
        self.null_clause(&c.field, c.not)
    }

    /// Conditions on the same property share one operator object. An operator
    /// never repeats within one object: such a property's conditions go into
    /// a shared `[Op.and]` array instead.
    fn assemble(&self, clauses: Vec<SequelizeClause>) -> String {
        let mut fields: IndexMap<String, Vec<(Option<&'static str>, String)>> = IndexMap::new();
        for clause in clauses {
            fields
                .entry(clause.key)
                .or_default()
                .push((clause.op, clause.value));
        }
        if fields.is_empty() {
            return "{}".to_string();
        }
        let mut properties = Vec::new();
        let mut conjuncts = Vec::new();
        for (key, ops) in fields {
            if has_repeated_op(&ops) {
                conjuncts.extend(
                    ops.into_iter()
                        .map(|op| format!("{{ {} }}", property(&key, &[op]))),
                );
            } else {
                properties.push(property(&key, &ops));
            }
        }
        if !conjuncts.is_empty() {
            properties.push(format!("[Op.and]: [{}]", conjuncts.join(", ")));
        }
        format!("{{ {} }}", properties.join(", "))
    }

    fn render_consolidated(&self, conditions: &[SimpleCondition]) -> String {
        self.assemble(conditions.iter().map(|c| self.render_equality(c)).collect())
    }

    fn render_literal(&self, sql: &str) -> String {
        if self.wrap_literal {
            format!("{{ [Op.and]: [{}] }}", literal(sql))
        } else {
            literal(sql)
        }
    }

    fn render_raw(&self, expr: &WhereExpr) -> String {
        self.render_tree(expr)
    }

    fn render_empty(&self) -> String {
        "{}".to_string()
    }
}
