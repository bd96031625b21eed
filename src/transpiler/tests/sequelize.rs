//! Sequelize generator tests (no joins).

use pretty_assertions::assert_eq;

use crate::transpiler::{Target, convert};

fn sq(sql: &str) -> String {
    convert(sql, Target::Sequelize)
}

#[test]
fn test_find_all() {
    assert_eq!(sq("SELECT * FROM teams"), "Team.findAll({})");
    assert_eq!(
        sq("SELECT * FROM users WHERE age = 25"),
        "User.findAll({where: { age: 25 }})"
    );
}

#[test]
fn test_aggregates() {
    assert_eq!(sq("SELECT COUNT(*) FROM users"), "User.count()");
    assert_eq!(
        sq("SELECT COUNT(*) FROM users WHERE age > 18"),
        "User.count({ where: { age: { [Op.gt]: 18 } } })"
    );
    assert_eq!(
        sq("SELECT COUNT(DISTINCT email) FROM users"),
        r#"User.count({ col: "email", distinct: true })"#
    );
    assert_eq!(
        sq("SELECT AVG(age) FROM users WHERE active = true"),
        r#"User.aggregate("age", "avg", { where: { active: true } })"#
    );
    assert_eq!(sq("SELECT SUM(amount) FROM orders"), r#"Order.sum("amount")"#);
}

#[test]
fn test_options_in_order() {
    assert_eq!(
        sq("SELECT name, email AS contact FROM users WHERE age >= 18 AND age < 65 ORDER BY name DESC LIMIT 5 OFFSET 10"),
        r#"User.findAll({attributes: ["name", ["email", "contact"]], where: { age: { [Op.gte]: 18, [Op.lt]: 65 } }, order: [["name", "DESC"]], limit: 5, offset: 10})"#
    );
}

#[test]
fn test_repeated_operator_moves_into_and() {
    assert_eq!(
        sq("SELECT * FROM users WHERE age > 18 AND age > 21"),
        r#"User.findAll({where: { [Op.and]: [{ age: { [Op.gt]: 18 } }, { age: { [Op.gt]: 21 } }] }})"#
    );
    assert_eq!(
        sq("SELECT * FROM users WHERE status != 'a' AND status != 'b' AND team = 3"),
        r#"User.findAll({where: { team: 3, [Op.and]: [{ status: { [Op.ne]: "a" } }, { status: { [Op.ne]: "b" } }] }})"#
    );
}

#[test]
fn test_decomposed_operators() {
    assert_eq!(
        sq("SELECT * FROM users WHERE name LIKE '%John%' AND age BETWEEN 18 AND 30 AND status = 'active'"),
        r#"User.findAll({where: { name: { [Op.like]: "%John%" }, age: { [Op.between]: [18, 30] }, status: "active" }})"#
    );
    assert_eq!(
        sq("SELECT * FROM users WHERE deleted_at IS NULL AND role NOT IN ('guest')"),
        r#"User.findAll({where: { role: { [Op.notIn]: ["guest"] }, deleted_at: { [Op.is]: null } }})"#
    );
}

#[test]
fn test_disjunction() {
    assert_eq!(
        sq("SELECT * FROM users WHERE age > 18 OR status = 'vip'"),
        r#"User.findAll({where: { [Op.or]: [{ age: { [Op.gt]: 18 } }, { status: "vip" }] }})"#
    );
}

#[test]
fn test_group_and_having() {
    assert_eq!(
        sq("SELECT status, COUNT(*) AS total FROM users GROUP BY status HAVING COUNT(*) > 5"),
        r#"User.findAll({attributes: ["status", [Sequelize.fn("COUNT", Sequelize.literal("*")), "total"]], group: ["status"], having: Sequelize.literal("COUNT(*) > 5")})"#
    );
}

#[test]
fn test_distinct_attribute() {
    assert_eq!(
        sq("SELECT DISTINCT country FROM users"),
        r#"User.findAll({attributes: [[Sequelize.fn("DISTINCT", Sequelize.col("country")), "country"]]})"#
    );
}

#[test]
fn test_subquery_literal() {
    assert_eq!(
        sq("SELECT * FROM users WHERE id IN (SELECT user_id FROM orders)"),
        r#"User.findAll({where: Sequelize.literal("id IN (SELECT user_id FROM orders)")})"#
    );
}

#[test]
fn test_dml() {
    assert_eq!(
        sq("INSERT INTO users (name, age) VALUES ('Ann', 30)"),
        r#"User.create({ name: "Ann", age: 30 })"#
    );
    assert_eq!(
        sq("UPDATE users SET active = false WHERE id = 7"),
        "User.update({ active: false }, { where: { id: 7 } })"
    );
    assert_eq!(sq("DELETE FROM sessions"), "Session.destroy({ where: {} })");
}

#[test]
fn test_unparsable() {
    assert_eq!(sq("INVALID QUERY"), "// Could not parse this SQL query");
}
