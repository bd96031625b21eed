//! ActiveRecord generator tests (no joins).

use pretty_assertions::assert_eq;

use crate::transpiler::{Target, convert};

fn ar(sql: &str) -> String {
    convert(sql, Target::ActiveRecord)
}

#[test]
fn test_bare_select_is_model_name() {
    assert_eq!(ar("SELECT * FROM teams"), "Team");
    assert_eq!(ar("select * from user_profiles;"), "UserProfile");
}

#[test]
fn test_count_short_circuit() {
    assert_eq!(
        ar("SELECT COUNT(*) FROM users WHERE age > 18"),
        r#"User.where("age > ?", 18).count"#
    );
    assert_eq!(ar("SELECT COUNT(DISTINCT email) FROM users"), "User.distinct.count(:email)");
    assert_eq!(ar("SELECT MAX(score) FROM games"), "Game.maximum(:score)");
    assert_eq!(ar("SELECT AVG(price) FROM products"), "Product.average(:price)");
}

#[test]
fn test_group_by_disables_short_circuit() {
    assert_eq!(
        ar("SELECT COUNT(*) FROM users GROUP BY status"),
        r#"User.group(:status).select("COUNT(*)")"#
    );
}

#[test]
fn test_full_select_chain() {
    assert_eq!(
        ar("SELECT name, email FROM users WHERE status = 'active' ORDER BY name LIMIT 10"),
        r#"User.where(status: "active").order(name: :asc).limit(10).select(:name, :email)"#
    );
}

#[test]
fn test_order_offset_and_distinct() {
    assert_eq!(
        ar("SELECT * FROM posts ORDER BY created_at DESC LIMIT 10 OFFSET 20"),
        "Post.order(created_at: :desc).limit(10).offset(20)"
    );
    assert_eq!(ar("SELECT * FROM posts LIMIT 5 OFFSET 0"), "Post.limit(5)");
    assert_eq!(
        ar("SELECT DISTINCT country FROM users"),
        "User.select(:country).distinct"
    );
}

#[test]
fn test_having_and_aliases() {
    assert_eq!(
        ar("SELECT status, COUNT(*) AS total FROM users GROUP BY status HAVING COUNT(*) > 5"),
        r#"User.group(:status).having("COUNT(*) > 5").select(:status, "COUNT(*) AS total")"#
    );
}

#[test]
fn test_decomposed_category_order() {
    assert_eq!(
        ar("SELECT * FROM users WHERE status = 'active' AND age BETWEEN 18 AND 30 AND name LIKE '%John%'"),
        r#"User.where("name LIKE ?", "%John%").where(age: 18..30).where(status: "active")"#
    );
}

#[test]
fn test_in_and_null_checks() {
    assert_eq!(
        ar("SELECT * FROM users WHERE role IN ('admin', 'editor') AND deleted_at IS NULL"),
        r#"User.where(role: ["admin", "editor"]).where(deleted_at: nil)"#
    );
    assert_eq!(
        ar("DELETE FROM users WHERE id NOT IN (1, 2) AND email IS NOT NULL"),
        "User.where.not(id: [1, 2]).where.not(email: nil).destroy_all"
    );
}

#[test]
fn test_consolidated_comparisons() {
    assert_eq!(
        ar("SELECT * FROM users WHERE age >= 21 AND status != 'banned' AND country = 'NL'"),
        r#"User.where(country: "NL").where.not(status: "banned").where("age >= ?", 21)"#
    );
}

#[test]
fn test_repeated_fields_get_separate_calls() {
    assert_eq!(
        ar("SELECT * FROM users WHERE status != 'a' AND status != 'b'"),
        r#"User.where.not(status: "a").where.not(status: "b")"#
    );
    assert_eq!(
        ar("SELECT * FROM users WHERE role = 'admin' AND role = 'owner' AND team = 3"),
        r#"User.where(role: "admin", team: 3).where(role: "owner")"#
    );
}

#[test]
fn test_each_inequality_is_its_own_where_not() {
    assert_eq!(
        ar("SELECT * FROM users WHERE country != 'NL' AND status != 'banned'"),
        r#"User.where.not(country: "NL").where.not(status: "banned")"#
    );
}

#[test]
fn test_main_alias_is_resolved() {
    assert_eq!(ar("SELECT * FROM users u WHERE u.age > 18"), r#"User.where("age > ?", 18)"#);
    assert_eq!(
        ar("SELECT u.name FROM users u WHERE u.status = 'active' ORDER BY u.created_at DESC"),
        r#"User.where(status: "active").order(created_at: :desc).select(:name)"#
    );
    assert_eq!(
        ar("SELECT * FROM users u WHERE u.id IN (SELECT user_id FROM orders)"),
        r#"User.where("users.id IN (SELECT user_id FROM orders)")"#
    );
    assert_eq!(
        ar("SELECT * FROM users u WHERE u.age > 18 OR u.name = 'u.x'"),
        r#"User.where("age > ? OR name = ?", 18, "u.x")"#
    );
}

#[test]
fn test_wide_integer_literal_keeps_digits() {
    assert_eq!(
        ar("SELECT * FROM users WHERE id = 12345678901234567891"),
        "User.where(id: 12345678901234567891)"
    );
}

#[test]
fn test_disjunction_is_parameterized() {
    assert_eq!(
        ar("SELECT * FROM users WHERE age > 18 OR status = 'vip'"),
        r#"User.where("age > ? OR status = ?", 18, "vip")"#
    );
    assert_eq!(
        ar("SELECT * FROM users WHERE active = true AND (role = 'admin' OR score >= 90)"),
        r#"User.where("active = ? AND (role = ? OR score >= ?)", true, "admin", 90)"#
    );
}

#[test]
fn test_subquery_kept_literal() {
    assert_eq!(
        ar("SELECT * FROM users WHERE id IN (SELECT user_id FROM orders WHERE total > 100)"),
        r#"User.where("id IN (SELECT user_id FROM orders WHERE total > 100)")"#
    );
}

#[test]
fn test_insert() {
    assert_eq!(
        ar("INSERT INTO users (name, age, active) VALUES ('O''Brien', 42, true)"),
        r#"User.create!(name: "O'Brien", age: 42, active: true)"#
    );
    assert_eq!(
        ar("INSERT INTO t (a, b) VALUES ('x,y', 'z')"),
        r#"T.create!(a: "x,y", b: "z")"#
    );
    assert_eq!(
        ar("INSERT INTO users (name, age) VALUES ('Ann')"),
        r#"User.create!(name: "Ann", age: nil)"#
    );
}

#[test]
fn test_update() {
    assert_eq!(
        ar("UPDATE users SET status = 'inactive', score = NULL WHERE last_login < '2020-01-01'"),
        r#"User.where("last_login < ?", "2020-01-01").update_all(status: "inactive", score: nil)"#
    );
}

#[test]
fn test_unparsable_and_unsupported() {
    assert_eq!(ar("INVALID QUERY"), "# Could not parse this SQL query");
    assert_eq!(
        ar("WITH recent AS (SELECT 1) SELECT * FROM users"),
        "# Query type not supported"
    );
}
