//! End-to-end conversions through the public API.

use pretty_assertions::assert_eq;
use sql2orm::prelude::*;

#[test]
fn test_readme_examples() {
    let cases = [
        (
            "SELECT * FROM users WHERE age = 25",
            "User.where(age: 25)",
            "User.findAll({where: { age: 25 }})",
        ),
        (
            "SELECT COUNT(*) FROM users WHERE age > 18",
            r#"User.where("age > ?", 18).count"#,
            "User.count({ where: { age: { [Op.gt]: 18 } } })",
        ),
        (
            "UPDATE users SET active = false WHERE id = 7",
            "User.where(id: 7).update_all(active: false)",
            "User.update({ active: false }, { where: { id: 7 } })",
        ),
        (
            "DELETE FROM categories WHERE parent_id IS NULL",
            "Category.where(parent_id: nil).destroy_all",
            "Category.destroy({ where: { parent_id: { [Op.is]: null } } })",
        ),
    ];
    for (sql, active_record, sequelize) in cases {
        assert_eq!(convert(sql, Target::ActiveRecord), active_record, "{}", sql);
        assert_eq!(convert(sql, Target::Sequelize), sequelize, "{}", sql);
    }
}

#[test]
fn test_convert_all_matches_single_targets() {
    let sql = "SELECT name FROM people WHERE city IN ('Oslo', 'Bergen') ORDER BY name";
    let all = sql2orm::convert_all(sql);
    assert_eq!(all.len(), 2);
    for (target, code) in all {
        assert_eq!(code, convert(sql, target));
    }
}

#[test]
fn test_generators_share_one_parse() {
    let parsed = parse_sql("SELECT * FROM user_profiles LIMIT 1");
    assert_eq!(
        Target::ActiveRecord.generator().generate_query(&parsed),
        "UserProfile.limit(1)"
    );
    assert_eq!(
        Target::Sequelize.generator().generate_query(&parsed),
        "UserProfile.findAll({limit: 1})"
    );
}

#[test]
fn test_strict_parse_rejects_garbage() {
    let err = parse_sql_strict("hello world").unwrap_err();
    assert!(matches!(err, ConvertError::Unparsable(_)));
    assert_eq!(convert("hello world", Target::Sequelize), "// Could not parse this SQL query");
}

#[test]
fn test_escaping_in_output() {
    assert_eq!(
        convert(r#"SELECT * FROM quotes WHERE text = 'say "hi"'"#, Target::ActiveRecord),
        r#"Quote.where(text: "say \"hi\"")"#
    );
}
