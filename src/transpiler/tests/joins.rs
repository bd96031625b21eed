//! Join generator tests for both targets.

use pretty_assertions::assert_eq;

use crate::transpiler::{Target, convert};

fn ar(sql: &str) -> String {
    convert(sql, Target::ActiveRecord)
}

fn sq(sql: &str) -> String {
    convert(sql, Target::Sequelize)
}

const POSTS: &str = "SELECT users.name, posts.title FROM users INNER JOIN posts ON users.id = posts.user_id WHERE posts.published = true";

#[test]
fn test_association_join() {
    assert_eq!(
        ar(POSTS),
        r#"User.joins(:posts).where("posts.published = ?", true).select("users.name", "posts.title")"#
    );
    assert_eq!(
        sq(POSTS),
        r#"User.findAll({include: [{ model: Post, attributes: ["title"], required: true }], attributes: ["name"], where: { "$posts.published$": true }})"#
    );
}

#[test]
fn test_belongs_to() {
    assert_eq!(
        ar("SELECT * FROM posts INNER JOIN users ON posts.user_id = users.id"),
        "Post.joins(:user)"
    );
}

#[test]
fn test_aliased_left_join() {
    let sql = "SELECT u.name, COUNT(p.id) AS post_count FROM users u LEFT JOIN posts p ON u.id = p.user_id GROUP BY u.name";
    assert_eq!(
        ar(sql),
        r#"User.from("users u").joins("LEFT JOIN posts p ON u.id = p.user_id").group("u.name").select("u.name", "COUNT(p.id) AS post_count")"#
    );
    assert_eq!(
        sq(sql),
        r#"User.findAll({include: [{ model: Post, as: "p", attributes: [], required: false }], attributes: ["name", [Sequelize.fn("COUNT", Sequelize.col("p.id")), "post_count"]], group: ["u.name"]})"#
    );
}

#[test]
fn test_non_conventional_join_is_raw() {
    let sql = "SELECT * FROM users JOIN profiles ON users.email = profiles.contact_email";
    assert_eq!(
        ar(sql),
        r#"User.joins("JOIN profiles ON users.email = profiles.contact_email")"#
    );
    assert_eq!(
        sq(sql),
        r#"User.findAll({include: [{ model: Profile, required: true, on: { [Op.and]: [Sequelize.literal("users.email = profiles.contact_email")] } }]})"#
    );
}

#[test]
fn test_right_join() {
    let sql = "SELECT * FROM users RIGHT JOIN teams ON users.team_id = teams.id";
    assert_eq!(ar(sql), r#"User.joins("RIGHT JOIN teams ON users.team_id = teams.id")"#);
    assert_eq!(
        sq(sql),
        "User.findAll({include: [{ model: Team, required: false, right: true }]})"
    );
}

#[test]
fn test_raw_join_keeps_keyword_case() {
    assert_eq!(
        ar("select * from users right  outer join teams on users.team_id = teams.id"),
        r#"User.joins("right outer join teams ON users.team_id = teams.id")"#
    );
}

#[test]
fn test_on_filters_become_include_where() {
    let sql = "SELECT * FROM users INNER JOIN posts ON users.id = posts.user_id AND posts.published = true";
    assert_eq!(
        ar(sql),
        r#"User.joins("INNER JOIN posts ON users.id = posts.user_id AND posts.published = true")"#
    );
    assert_eq!(
        sq(sql),
        "User.findAll({include: [{ model: Post, where: { published: true }, required: true }]})"
    );
}

#[test]
fn test_bare_fields_are_qualified() {
    assert_eq!(
        ar("SELECT * FROM users INNER JOIN posts ON users.id = posts.user_id WHERE age > 21 AND name LIKE 'A%'"),
        r#"User.joins(:posts).where("users.name LIKE ?", "A%").where("users.age > ?", 21)"#
    );
}

#[test]
fn test_join_aggregate() {
    let sql = "SELECT COUNT(DISTINCT posts.id) FROM users INNER JOIN posts ON users.id = posts.user_id";
    assert_eq!(ar(sql), r#"User.joins(:posts).distinct.count("posts.id")"#);
    assert_eq!(
        sq(sql),
        r#"User.count({ include: [{ model: Post, attributes: [], required: true }], col: "posts.id", distinct: true })"#
    );
}

#[test]
fn test_delete_with_left_join() {
    let sql = "DELETE FROM users LEFT JOIN sessions ON users.id = sessions.user_id WHERE sessions.id IS NULL";
    assert_eq!(
        ar(sql),
        r#"User.left_joins(:sessions).where("sessions.id IS NULL").destroy_all"#
    );
    assert_eq!(
        sq(sql),
        r#"User.destroy({ where: { "$sessions.id$": { [Op.is]: null } }, include: [{ model: Session, required: false }] })"#
    );
}

#[test]
fn test_insert_with_join_unsupported() {
    let sql = "INSERT INTO archive (id) SELECT users.id FROM users JOIN bans ON users.id = bans.user_id";
    assert_eq!(ar(sql), "# INSERT with JOIN is not supported by ActiveRecord");
    assert_eq!(sq(sql), "// INSERT with JOIN is not supported by Sequelize");
}
