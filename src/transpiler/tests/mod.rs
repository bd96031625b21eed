//! Generator test modules.
//!
//! - `active_record`: ActiveRecord chains without joins
//! - `sequelize`: Sequelize finders without joins
//! - `joins`: join variants of both targets

mod active_record;
mod joins;
mod sequelize;

use crate::transpiler::{Target, convert};

#[test]
fn test_output_is_deterministic() {
    let sql = "SELECT name FROM users WHERE age > 18 OR status = 'vip' ORDER BY name LIMIT 3";
    for target in Target::ALL {
        let first = convert(sql, target);
        for _ in 0..5 {
            assert_eq!(convert(sql, target), first);
        }
    }
}

#[test]
fn test_repeated_join_extraction_is_isolated() {
    let sql = "SELECT * FROM users INNER JOIN posts ON users.id = posts.user_id";
    let first = convert(sql, Target::ActiveRecord);
    convert("SELECT * FROM a JOIN b ON a.x = b.y JOIN c ON b.z = c.w", Target::ActiveRecord);
    assert_eq!(convert(sql, Target::ActiveRecord), first);
}
