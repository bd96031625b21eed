//! Generators for each ORM, one no-join and one join variant per target.

pub mod active_record;
pub mod active_record_join;
pub mod sequelize;
pub mod sequelize_join;

pub use active_record::ActiveRecordGenerator;
pub use active_record_join::ActiveRecordJoinGenerator;
pub use sequelize::SequelizeGenerator;
pub use sequelize_join::SequelizeJoinGenerator;
