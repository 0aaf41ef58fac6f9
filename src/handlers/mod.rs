pub mod grouped_records;
pub mod health;
pub mod record;
pub mod records;
pub mod stats;
pub mod underwriters;
