pub use super::ipo_records::Entity as IpoRecords;
