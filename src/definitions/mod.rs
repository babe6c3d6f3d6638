pub mod dashboard;
pub mod draft;
pub mod machine;
pub mod order;
pub mod rating;
pub mod vehicle;
pub mod wizard;
