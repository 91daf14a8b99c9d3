pub mod by_departments;
pub mod list;
pub mod show;

// Re-export handler functions for use in routing
pub use by_departments::post as employees_by_departments_post;
pub use list::get as employee_list_get;
pub use show::get as employee_get;
