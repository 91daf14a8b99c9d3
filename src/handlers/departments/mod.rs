pub mod create;
pub mod employees;
pub mod list;
pub mod show;
pub mod tree;

// Re-export handler functions for use in routing
pub use create::post as department_post;
pub use employees::get as department_employees_get;
pub use list::get as department_list_get;
pub use show::get as department_get;
pub use tree::get as department_tree_get;
