mod check;
mod helpers;
mod init;
mod login;
mod sql;
mod storage;

pub use check::execute_check;
pub use helpers::GlobalArgs;
pub use init::{execute_init, InitArgs};
pub use login::execute_login;
pub use sql::{execute_sql_connect, execute_sql_connection_string};
pub use storage::{
    execute_storage_connection_string, execute_storage_create, execute_storage_keys,
    execute_storage_url,
};
