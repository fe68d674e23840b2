pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, header, info, section, success, warn};
pub use table::{drop_report_table, roles_table, users_table};
pub use theme::{Theme, theme};
