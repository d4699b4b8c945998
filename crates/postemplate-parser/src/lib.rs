pub mod basis;
pub mod errors;
pub mod schema;
pub mod workbook;

pub use basis::read_basis_csv;
pub use errors::ParserError;
pub use workbook::{read_item_workbook, render_number};
