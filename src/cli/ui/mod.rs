pub mod bars;
pub mod table_renderer;

pub use bars::{progress_bar, scaled_bar};
pub use table_renderer::{Alignment, Table, TableColumn};
